//! Prometheus metrics for the ladder bot.
//!
//! All metrics live in the default registry and are exposed in the text
//! exposition format through [`Metrics::encode_text`].
//!
//! # Panics
//!
//! Metric registration uses `unwrap()` intentionally. A registration failure
//! means duplicate metric names, which is a startup bug. These panics only
//! occur during static initialization, never at runtime.

use once_cell::sync::Lazy;
use prometheus::{
    register_gauge_vec, register_int_counter_vec, register_int_gauge_vec, Encoder, GaugeVec,
    IntCounterVec, IntGaugeVec, TextEncoder,
};

use crate::error::TelemetryResult;

/// Completed ticks.
/// Labels: outcome (converged/torn_down)
pub static TICKS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "ladder_ticks_total",
        "Total control loop ticks by outcome",
        &["outcome"]
    )
    .unwrap()
});

/// Teardowns, by the tick phase that failed.
pub static TEARDOWNS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "ladder_teardowns_total",
        "Total full order teardowns by failed phase",
        &["phase"]
    )
    .unwrap()
});

/// Submitted intents.
/// Labels: kind (cancel/create)
pub static INTENTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "ladder_intents_total",
        "Total operation intents submitted",
        &["kind"]
    )
    .unwrap()
});

/// Spendable balance per asset, as of the last successful load.
pub static BALANCE: Lazy<GaugeVec> = Lazy::new(|| {
    register_gauge_vec!(
        "ladder_balance",
        "Spendable balance per asset",
        &["asset"]
    )
    .unwrap()
});

/// Orders kept on the book after the last tick.
pub static RESTING_ORDERS: Lazy<IntGaugeVec> = Lazy::new(|| {
    register_int_gauge_vec!(
        "ladder_resting_orders",
        "Resting orders per side after the last tick",
        &["side"]
    )
    .unwrap()
});

/// Metrics facade.
pub struct Metrics;

impl Metrics {
    /// Record a tick that reached a converged book.
    pub fn tick_converged() {
        TICKS_TOTAL.with_label_values(&["converged"]).inc();
    }

    /// Record a tick that ended in a teardown after `phase` failed.
    pub fn tick_torn_down(phase: &str) {
        TICKS_TOTAL.with_label_values(&["torn_down"]).inc();
        TEARDOWNS_TOTAL.with_label_values(&[phase]).inc();
    }

    /// Record the intents of a submitted batch.
    pub fn intents_submitted(cancels: usize, creates: usize) {
        INTENTS_TOTAL
            .with_label_values(&["cancel"])
            .inc_by(cancels as u64);
        INTENTS_TOTAL
            .with_label_values(&["create"])
            .inc_by(creates as u64);
    }

    pub fn balance(asset: &str, value: f64) {
        BALANCE.with_label_values(&[asset]).set(value);
    }

    pub fn resting_orders(side: &str, count: usize) {
        RESTING_ORDERS
            .with_label_values(&[side])
            .set(count as i64);
    }

    /// Render every registered metric in the Prometheus text format.
    pub fn encode_text() -> TelemetryResult<String> {
        let encoder = TextEncoder::new();
        let families = prometheus::gather();
        let mut buffer = Vec::new();
        encoder.encode(&families, &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_teardown_counts_tick_and_phase() {
        let ticks_before = TICKS_TOTAL.with_label_values(&["torn_down"]).get();
        let phase_before = TEARDOWNS_TOTAL.with_label_values(&["test_phase"]).get();

        Metrics::tick_torn_down("test_phase");

        assert!(TICKS_TOTAL.with_label_values(&["torn_down"]).get() > ticks_before);
        assert_eq!(
            TEARDOWNS_TOTAL.with_label_values(&["test_phase"]).get(),
            phase_before + 1
        );
    }

    #[test]
    fn test_gauges_hold_last_value() {
        Metrics::balance("TEST:native", 12.5);
        Metrics::balance("TEST:native", 7.0);
        assert_eq!(BALANCE.with_label_values(&["TEST:native"]).get(), 7.0);

        Metrics::resting_orders("test_side", 3);
        assert_eq!(RESTING_ORDERS.with_label_values(&["test_side"]).get(), 3);
    }

    #[test]
    fn test_encode_text_lists_metrics() {
        Metrics::tick_converged();
        Metrics::intents_submitted(1, 2);

        let text = Metrics::encode_text().unwrap();
        assert!(text.contains("ladder_ticks_total"));
        assert!(text.contains("ladder_intents_total"));
    }
}
