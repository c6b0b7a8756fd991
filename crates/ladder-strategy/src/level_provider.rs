//! Level provider: converts balances into target quote levels.
//!
//! The autonomous provider prices off the ratio of the two balances and
//! clamps that ratio once either asset dominates the portfolio:
//!
//! ```text
//! qShare = quote / (base + quote)       bShare = base / (base + quote)
//!
//! qShare >= T  →  center = T / (1 - T)          (ceiling plateau)
//! bShare >= T  →  center = (1 - T) / T          (floor plateau)
//! otherwise    →  center = quote / base
//!
//! price  = center × (1 + spread / 2)
//! amount = 2 × balance × spread / (4 + spread) × (1 - amount_spread)
//! ```
//!
//! The caller gets the opposite side by swapping base and quote.

use ladder_core::{Amount, Level, Price};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::config::check_open_unit_interval;
use crate::error::{StrategyError, StrategyResult};

/// Produces the ordered target levels for one side (index 0 = innermost).
pub trait LevelProvider: Send + Sync {
    fn get_levels(&self, max_asset_base: Amount, max_asset_quote: Amount)
        -> StrategyResult<Vec<Level>>;
}

/// Balance-driven level provider with a plateau-clamped center price.
///
/// Holds no state between calls and always yields exactly one level.
#[derive(Debug, Clone)]
pub struct AutonomousLevelProvider {
    spread: Decimal,
    plateau_threshold_percentage: Decimal,
    /// Size from the quote balance instead of the base balance.
    use_max_quote_in_target_amount_calc: bool,
    amount_spread: Decimal,
}

impl AutonomousLevelProvider {
    /// Create a provider.
    ///
    /// Fails with `StrategyError::Config` when `amount_spread` or the plateau
    /// threshold lies outside (0, 1), or when `spread` is negative.
    pub fn new(
        spread: Decimal,
        plateau_threshold_percentage: Decimal,
        use_max_quote_in_target_amount_calc: bool,
        amount_spread: Decimal,
    ) -> StrategyResult<Self> {
        check_open_unit_interval("amount_spread", amount_spread)?;
        check_open_unit_interval("plateau_threshold_percentage", plateau_threshold_percentage)?;
        if spread < Decimal::ZERO {
            return Err(StrategyError::Config(format!(
                "spread must be non-negative: {spread}"
            )));
        }

        Ok(Self {
            spread,
            plateau_threshold_percentage,
            use_max_quote_in_target_amount_calc,
            amount_spread,
        })
    }

    /// Center price before the spread is applied.
    ///
    /// With a threshold inside (0, 1) a zero base balance always lands in the
    /// ceiling plateau, so the raw ratio never divides by zero. An empty
    /// portfolio has no defined price and is an error.
    pub fn center_price(&self, max_asset_base: Amount, max_asset_quote: Amount) -> StrategyResult<Decimal> {
        let base = max_asset_base.inner();
        let quote = max_asset_quote.inner();
        let threshold = self.plateau_threshold_percentage;

        let sum = base
            .checked_add(quote)
            .ok_or_else(|| overflow("portfolio size"))?;
        let quote_share = checked_div(quote, sum, "quote share of an empty portfolio")?;
        let base_share = checked_div(base, sum, "base share of an empty portfolio")?;

        if quote_share >= threshold {
            checked_div(threshold, Decimal::ONE - threshold, "ceiling plateau")
        } else if base_share >= threshold {
            checked_div(Decimal::ONE - threshold, threshold, "floor plateau")
        } else {
            checked_div(quote, base, "raw balance ratio")
        }
    }
}

impl LevelProvider for AutonomousLevelProvider {
    fn get_levels(
        &self,
        max_asset_base: Amount,
        max_asset_quote: Amount,
    ) -> StrategyResult<Vec<Level>> {
        let center = self.center_price(max_asset_base, max_asset_quote)?;

        // the spread is always added on this side
        let target_price = checked_mul(
            center,
            Decimal::ONE + self.spread / dec!(2),
            "target price",
        )?;

        let sizing_balance = if self.use_max_quote_in_target_amount_calc {
            max_asset_quote.inner()
        } else {
            max_asset_base.inner()
        };
        let numerator = checked_mul(dec!(2), sizing_balance, "target amount")?;
        let numerator = checked_mul(numerator, self.spread, "target amount")?;
        let denominator = dec!(4)
            .checked_add(self.spread)
            .ok_or_else(|| overflow("target amount"))?;
        let target_amount = checked_div(numerator, denominator, "target amount")?;
        let target_amount = checked_mul(
            target_amount,
            Decimal::ONE - self.amount_spread,
            "target amount",
        )?;

        Ok(vec![Level::new(
            Price::new(target_price),
            Amount::new(target_amount),
        )])
    }
}

fn checked_div(numerator: Decimal, denominator: Decimal, what: &str) -> StrategyResult<Decimal> {
    numerator
        .checked_div(denominator)
        .ok_or_else(|| StrategyError::Level(format!("division by zero computing {what}")))
}

fn checked_mul(a: Decimal, b: Decimal, what: &str) -> StrategyResult<Decimal> {
    a.checked_mul(b).ok_or_else(|| overflow(what))
}

fn overflow(what: &str) -> StrategyError {
    StrategyError::Level(format!("overflow computing {what}"))
}
