//! Prometheus metrics and structured logging for the ladder bot.
//!
//! - Tick, teardown and intent counters
//! - Balance and resting-order gauges
//! - Structured logging with tracing (JSON in production)

pub mod error;
pub mod logging;
pub mod metrics;

pub use error::{TelemetryError, TelemetryResult};
pub use logging::init_logging;
pub use metrics::Metrics;
