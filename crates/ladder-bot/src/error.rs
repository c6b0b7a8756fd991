//! Application error types.

use thiserror::Error;

use crate::ledger::LedgerError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Strategy error: {0}")]
    Strategy(#[from] ladder_strategy::StrategyError),

    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error("Telemetry error: {0}")]
    Telemetry(#[from] ladder_telemetry::TelemetryError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type AppResult<T> = Result<T, AppError>;
