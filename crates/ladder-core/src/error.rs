//! Error types for ladder-core.

use rust_decimal::Decimal;
use thiserror::Error;

/// Core error types.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CoreError {
    #[error("Division by zero: {0}")]
    DivisionByZero(&'static str),

    #[error("Negative balance for {field}: {value}")]
    NegativeBalance { field: &'static str, value: Decimal },
}

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
