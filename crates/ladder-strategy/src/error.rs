//! Strategy error types.

use ladder_core::{CoreError, OrderSide};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum StrategyError {
    /// Rejected at construction time; the bot must not start.
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Invalid balances on {side} side: {reason}")]
    InvalidBalances { side: OrderSide, reason: String },

    #[error("Level computation failed: {0}")]
    Level(String),

    #[error("{0} side used before pre_update")]
    NotPrepared(OrderSide),

    #[error("errors on both sides: buying ({buy}), selling ({sell})")]
    BothSides {
        buy: Box<StrategyError>,
        sell: Box<StrategyError>,
    },

    #[error("Core error: {0}")]
    Core(#[from] CoreError),
}

pub type StrategyResult<T> = Result<T, StrategyError>;
