//! Quoting strategy configuration.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{StrategyError, StrategyResult};

/// Quoting strategy configuration.
///
/// Keys use the upper-snake style of the bot's strategy files
/// (`PRICE_TOLERANCE`, `SPREAD`, ...). Read once at startup and passed to
/// constructors; never re-read while running.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct StrategyConfig {
    /// Maximum relative price deviation for a resting order to still match a level.
    #[serde(default = "default_price_tolerance")]
    pub price_tolerance: Decimal,

    /// Maximum relative amount deviation for a resting order to still match a level.
    #[serde(default = "default_amount_tolerance")]
    pub amount_tolerance: Decimal,

    /// Spread; half of it is added above the center price on each side.
    #[serde(default = "default_spread")]
    pub spread: Decimal,

    /// Haircut taken off every level amount. Must lie strictly inside (0, 1).
    #[serde(default = "default_amount_spread")]
    pub amount_spread: Decimal,

    /// Maximum number of levels quoted per side.
    #[serde(default = "default_max_levels")]
    pub max_levels: u32,

    /// Share of total holdings in one asset above which the center price plateaus.
    #[serde(default = "default_plateau_threshold_percentage")]
    pub plateau_threshold_percentage: Decimal,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            price_tolerance: default_price_tolerance(),
            amount_tolerance: default_amount_tolerance(),
            spread: default_spread(),
            amount_spread: default_amount_spread(),
            max_levels: default_max_levels(),
            plateau_threshold_percentage: default_plateau_threshold_percentage(),
        }
    }
}

impl StrategyConfig {
    /// Check every parameter; any failure is a fatal startup error.
    pub fn validate(&self) -> StrategyResult<()> {
        if self.price_tolerance < Decimal::ZERO {
            return Err(StrategyError::Config(format!(
                "PRICE_TOLERANCE must be non-negative: {}",
                self.price_tolerance
            )));
        }
        if self.amount_tolerance < Decimal::ZERO {
            return Err(StrategyError::Config(format!(
                "AMOUNT_TOLERANCE must be non-negative: {}",
                self.amount_tolerance
            )));
        }
        if self.spread < Decimal::ZERO {
            return Err(StrategyError::Config(format!(
                "SPREAD must be non-negative: {}",
                self.spread
            )));
        }
        if self.max_levels == 0 {
            return Err(StrategyError::Config(
                "MAX_LEVELS must be at least 1".to_string(),
            ));
        }
        check_open_unit_interval("AMOUNT_SPREAD", self.amount_spread)?;
        check_open_unit_interval(
            "PLATEAU_THRESHOLD_PERCENTAGE",
            self.plateau_threshold_percentage,
        )?;
        Ok(())
    }
}

/// Require `0 < value < 1`.
pub(crate) fn check_open_unit_interval(name: &str, value: Decimal) -> StrategyResult<()> {
    if value <= Decimal::ZERO || value >= Decimal::ONE {
        return Err(StrategyError::Config(format!(
            "{name} needs to be between 0 and 1 (exclusive): {value}"
        )));
    }
    Ok(())
}

fn default_price_tolerance() -> Decimal {
    Decimal::new(1, 3) // 0.1%
}
fn default_amount_tolerance() -> Decimal {
    Decimal::new(1, 3) // 0.1%
}
fn default_spread() -> Decimal {
    Decimal::new(2, 2) // 2%
}
fn default_amount_spread() -> Decimal {
    Decimal::new(5, 2) // 5% haircut
}
fn default_max_levels() -> u32 {
    1
}
fn default_plateau_threshold_percentage() -> Decimal {
    Decimal::new(9, 1) // 90%
}
