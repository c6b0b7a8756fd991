//! Application configuration.

use crate::error::{AppError, AppResult};
use ladder_core::Asset;
use ladder_strategy::StrategyConfig;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Seed balances for the in-memory paper ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct PaperConfig {
    #[serde(default = "default_balance_a")]
    pub balance_a: Decimal,
    #[serde(default = "default_balance_b")]
    pub balance_b: Decimal,
    /// Trust limit for asset A. Ignored when A is native.
    #[serde(default = "default_limit")]
    pub limit_a: Decimal,
    /// Trust limit for asset B. Ignored when B is native.
    #[serde(default = "default_limit")]
    pub limit_b: Decimal,
}

fn default_balance_a() -> Decimal {
    Decimal::new(1000, 0)
}

fn default_balance_b() -> Decimal {
    Decimal::new(500, 0)
}

fn default_limit() -> Decimal {
    Decimal::new(100_000, 0)
}

impl Default for PaperConfig {
    fn default() -> Self {
        Self {
            balance_a: default_balance_a(),
            balance_b: default_balance_b(),
            limit_a: default_limit(),
            limit_b: default_limit(),
        }
    }
}

/// Main application configuration.
///
/// Asset A is the base asset and asset B the quote asset. An asset without
/// an issuer is the native asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct AppConfig {
    /// Account whose balances and offers the bot manages.
    pub trading_account: String,

    pub asset_code_a: String,
    #[serde(default)]
    pub issuer_a: Option<String>,

    pub asset_code_b: String,
    #[serde(default)]
    pub issuer_b: Option<String>,

    /// Sleep between two ticks.
    #[serde(default = "default_tick_interval_seconds")]
    pub tick_interval_seconds: u64,

    #[serde(default)]
    pub strategy: StrategyConfig,

    #[serde(default)]
    pub paper: PaperConfig,
}

fn default_tick_interval_seconds() -> u64 {
    60
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &str) -> AppResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("Failed to read config: {e}")))?;

        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> AppResult<Self> {
        toml::from_str(content).map_err(|e| AppError::Config(format!("Failed to parse config: {e}")))
    }

    /// Reject configurations the bot must not start with.
    pub fn validate(&self) -> AppResult<()> {
        if self.trading_account.trim().is_empty() {
            return Err(AppError::Config("TRADING_ACCOUNT must be set".to_string()));
        }
        if self.asset_code_a.trim().is_empty() || self.asset_code_b.trim().is_empty() {
            return Err(AppError::Config(
                "ASSET_CODE_A and ASSET_CODE_B must be set".to_string(),
            ));
        }
        if self.base_asset() == self.quote_asset() {
            return Err(AppError::Config(format!(
                "base and quote must differ: both are {}",
                self.base_asset()
            )));
        }
        if self.tick_interval_seconds == 0 {
            return Err(AppError::Config(
                "TICK_INTERVAL_SECONDS must be at least 1".to_string(),
            ));
        }
        self.strategy.validate()?;
        Ok(())
    }

    pub fn base_asset(&self) -> Asset {
        asset(&self.asset_code_a, self.issuer_a.as_deref())
    }

    pub fn quote_asset(&self) -> Asset {
        asset(&self.asset_code_b, self.issuer_b.as_deref())
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs(self.tick_interval_seconds)
    }
}

fn asset(code: &str, issuer: Option<&str>) -> Asset {
    match issuer {
        Some(issuer) => Asset::credit(code, issuer),
        None => Asset::native(code),
    }
}
