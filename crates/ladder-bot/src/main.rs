//! Ladder market making bot - entry point.
//!
//! Runs the two-sided autonomous strategy against the paper ledger seeded
//! from the configuration file.

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing::info;

use ladder_bot::{AppConfig, Bot, PaperLedger};
use ladder_strategy::make_autonomous_strategy;

/// Ladder market making bot
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Configuration file path (can also be set via LADDER_CONFIG env var)
    #[arg(short, long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    ladder_telemetry::init_logging()?;

    info!("Starting ladder bot v{}", env!("CARGO_PKG_VERSION"));

    // CLI arg > LADDER_CONFIG env var > default
    let config_path = args
        .config
        .or_else(|| std::env::var("LADDER_CONFIG").ok())
        .unwrap_or_else(|| "config/default.toml".to_string());

    info!(config_path = %config_path, "Loading configuration");

    let config = AppConfig::from_file(&config_path)?;
    config.validate()?;
    info!(
        account = %config.trading_account,
        base = %config.base_asset(),
        quote = %config.quote_asset(),
        strategy = ?config.strategy,
        "Configuration loaded"
    );

    let strategy = make_autonomous_strategy(&config.strategy)?;
    let ledger = Arc::new(PaperLedger::from_config(&config));

    let mut bot = Bot::with_ledger(&config, strategy, ledger);
    bot.run().await?;

    Ok(())
}
