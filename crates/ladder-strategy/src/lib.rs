//! Quoting strategies for the ladder bot.
//!
//! Turns account balances into a two-sided quote ladder and diffs it
//! against the bot's live orders:
//! - Level provider: balances → target levels (plateau-clamped price curve)
//! - Side strategy: one direction, tolerance-gated keep/cancel/create
//! - Compose strategy: both directions behind one lifecycle
//!
//! # Lifecycle
//!
//! ```text
//! Balances → Strategy.pre_update()          (levels computed once per tick)
//! Orders   → Strategy.prune_existing_offers() → cancel intents + survivors
//! Survivors→ Strategy.update_with_ops()       → create intents
//! Submit OK→ Strategy.post_update()
//! ```

pub mod compose;
pub mod config;
pub mod error;
pub mod level_provider;
pub mod side;
pub mod strategy;

pub use compose::{make_autonomous_strategy, ComposeStrategy};
pub use config::StrategyConfig;
pub use error::{StrategyError, StrategyResult};
pub use level_provider::{AutonomousLevelProvider, LevelProvider};
pub use side::SideStrategy;
pub use strategy::{PruneOutcome, Strategy};
