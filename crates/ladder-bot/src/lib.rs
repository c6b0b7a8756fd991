//! Ladder market making bot.
//!
//! Runs the quoting strategy against a ledger, one tick at a time:
//! - Load balances and the account's own offers
//! - Let the strategy prune and extend its ladder
//! - Submit the resulting batch; tear every order down on any failure

pub mod bot;
pub mod config;
pub mod error;
pub mod ledger;
pub mod paper;

pub use bot::{balances_from_lines, Bot, TickOutcome, TickPhase, MAX_NATIVE_TRUST};
pub use config::{AppConfig, PaperConfig};
pub use error::{AppError, AppResult};
pub use ledger::{
    BalanceLine, BalanceSource, BoxFuture, LedgerError, LedgerResult, OperationSubmitter,
    OrderBookSource,
};
pub use paper::PaperLedger;
