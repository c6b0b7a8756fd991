//! Core domain types for the ladder market making bot.
//!
//! This crate provides the vocabulary shared by the strategy and the bot:
//! - `Price`, `Amount`: precision-safe numeric types
//! - `Asset`: ledger asset identifier (native or issued)
//! - `Level`: one target quote point produced by a level provider
//! - `Balances`: spendable and trusted amounts of the traded pair
//! - `RestingOrder`, `Offer`: live orders as the ledger reports them
//! - `OperationIntent`, `OperationBatch`: create/cancel requests for submission

pub mod asset;
pub mod balances;
pub mod book;
pub mod decimal;
pub mod error;
pub mod level;
pub mod operation;
pub mod order;

pub use asset::Asset;
pub use balances::Balances;
pub use book::{partition_offers, sort_best_first, Offer, RestingOrder};
pub use decimal::{within_tolerance, Amount, Price};
pub use error::{CoreError, Result};
pub use level::Level;
pub use operation::{OperationBatch, OperationIntent};
pub use order::{OfferId, OrderSide};
