//! Ledger collaborator traits.
//!
//! The control loop reads balances and offers and submits batches through
//! these three seams. Transport, signing and retries belong to the
//! implementation; the loop imposes no timeouts of its own.

use std::pin::Pin;

use ladder_core::{Amount, Asset, Offer, OfferId, OperationBatch};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Boxed future for dyn-compatible async trait methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn std::future::Future<Output = T> + Send + 'a>>;

/// One balance entry of an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceLine {
    pub asset: Asset,
    pub balance: Amount,
    /// Trust line limit. `None` for the native asset.
    pub limit: Option<Amount>,
}

impl BalanceLine {
    pub fn native(asset: Asset, balance: Amount) -> Self {
        Self {
            asset,
            balance,
            limit: None,
        }
    }

    pub fn credit(asset: Asset, balance: Amount, limit: Amount) -> Self {
        Self {
            asset,
            balance,
            limit: Some(limit),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Batch rejected: {0}")]
    Rejected(String),
}

pub type LedgerResult<T> = Result<T, LedgerError>;

/// Source of account balance lines.
pub trait BalanceSource: Send + Sync {
    fn load_balances<'a>(&'a self, account: &'a str)
        -> BoxFuture<'a, LedgerResult<Vec<BalanceLine>>>;
}

/// Source of the account's own offers, across all pairs.
pub trait OrderBookSource: Send + Sync {
    fn load_own_offers<'a>(&'a self, account: &'a str) -> BoxFuture<'a, LedgerResult<Vec<Offer>>>;
}

/// Submits operation batches. A batch applies entirely or not at all.
pub trait OperationSubmitter: Send + Sync {
    /// Returns the ids assigned to the batch's creates, in batch order.
    fn submit(&self, batch: OperationBatch) -> BoxFuture<'_, LedgerResult<Vec<OfferId>>>;
}
