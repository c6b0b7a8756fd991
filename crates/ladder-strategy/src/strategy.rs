//! The four-phase strategy lifecycle.

use ladder_core::{Balances, OperationIntent, RestingOrder};

use crate::error::StrategyResult;

/// Result of the prune phase.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PruneOutcome {
    /// Cancels for orders that no longer match any target level.
    pub cancels: Vec<OperationIntent>,
    /// Surviving buy-side orders (untouched if the strategy does not own that side).
    pub buying: Vec<RestingOrder>,
    /// Surviving sell-side orders (untouched if the strategy does not own that side).
    pub selling: Vec<RestingOrder>,
}

/// Lifecycle run once per tick by the control loop.
///
/// Implemented by a single side and by the two-sided composition. Strategies
/// never touch the ledger; they only emit intents.
pub trait Strategy: Send {
    /// Store this tick's balances and compute target levels.
    fn pre_update(&mut self, balances: &Balances) -> StrategyResult<()>;

    /// Cancel own orders that no longer match a target level.
    fn prune_existing_offers(
        &mut self,
        buying: Vec<RestingOrder>,
        selling: Vec<RestingOrder>,
    ) -> PruneOutcome;

    /// Create intents for every target level without a matching order.
    fn update_with_ops(
        &mut self,
        buying: &[RestingOrder],
        selling: &[RestingOrder],
    ) -> StrategyResult<Vec<OperationIntent>>;

    /// Commit bookkeeping once the tick's batch was submitted.
    fn post_update(&mut self) -> StrategyResult<()>;
}
