//! Single-direction reconciler.
//!
//! Owns the resting orders of one side and decides, each tick, which to
//! keep, cancel or create:
//! - Target levels are computed once in `pre_update`
//! - Levels claim orders greedily by ascending index (innermost first); an
//!   order matches when both price and amount are within tolerance
//! - `prune_existing_offers` cancels every unclaimed order
//! - `update_with_ops` creates every unclaimed level
//!
//! Everything is expressed in the frame of the asset this side sells:
//! balances arrive as (sold asset = base, bought asset = quote).

use std::fmt;

use ladder_core::{Balances, Level, OperationIntent, OrderSide, RestingOrder};
use rust_decimal::Decimal;
use tracing::{debug, info};

use crate::config::StrategyConfig;
use crate::error::{StrategyError, StrategyResult};
use crate::level_provider::LevelProvider;
use crate::strategy::{PruneOutcome, Strategy};

/// Reconciler for one side of the book.
pub struct SideStrategy {
    side: OrderSide,
    provider: Box<dyn LevelProvider>,
    price_tolerance: Decimal,
    amount_tolerance: Decimal,
    max_levels: usize,
    /// Level amounts are in bought units; convert to sold units via the level price.
    divide_amount_by_price: bool,

    /// Balances snapshot of the current tick.
    balances: Option<Balances>,
    /// Order targets of the current tick: price and amount in sold units.
    targets: Vec<Level>,
    /// Orders kept by the last completed tick.
    resting: Vec<RestingOrder>,
    /// Orders kept by the current tick, committed in `post_update`.
    staged: Vec<RestingOrder>,
    completed_ticks: u64,
}

impl fmt::Debug for SideStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SideStrategy")
            .field("side", &self.side)
            .field("price_tolerance", &self.price_tolerance)
            .field("amount_tolerance", &self.amount_tolerance)
            .field("max_levels", &self.max_levels)
            .field("divide_amount_by_price", &self.divide_amount_by_price)
            .field("targets", &self.targets)
            .field("resting", &self.resting.len())
            .field("completed_ticks", &self.completed_ticks)
            .finish()
    }
}

impl SideStrategy {
    /// Create a side strategy using the tolerances and level cap of `config`.
    pub fn new(
        side: OrderSide,
        provider: Box<dyn LevelProvider>,
        config: &StrategyConfig,
        divide_amount_by_price: bool,
    ) -> Self {
        Self {
            side,
            provider,
            price_tolerance: config.price_tolerance,
            amount_tolerance: config.amount_tolerance,
            max_levels: config.max_levels as usize,
            divide_amount_by_price,
            balances: None,
            targets: Vec::new(),
            resting: Vec::new(),
            staged: Vec::new(),
            completed_ticks: 0,
        }
    }

    pub fn side(&self) -> OrderSide {
        self.side
    }

    /// Order targets computed by the last `pre_update`.
    pub fn targets(&self) -> &[Level] {
        &self.targets
    }

    /// Orders kept by the last completed tick.
    pub fn resting_orders(&self) -> &[RestingOrder] {
        &self.resting
    }

    pub fn completed_ticks(&self) -> u64 {
        self.completed_ticks
    }

    fn matches(&self, order: &RestingOrder, target: &Level) -> bool {
        order.price.within(target.price(), self.price_tolerance)
            && order.amount.within(target.amount(), self.amount_tolerance)
    }

    /// For each target (by index), the index of the order it claims.
    fn match_levels(&self, orders: &[RestingOrder]) -> Vec<Option<usize>> {
        let mut claimed = vec![false; orders.len()];
        let mut assignment = Vec::with_capacity(self.targets.len());

        for target in &self.targets {
            let mut found = None;
            for (j, order) in orders.iter().enumerate() {
                if !claimed[j] && self.matches(order, target) {
                    found = Some(j);
                    break;
                }
            }
            if let Some(j) = found {
                claimed[j] = true;
            }
            assignment.push(found);
        }

        assignment
    }

    fn build_targets(&self, balances: &Balances) -> StrategyResult<Vec<Level>> {
        let levels = self
            .provider
            .get_levels(balances.max_base, balances.max_quote)?;

        let mut targets = Vec::with_capacity(self.max_levels.min(levels.len()));
        for (index, level) in levels.into_iter().take(self.max_levels).enumerate() {
            let mut amount = if self.divide_amount_by_price {
                level.amount().per_price(level.price())?
            } else {
                level.amount()
            };
            if amount > balances.max_base {
                amount = balances.max_base;
            }
            if !amount.is_positive() {
                debug!(side = %self.side, index, "Skipping level with zero amount");
                continue;
            }
            targets.push(Level::new(level.price(), amount));
        }

        Ok(targets)
    }
}

impl Strategy for SideStrategy {
    fn pre_update(&mut self, balances: &Balances) -> StrategyResult<()> {
        balances
            .check_non_negative()
            .map_err(|e| StrategyError::InvalidBalances {
                side: self.side,
                reason: e.to_string(),
            })?;

        self.balances = Some(*balances);
        self.targets.clear();
        self.staged.clear();

        // nothing to sell, or no room left to receive the bought asset
        let nothing_to_sell = balances.max_base.is_zero();
        let line_full = balances.max_quote >= balances.trust_quote;
        if nothing_to_sell || line_full {
            info!(
                side = %self.side,
                nothing_to_sell,
                line_full,
                "No capacity to place orders on this side"
            );
            return Ok(());
        }

        self.targets = self.build_targets(balances)?;
        debug!(
            side = %self.side,
            levels = self.targets.len(),
            targets = ?self.targets.iter().map(|l| l.to_string()).collect::<Vec<_>>(),
            "Target levels computed"
        );
        Ok(())
    }

    fn prune_existing_offers(
        &mut self,
        buying: Vec<RestingOrder>,
        selling: Vec<RestingOrder>,
    ) -> PruneOutcome {
        let (own, other) = match self.side {
            OrderSide::Buy => (buying, selling),
            OrderSide::Sell => (selling, buying),
        };

        let mut keep = vec![false; own.len()];
        for j in self.match_levels(&own).into_iter().flatten() {
            keep[j] = true;
        }

        let mut cancels = Vec::new();
        let mut survivors = Vec::with_capacity(own.len());
        for (order, kept) in own.into_iter().zip(keep) {
            if kept {
                survivors.push(order);
            } else {
                debug!(
                    side = %self.side,
                    offer_id = %order.id,
                    price = %order.price,
                    amount = %order.amount,
                    "Order matches no target level"
                );
                cancels.push(OperationIntent::cancel(order.id, order.side));
            }
        }

        if !cancels.is_empty() {
            info!(
                side = %self.side,
                cancels = cancels.len(),
                kept = survivors.len(),
                "Pruning orders outside tolerance"
            );
        }

        let (buying, selling) = match self.side {
            OrderSide::Buy => (survivors, other),
            OrderSide::Sell => (other, survivors),
        };
        PruneOutcome {
            cancels,
            buying,
            selling,
        }
    }

    fn update_with_ops(
        &mut self,
        buying: &[RestingOrder],
        selling: &[RestingOrder],
    ) -> StrategyResult<Vec<OperationIntent>> {
        if self.balances.is_none() {
            return Err(StrategyError::NotPrepared(self.side));
        }

        let own = match self.side {
            OrderSide::Buy => buying,
            OrderSide::Sell => selling,
        };

        let assignment = self.match_levels(own);
        let mut intents = Vec::new();
        let mut kept = Vec::with_capacity(own.len());

        for (index, (target, claimed)) in self.targets.iter().zip(assignment).enumerate() {
            match claimed {
                Some(j) => {
                    debug!(
                        side = %self.side,
                        index,
                        offer_id = %own[j].id,
                        "Level already satisfied"
                    );
                    kept.push(own[j].clone());
                }
                None => {
                    debug!(side = %self.side, index, target = %target, "Creating level");
                    intents.push(OperationIntent::create(
                        self.side,
                        target.price(),
                        target.amount(),
                    ));
                }
            }
        }

        if kept.len() < own.len() {
            debug!(
                side = %self.side,
                unclaimed = own.len() - kept.len(),
                "Orders left unclaimed by any level"
            );
        }

        self.staged = kept;
        Ok(intents)
    }

    fn post_update(&mut self) -> StrategyResult<()> {
        self.resting = std::mem::take(&mut self.staged);
        self.completed_ticks += 1;
        Ok(())
    }
}
