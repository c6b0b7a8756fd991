//! Two-sided composition of side strategies.
//!
//! Pairs a buy-direction and a sell-direction strategy behind the same
//! lifecycle. The buy side sees the pair inverted (it sells the quote
//! asset), so its balances are swapped before they are handed down.
//! Intents are always concatenated sell side first, then buy side.

use ladder_core::{Balances, OperationIntent, OrderSide, RestingOrder};
use tracing::warn;

use crate::config::StrategyConfig;
use crate::error::{StrategyError, StrategyResult};
use crate::level_provider::AutonomousLevelProvider;
use crate::side::SideStrategy;
use crate::strategy::{PruneOutcome, Strategy};

/// Buy side plus sell side behind one `Strategy`.
#[derive(Debug)]
pub struct ComposeStrategy<L: Strategy = SideStrategy> {
    buy: L,
    sell: L,
}

impl<L: Strategy> ComposeStrategy<L> {
    pub fn new(buy: L, sell: L) -> Self {
        Self { buy, sell }
    }

    pub fn buy_side(&self) -> &L {
        &self.buy
    }

    pub fn sell_side(&self) -> &L {
        &self.sell
    }
}

impl<L: Strategy> Strategy for ComposeStrategy<L> {
    /// Short-circuits on the first failing side.
    fn pre_update(&mut self, balances: &Balances) -> StrategyResult<()> {
        self.sell.pre_update(balances)?;
        self.buy.pre_update(&balances.inverted())?;
        Ok(())
    }

    fn prune_existing_offers(
        &mut self,
        buying: Vec<RestingOrder>,
        selling: Vec<RestingOrder>,
    ) -> PruneOutcome {
        let sell = self.sell.prune_existing_offers(buying, selling);
        let buy = self.buy.prune_existing_offers(sell.buying, sell.selling);

        let mut cancels = sell.cancels;
        cancels.extend(buy.cancels);
        PruneOutcome {
            cancels,
            buying: buy.buying,
            selling: buy.selling,
        }
    }

    fn update_with_ops(
        &mut self,
        buying: &[RestingOrder],
        selling: &[RestingOrder],
    ) -> StrategyResult<Vec<OperationIntent>> {
        let mut ops = self.sell.update_with_ops(buying, selling)?;
        ops.extend(self.buy.update_with_ops(buying, selling)?);
        Ok(ops)
    }

    /// Runs both hooks even if the first fails, so neither side's
    /// bookkeeping is left stale.
    fn post_update(&mut self) -> StrategyResult<()> {
        let sell = self.sell.post_update();
        let buy = self.buy.post_update();

        match (buy, sell) {
            (Ok(()), Ok(())) => Ok(()),
            (Err(e), Ok(())) | (Ok(()), Err(e)) => Err(e),
            (Err(buy), Err(sell)) => {
                warn!(%buy, %sell, "post_update failed on both sides");
                Err(StrategyError::BothSides {
                    buy: Box::new(buy),
                    sell: Box::new(sell),
                })
            }
        }
    }
}

/// Build the two-sided autonomous strategy from configuration.
///
/// The sell side sizes from its base balance; the buy side sizes from the
/// asset it acquires and converts that amount into the quote units it sells.
pub fn make_autonomous_strategy(config: &StrategyConfig) -> StrategyResult<ComposeStrategy> {
    config.validate()?;

    let sell_provider = AutonomousLevelProvider::new(
        config.spread,
        config.plateau_threshold_percentage,
        false,
        config.amount_spread,
    )?;
    let buy_provider = AutonomousLevelProvider::new(
        config.spread,
        config.plateau_threshold_percentage,
        true,
        config.amount_spread,
    )?;

    let sell = SideStrategy::new(OrderSide::Sell, Box::new(sell_provider), config, false);
    let buy = SideStrategy::new(OrderSide::Buy, Box::new(buy_provider), config, true);

    Ok(ComposeStrategy::new(buy, sell))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ladder_core::{Amount, OfferId, Price};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn config() -> StrategyConfig {
        StrategyConfig {
            price_tolerance: dec!(0.001),
            amount_tolerance: dec!(0.001),
            spread: dec!(0.02),
            amount_spread: dec!(0.05),
            max_levels: 1,
            plateau_threshold_percentage: dec!(0.9),
        }
    }

    fn balances() -> Balances {
        Balances::new(
            Amount::new(dec!(1000)),
            Amount::new(dec!(500)),
            Amount::new(dec!(100000000000)),
            Amount::new(dec!(100000)),
        )
    }

    /// Materialize create intents as resting orders, as a ledger would.
    fn materialize(
        ops: &[OperationIntent],
        next_id: &mut u64,
    ) -> (Vec<RestingOrder>, Vec<RestingOrder>) {
        let mut buying = Vec::new();
        let mut selling = Vec::new();
        for op in ops {
            if let OperationIntent::Create {
                side,
                price,
                amount,
            } = op
            {
                *next_id += 1;
                let order = RestingOrder::new(OfferId::new(*next_id), *side, *price, *amount);
                match side {
                    OrderSide::Buy => buying.push(order),
                    OrderSide::Sell => selling.push(order),
                }
            }
        }
        (buying, selling)
    }

    #[test]
    fn test_intents_ordered_sell_then_buy() {
        let mut strat = make_autonomous_strategy(&config()).unwrap();
        strat.pre_update(&balances()).unwrap();

        let pruned = strat.prune_existing_offers(vec![], vec![]);
        let ops = strat.update_with_ops(&pruned.buying, &pruned.selling).unwrap();

        assert_eq!(ops.len(), 2);
        assert_eq!(ops[0].side(), OrderSide::Sell);
        assert_eq!(ops[1].side(), OrderSide::Buy);
    }

    #[test]
    fn test_prune_cancels_ordered_sell_then_buy() {
        let mut strat = make_autonomous_strategy(&config()).unwrap();
        strat.pre_update(&balances()).unwrap();

        let stale_buy = RestingOrder::new(
            OfferId::new(1),
            OrderSide::Buy,
            Price::new(dec!(100)),
            Amount::new(dec!(1)),
        );
        let stale_sell = RestingOrder::new(
            OfferId::new(2),
            OrderSide::Sell,
            Price::new(dec!(100)),
            Amount::new(dec!(1)),
        );
        let pruned = strat.prune_existing_offers(vec![stale_buy], vec![stale_sell]);

        assert_eq!(
            pruned.cancels,
            vec![
                OperationIntent::cancel(OfferId::new(2), OrderSide::Sell),
                OperationIntent::cancel(OfferId::new(1), OrderSide::Buy),
            ]
        );
        assert!(pruned.buying.is_empty());
        assert!(pruned.selling.is_empty());
    }

    #[test]
    fn test_quotes_never_cross() {
        for (base, quote) in [
            (dec!(1000), dec!(500)),
            (dec!(10), dec!(10000)),
            (dec!(10000), dec!(10)),
            (dec!(1), dec!(1)),
        ] {
            let mut strat = make_autonomous_strategy(&config()).unwrap();
            let b = Balances::new(
                Amount::new(base),
                Amount::new(quote),
                Amount::new(dec!(100000000000)),
                Amount::new(dec!(100000000000)),
            );
            strat.pre_update(&b).unwrap();

            let ask = strat.sell_side().targets()[0].price();
            // buy side is priced base-per-quote; bring it back to quote-per-base
            let bid = strat.buy_side().targets()[0].price().invert().unwrap();
            assert!(bid < ask, "bid {bid} must stay below ask {ask}");
        }
    }

    #[test]
    fn test_converged_book_is_a_fixed_point() {
        let mut strat = make_autonomous_strategy(&config()).unwrap();
        let mut next_id = 0;

        strat.pre_update(&balances()).unwrap();
        let pruned = strat.prune_existing_offers(vec![], vec![]);
        let ops = strat.update_with_ops(&pruned.buying, &pruned.selling).unwrap();
        strat.post_update().unwrap();
        assert_eq!(ops.len(), 2);

        let (buying, selling) = materialize(&ops, &mut next_id);

        // same balances, book now holds exactly what was asked for
        strat.pre_update(&balances()).unwrap();
        let pruned = strat.prune_existing_offers(buying.clone(), selling.clone());
        let ops = strat.update_with_ops(&pruned.buying, &pruned.selling).unwrap();
        strat.post_update().unwrap();

        assert!(pruned.cancels.is_empty());
        assert!(ops.is_empty());
        assert_eq!(pruned.buying, buying);
        assert_eq!(pruned.selling, selling);
        assert_eq!(strat.sell_side().resting_orders(), selling.as_slice());
        assert_eq!(strat.buy_side().resting_orders(), buying.as_slice());
    }

    #[test]
    fn test_invalid_config_fails_construction() {
        let bad = StrategyConfig {
            amount_spread: Decimal::ONE,
            ..config()
        };
        assert!(matches!(
            make_autonomous_strategy(&bad),
            Err(StrategyError::Config(_))
        ));
    }

    /// Leaf that records calls and fails on demand.
    #[derive(Debug, Default)]
    struct RecordingLeaf {
        fail_pre: bool,
        fail_post: bool,
        pre_calls: u32,
        post_calls: u32,
        seen_balances: Option<Balances>,
    }

    impl Strategy for RecordingLeaf {
        fn pre_update(&mut self, balances: &Balances) -> StrategyResult<()> {
            self.pre_calls += 1;
            self.seen_balances = Some(*balances);
            if self.fail_pre {
                return Err(StrategyError::Level("injected".to_string()));
            }
            Ok(())
        }

        fn prune_existing_offers(
            &mut self,
            buying: Vec<RestingOrder>,
            selling: Vec<RestingOrder>,
        ) -> PruneOutcome {
            PruneOutcome {
                cancels: vec![],
                buying,
                selling,
            }
        }

        fn update_with_ops(
            &mut self,
            _: &[RestingOrder],
            _: &[RestingOrder],
        ) -> StrategyResult<Vec<OperationIntent>> {
            Ok(vec![])
        }

        fn post_update(&mut self) -> StrategyResult<()> {
            self.post_calls += 1;
            if self.fail_post {
                return Err(StrategyError::Level("injected".to_string()));
            }
            Ok(())
        }
    }

    #[test]
    fn test_pre_update_swaps_balances_for_buy_side() {
        let mut strat = ComposeStrategy::new(RecordingLeaf::default(), RecordingLeaf::default());
        strat.pre_update(&balances()).unwrap();

        assert_eq!(strat.sell_side().seen_balances, Some(balances()));
        assert_eq!(strat.buy_side().seen_balances, Some(balances().inverted()));
    }

    #[test]
    fn test_pre_update_short_circuits() {
        let sell = RecordingLeaf {
            fail_pre: true,
            ..Default::default()
        };
        let mut strat = ComposeStrategy::new(RecordingLeaf::default(), sell);

        assert!(strat.pre_update(&balances()).is_err());
        assert_eq!(strat.sell_side().pre_calls, 1);
        assert_eq!(strat.buy_side().pre_calls, 0);
    }

    #[test]
    fn test_post_update_attempts_both_sides() {
        let sell = RecordingLeaf {
            fail_post: true,
            ..Default::default()
        };
        let mut strat = ComposeStrategy::new(RecordingLeaf::default(), sell);

        assert!(matches!(strat.post_update(), Err(StrategyError::Level(_))));
        assert_eq!(strat.sell_side().post_calls, 1);
        assert_eq!(strat.buy_side().post_calls, 1);
    }

    #[test]
    fn test_post_update_reports_both_failures() {
        let failing = || RecordingLeaf {
            fail_post: true,
            ..Default::default()
        };
        let mut strat = ComposeStrategy::new(failing(), failing());

        assert!(matches!(
            strat.post_update(),
            Err(StrategyError::BothSides { .. })
        ));
    }
}
