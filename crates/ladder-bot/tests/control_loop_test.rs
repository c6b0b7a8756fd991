//! Control loop integration tests.
//!
//! Drives full ticks against the paper ledger:
//! - Convergence and the fixed point of an unchanged book
//! - Teardown on every failing phase
//! - Recovery after a failed teardown

use std::sync::Arc;

use ladder_bot::{AppConfig, Bot, PaperLedger, TickOutcome, TickPhase};
use ladder_core::{Amount, Asset, OrderSide, Price};
use ladder_strategy::{make_autonomous_strategy, ComposeStrategy};
use rust_decimal_macros::dec;

const CONFIG: &str = r#"
TRADING_ACCOUNT = "GTRADER"
ASSET_CODE_A = "XLM"
ASSET_CODE_B = "USD"
ISSUER_B = "GISSUER"
TICK_INTERVAL_SECONDS = 1

[STRATEGY]
PRICE_TOLERANCE = 0.001
AMOUNT_TOLERANCE = 0.001
SPREAD = 0.02
AMOUNT_SPREAD = 0.05
MAX_LEVELS = 1
PLATEAU_THRESHOLD_PERCENTAGE = 0.9

[PAPER]
BALANCE_A = 1000
BALANCE_B = 500
LIMIT_B = 100000
"#;

fn xlm() -> Asset {
    Asset::native("XLM")
}

fn usd() -> Asset {
    Asset::credit("USD", "GISSUER")
}

fn setup() -> (Bot<ComposeStrategy>, Arc<PaperLedger>) {
    let config = AppConfig::from_toml(CONFIG).unwrap();
    config.validate().unwrap();
    let strategy = make_autonomous_strategy(&config.strategy).unwrap();
    let ledger = Arc::new(PaperLedger::from_config(&config));
    let bot = Bot::with_ledger(&config, strategy, ledger.clone());
    (bot, ledger)
}

#[tokio::test]
async fn test_first_tick_quotes_both_sides() {
    let (mut bot, ledger) = setup();

    let outcome = bot.tick().await;
    assert_eq!(
        outcome,
        TickOutcome::Converged {
            cancels: 0,
            creates: 2
        }
    );

    let offers = ledger.offers();
    assert_eq!(offers.len(), 2);

    let ask = offers.iter().find(|o| o.selling == xlm()).unwrap();
    assert_eq!(ask.buying, usd());
    assert_eq!(ask.price, Price::new(dec!(0.505)));
    let expected = dec!(40) / dec!(4.02) * dec!(0.95);
    assert!((ask.amount.inner() - expected).abs() < dec!(0.000000001));

    // buy side sells USD, priced in XLM per USD
    let bid = offers.iter().find(|o| o.selling == usd()).unwrap();
    assert_eq!(bid.price, Price::new(dec!(2.02)));
    assert!(bid.amount.inner() < dec!(500));
}

#[tokio::test]
async fn test_unchanged_book_is_a_fixed_point() {
    let (mut bot, ledger) = setup();

    bot.tick().await;
    let outcome = bot.tick().await;

    assert_eq!(
        outcome,
        TickOutcome::Converged {
            cancels: 0,
            creates: 0
        }
    );
    // nothing to do, nothing submitted
    assert_eq!(ledger.submitted_batches().len(), 1);
    assert_eq!(ledger.offers().len(), 2);
    assert_eq!(bot.strategy().sell_side().completed_ticks(), 2);
}

#[tokio::test]
async fn test_balance_load_failure_tears_down_once() {
    let (mut bot, ledger) = setup();
    bot.tick().await;

    ledger.fail_next_balance_loads(1);
    let outcome = bot.tick().await;

    assert_eq!(
        outcome,
        TickOutcome::TornDown {
            phase: TickPhase::LoadBalances,
            cancelled: 2
        }
    );
    let batches = ledger.submitted_batches();
    assert_eq!(batches.len(), 2);
    assert_eq!(batches[1].cancel_count(), 2);
    assert_eq!(batches[1].create_count(), 0);
    assert!(ledger.offers().is_empty());

    // next tick starts over from scratch
    assert_eq!(
        bot.tick().await,
        TickOutcome::Converged {
            cancels: 0,
            creates: 2
        }
    );
}

#[tokio::test]
async fn test_order_load_failure_tears_down() {
    let (mut bot, ledger) = setup();
    bot.tick().await;

    ledger.fail_next_order_loads(1);
    let outcome = bot.tick().await;

    assert_eq!(
        outcome,
        TickOutcome::TornDown {
            phase: TickPhase::LoadOrders,
            cancelled: 2
        }
    );
    assert!(ledger.offers().is_empty());
}

#[tokio::test]
async fn test_teardown_falls_back_to_orders_placed_last_tick() {
    let (mut bot, ledger) = setup();
    ledger.insert_offer(xlm(), usd(), Price::new(dec!(5)), Amount::new(dec!(10)));

    assert_eq!(
        bot.tick().await,
        TickOutcome::Converged {
            cancels: 1,
            creates: 2
        }
    );

    // the teardown reload fails too, so only the remembered orders are known
    ledger.fail_next_balance_loads(1);
    ledger.fail_next_order_loads(1);
    let outcome = bot.tick().await;

    assert_eq!(
        outcome,
        TickOutcome::TornDown {
            phase: TickPhase::LoadBalances,
            cancelled: 2
        }
    );
    assert!(ledger.offers().is_empty());
    assert!(bot.resting_orders().is_empty());
}

#[tokio::test]
async fn test_resting_orders_include_survivors_and_creates() {
    let (mut bot, ledger) = setup();

    bot.tick().await;
    let mut remembered: Vec<_> = bot.resting_orders().iter().map(|o| o.id).collect();
    remembered.sort();
    let on_book: Vec<_> = ledger.offers().iter().map(|o| o.id).collect();
    assert_eq!(remembered, on_book);

    // a fixed-point tick keeps both survivors
    bot.tick().await;
    let sides: Vec<_> = bot.resting_orders().iter().map(|o| o.side).collect();
    assert_eq!(sides.len(), 2);
    assert!(sides.contains(&OrderSide::Buy));
    assert!(sides.contains(&OrderSide::Sell));
}

#[tokio::test]
async fn test_submit_failure_tears_down_stale_orders() {
    let (mut bot, ledger) = setup();
    ledger.insert_offer(xlm(), usd(), Price::new(dec!(5)), Amount::new(dec!(10)));
    ledger.fail_next_submits(1);

    let outcome = bot.tick().await;

    assert_eq!(
        outcome,
        TickOutcome::TornDown {
            phase: TickPhase::Submit,
            cancelled: 1
        }
    );
    let batches = ledger.submitted_batches();
    assert_eq!(batches.len(), 2);
    // the rejected batch cancelled first, then created
    assert_eq!(batches[0].cancel_count(), 1);
    assert_eq!(batches[0].create_count(), 2);
    assert!(batches[0].intents()[0].is_cancel());
    assert_eq!(batches[1].create_count(), 0);
    assert!(ledger.offers().is_empty());
}

#[tokio::test]
async fn test_failed_teardown_keeps_loop_running() {
    let (mut bot, ledger) = setup();
    bot.tick().await;

    ledger.fail_next_balance_loads(1);
    ledger.fail_next_submits(1);
    let outcome = bot.tick().await;

    assert_eq!(
        outcome,
        TickOutcome::TornDown {
            phase: TickPhase::LoadBalances,
            cancelled: 0
        }
    );
    assert_eq!(ledger.offers().len(), 2);

    // the surviving orders still match their levels
    assert_eq!(
        bot.tick().await,
        TickOutcome::Converged {
            cancels: 0,
            creates: 0
        }
    );
    assert_eq!(bot.ticks(), 3);
}

#[tokio::test]
async fn test_negative_balance_fails_pre_update() {
    let (mut bot, ledger) = setup();
    ledger.set_balance(xlm(), Amount::new(dec!(-5)), Amount::ZERO);

    let outcome = bot.tick().await;

    assert_eq!(
        outcome,
        TickOutcome::TornDown {
            phase: TickPhase::PreUpdate,
            cancelled: 0
        }
    );
    assert!(ledger.submitted_batches().is_empty());
}

#[tokio::test]
async fn test_offers_on_other_pairs_are_left_alone() {
    let (mut bot, ledger) = setup();
    let eur = Asset::credit("EUR", "GISSUER");
    ledger.insert_offer(xlm(), eur, Price::new(dec!(0.4)), Amount::new(dec!(3)));

    bot.tick().await;
    assert_eq!(ledger.offers().len(), 3);

    assert_eq!(bot.teardown_all_orders().await.unwrap(), 2);
    let remaining = ledger.offers();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].buying.code, "EUR");
}

#[tokio::test]
async fn test_full_trust_line_stops_selling_base() {
    let (mut bot, ledger) = setup();
    ledger.set_balance(usd(), Amount::new(dec!(100000)), Amount::new(dec!(100000)));

    let outcome = bot.tick().await;

    assert_eq!(
        outcome,
        TickOutcome::Converged {
            cancels: 0,
            creates: 1
        }
    );
    let offers = ledger.offers();
    assert_eq!(offers.len(), 1);
    assert_eq!(offers[0].selling, usd());
}

#[tokio::test]
async fn test_missing_quote_line_quotes_nothing() {
    let (mut bot, ledger) = setup();
    ledger.remove_balance(&usd());

    let outcome = bot.tick().await;

    assert_eq!(
        outcome,
        TickOutcome::Converged {
            cancels: 0,
            creates: 0
        }
    );
    assert!(ledger.offers().is_empty());
}
