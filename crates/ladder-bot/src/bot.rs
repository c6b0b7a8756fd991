//! Control loop.
//!
//! One tick runs the phases in order and submits at most one batch:
//!
//! ```text
//! LoadBalances → LoadOrders → PreUpdate → Prune → UpdateWithOps → Submit → PostUpdate
//! ```
//!
//! A failure in any phase tears down every order the bot owns on the pair,
//! then the loop carries on with the next tick.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use ladder_core::{
    partition_offers, Amount, Asset, Balances, OperationBatch, OrderSide, RestingOrder,
};
use ladder_strategy::Strategy;
use ladder_telemetry::Metrics;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::{debug, error, info, warn};

use crate::config::AppConfig;
use crate::error::{AppError, AppResult};
use crate::ledger::{BalanceLine, BalanceSource, OperationSubmitter, OrderBookSource};

/// Trust ceiling given to the native asset, which has no trust line.
pub const MAX_NATIVE_TRUST: Decimal = dec!(100000000000);

/// Phase of a tick, reported when the tick fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickPhase {
    LoadBalances,
    LoadOrders,
    PreUpdate,
    UpdateWithOps,
    Submit,
    PostUpdate,
}

impl TickPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LoadBalances => "load_balances",
            Self::LoadOrders => "load_orders",
            Self::PreUpdate => "pre_update",
            Self::UpdateWithOps => "update_with_ops",
            Self::Submit => "submit",
            Self::PostUpdate => "post_update",
        }
    }
}

impl fmt::Display for TickPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a tick ended with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Every phase succeeded; the batch held this many intents.
    Converged { cancels: usize, creates: usize },
    /// `phase` failed and the teardown cancelled this many orders.
    TornDown { phase: TickPhase, cancelled: usize },
}

struct PhaseFailure {
    phase: TickPhase,
    error: AppError,
}

fn at<E: Into<AppError>>(phase: TickPhase) -> impl FnOnce(E) -> PhaseFailure {
    move |e| PhaseFailure {
        phase,
        error: e.into(),
    }
}

/// Map an account's balance lines onto the pair's `Balances`.
///
/// A missing line counts as zero balance and zero trust. The native asset
/// always gets `MAX_NATIVE_TRUST`.
pub fn balances_from_lines(lines: &[BalanceLine], base: &Asset, quote: &Asset) -> Balances {
    let (max_base, trust_base) = line_for(lines, base);
    let (max_quote, trust_quote) = line_for(lines, quote);
    Balances::new(max_base, max_quote, trust_base, trust_quote)
}

fn line_for(lines: &[BalanceLine], asset: &Asset) -> (Amount, Amount) {
    let balance = lines
        .iter()
        .find(|line| &line.asset == asset)
        .map(|line| (line.balance, line.limit.unwrap_or(Amount::ZERO)));

    let (balance, limit) = balance.unwrap_or((Amount::ZERO, Amount::ZERO));
    if asset.is_native() {
        (balance, Amount::new(MAX_NATIVE_TRUST))
    } else {
        (balance, limit)
    }
}

/// Number of buy and sell orders among `orders`.
fn count_by_side(orders: &[RestingOrder]) -> (usize, usize) {
    let buying = orders.iter().filter(|o| o.side == OrderSide::Buy).count();
    (buying, orders.len() - buying)
}

/// Market making bot for one account and one pair.
pub struct Bot<S: Strategy> {
    account: String,
    base: Asset,
    quote: Asset,
    tick_interval: Duration,
    strategy: S,
    balance_source: Arc<dyn BalanceSource>,
    order_source: Arc<dyn OrderBookSource>,
    submitter: Arc<dyn OperationSubmitter>,
    /// Pair orders believed to rest on the book; teardown fallback.
    snapshot: Vec<RestingOrder>,
    ticks: u64,
}

impl<S: Strategy> Bot<S> {
    pub fn new(
        config: &AppConfig,
        strategy: S,
        balance_source: Arc<dyn BalanceSource>,
        order_source: Arc<dyn OrderBookSource>,
        submitter: Arc<dyn OperationSubmitter>,
    ) -> Self {
        Self {
            account: config.trading_account.clone(),
            base: config.base_asset(),
            quote: config.quote_asset(),
            tick_interval: config.tick_interval(),
            strategy,
            balance_source,
            order_source,
            submitter,
            snapshot: Vec::new(),
            ticks: 0,
        }
    }

    /// Bot reading and writing through one ledger.
    pub fn with_ledger<L>(config: &AppConfig, strategy: S, ledger: Arc<L>) -> Self
    where
        L: BalanceSource + OrderBookSource + OperationSubmitter + 'static,
    {
        Self::new(config, strategy, ledger.clone(), ledger.clone(), ledger)
    }

    pub fn strategy(&self) -> &S {
        &self.strategy
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Orders the bot believes rest on the book after its last tick.
    pub fn resting_orders(&self) -> &[RestingOrder] {
        &self.snapshot
    }

    /// Run ticks until Ctrl-C, then tear down all orders.
    pub async fn run(&mut self) -> AppResult<()> {
        info!(
            account = %self.account,
            base = %self.base,
            quote = %self.quote,
            interval_secs = self.tick_interval.as_secs(),
            "Entering control loop"
        );

        loop {
            self.tick().await;

            info!(interval_secs = self.tick_interval.as_secs(), "Sleeping until next tick");
            tokio::select! {
                _ = tokio::time::sleep(self.tick_interval) => {}
                result = tokio::signal::ctrl_c() => {
                    result?;
                    info!("Shutdown signal received");
                    break;
                }
            }
        }

        match self.teardown_all_orders().await {
            Ok(cancelled) => info!(cancelled, ticks = self.ticks, "Shut down"),
            Err(e) => error!(error = %e, "Final teardown failed; orders may remain on the book"),
        }
        match Metrics::encode_text() {
            Ok(text) => debug!(metrics = %text, "Final metrics"),
            Err(e) => warn!(error = %e, "Encoding final metrics failed"),
        }
        Ok(())
    }

    /// Run one reconciliation tick. Never fails: errors end in a teardown.
    pub async fn tick(&mut self) -> TickOutcome {
        let started_at: DateTime<Utc> = Utc::now();
        self.ticks += 1;

        match self.reconcile().await {
            Ok((cancels, creates)) => {
                Metrics::tick_converged();
                info!(
                    tick = self.ticks,
                    %started_at,
                    cancels,
                    creates,
                    "Tick converged"
                );
                TickOutcome::Converged { cancels, creates }
            }
            Err(failure) => {
                warn!(
                    tick = self.ticks,
                    %started_at,
                    phase = %failure.phase,
                    error = %failure.error,
                    "Tick failed, tearing down all orders"
                );
                let cancelled = match self.teardown_all_orders().await {
                    Ok(cancelled) => cancelled,
                    Err(e) => {
                        error!(phase = %failure.phase, error = %e, "Teardown failed");
                        0
                    }
                };
                Metrics::tick_torn_down(failure.phase.as_str());
                TickOutcome::TornDown {
                    phase: failure.phase,
                    cancelled,
                }
            }
        }
    }

    async fn reconcile(&mut self) -> Result<(usize, usize), PhaseFailure> {
        let lines = self
            .balance_source
            .load_balances(&self.account)
            .await
            .map_err(at(TickPhase::LoadBalances))?;
        let balances = balances_from_lines(&lines, &self.base, &self.quote);
        self.record_balances(&balances);

        let offers = self
            .order_source
            .load_own_offers(&self.account)
            .await
            .map_err(at(TickPhase::LoadOrders))?;
        let (buying, selling) = partition_offers(&offers, &self.base, &self.quote);
        debug!(
            buying = buying.len(),
            selling = selling.len(),
            "Loaded own offers"
        );
        self.snapshot = buying.iter().chain(selling.iter()).cloned().collect();

        self.strategy
            .pre_update(&balances)
            .map_err(at(TickPhase::PreUpdate))?;

        let pruned = self.strategy.prune_existing_offers(buying, selling);
        let creates = self
            .strategy
            .update_with_ops(&pruned.buying, &pruned.selling)
            .map_err(at(TickPhase::UpdateWithOps))?;

        let batch = OperationBatch::from_phases(pruned.cancels, creates);
        let (cancels, creates) = (batch.cancel_count(), batch.create_count());
        let mut resting: Vec<RestingOrder> =
            pruned.buying.into_iter().chain(pruned.selling).collect();
        if !batch.is_empty() {
            let ids = self
                .submitter
                .submit(batch.clone())
                .await
                .map_err(at(TickPhase::Submit))?;
            if ids.len() != creates {
                warn!(creates, ids = ids.len(), "Submitter returned unexpected offer ids");
            }
            resting.extend(batch.placed_orders(&ids));
            Metrics::intents_submitted(cancels, creates);
        }
        self.snapshot = resting;

        self.strategy
            .post_update()
            .map_err(at(TickPhase::PostUpdate))?;

        let (buying, selling) = count_by_side(&self.snapshot);
        Metrics::resting_orders(OrderSide::Buy.as_str(), buying);
        Metrics::resting_orders(OrderSide::Sell.as_str(), selling);
        Ok((cancels, creates))
    }

    /// Cancel every order the bot owns on the pair, on both sides.
    ///
    /// Reloads the account's offers first and falls back to the last
    /// snapshot if that fails. The snapshot holds the orders resting after
    /// the last submission, including the ones it created, and is cleared
    /// either way.
    pub async fn teardown_all_orders(&mut self) -> AppResult<usize> {
        let orders: Vec<RestingOrder> = match self.order_source.load_own_offers(&self.account).await {
            Ok(offers) => {
                let (buying, selling) = partition_offers(&offers, &self.base, &self.quote);
                buying.into_iter().chain(selling).collect()
            }
            Err(e) => {
                warn!(error = %e, "Reloading offers for teardown failed, using last snapshot");
                std::mem::take(&mut self.snapshot)
            }
        };
        self.snapshot.clear();

        let batch = OperationBatch::cancel_all(&orders);
        info!(count = batch.len(), "Deleting all offers");
        if batch.is_empty() {
            return Ok(0);
        }

        let cancelled = batch.len();
        self.submitter.submit(batch).await?;
        Metrics::intents_submitted(cancelled, 0);
        Metrics::resting_orders(OrderSide::Buy.as_str(), 0);
        Metrics::resting_orders(OrderSide::Sell.as_str(), 0);
        Ok(cancelled)
    }

    fn record_balances(&self, balances: &Balances) {
        let as_f64 = |a: Amount| a.inner().to_f64().unwrap_or(0.0);
        Metrics::balance(&self.base.to_string(), as_f64(balances.max_base));
        Metrics::balance(&self.quote.to_string(), as_f64(balances.max_quote));
        debug!(
            max_base = %balances.max_base,
            max_quote = %balances.max_quote,
            trust_base = %balances.trust_base,
            trust_quote = %balances.trust_quote,
            "Loaded balances"
        );
    }
}
