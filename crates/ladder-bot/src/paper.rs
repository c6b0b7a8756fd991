//! In-memory paper ledger.
//!
//! Implements all three ledger traits over local state for one account and
//! one pair. Offers rest until cancelled; nothing ever fills. Faults can be
//! injected per operation to exercise the control loop's recovery path.

use std::collections::{BTreeMap, HashMap};

use ladder_core::{
    Amount, Asset, Offer, OfferId, OperationBatch, OperationIntent, OrderSide, Price,
};
use parking_lot::Mutex;
use tracing::debug;

use crate::config::AppConfig;
use crate::ledger::{
    BalanceLine, BalanceSource, BoxFuture, LedgerError, LedgerResult, OperationSubmitter,
    OrderBookSource,
};

#[derive(Debug, Default)]
struct Faults {
    balance_loads: u32,
    order_loads: u32,
    submits: u32,
}

/// Consume one pending fault, if any.
fn take_fault(remaining: &mut u32) -> bool {
    if *remaining > 0 {
        *remaining -= 1;
        true
    } else {
        false
    }
}

#[derive(Debug)]
struct PaperState {
    lines: HashMap<Asset, BalanceLine>,
    offers: BTreeMap<OfferId, Offer>,
    next_offer_id: u64,
    faults: Faults,
    submitted: Vec<OperationBatch>,
}

/// In-memory ledger for a single account trading `base`/`quote`.
#[derive(Debug)]
pub struct PaperLedger {
    account: String,
    base: Asset,
    quote: Asset,
    state: Mutex<PaperState>,
}

impl PaperLedger {
    pub fn new(account: impl Into<String>, base: Asset, quote: Asset) -> Self {
        Self {
            account: account.into(),
            base,
            quote,
            state: Mutex::new(PaperState {
                lines: HashMap::new(),
                offers: BTreeMap::new(),
                next_offer_id: 1,
                faults: Faults::default(),
                submitted: Vec::new(),
            }),
        }
    }

    /// Ledger seeded from the `[PAPER]` section.
    pub fn from_config(config: &AppConfig) -> Self {
        let ledger = Self::new(
            config.trading_account.clone(),
            config.base_asset(),
            config.quote_asset(),
        );
        ledger.set_balance(
            config.base_asset(),
            Amount::new(config.paper.balance_a),
            Amount::new(config.paper.limit_a),
        );
        ledger.set_balance(
            config.quote_asset(),
            Amount::new(config.paper.balance_b),
            Amount::new(config.paper.limit_b),
        );
        ledger
    }

    /// Set the balance of an asset. `limit` is dropped for the native asset.
    pub fn set_balance(&self, asset: Asset, balance: Amount, limit: Amount) {
        let line = if asset.is_native() {
            BalanceLine::native(asset.clone(), balance)
        } else {
            BalanceLine::credit(asset.clone(), balance, limit)
        };
        self.state.lock().lines.insert(asset, line);
    }

    pub fn remove_balance(&self, asset: &Asset) {
        self.state.lock().lines.remove(asset);
    }

    /// Place an offer directly, bypassing submission.
    pub fn insert_offer(
        &self,
        selling: Asset,
        buying: Asset,
        price: Price,
        amount: Amount,
    ) -> OfferId {
        let mut state = self.state.lock();
        let id = OfferId::new(state.next_offer_id);
        state.next_offer_id += 1;
        state.offers.insert(
            id,
            Offer {
                id,
                selling,
                buying,
                price,
                amount,
            },
        );
        id
    }

    /// Fail the next `n` balance loads with a transport error.
    pub fn fail_next_balance_loads(&self, n: u32) {
        self.state.lock().faults.balance_loads = n;
    }

    /// Fail the next `n` offer loads with a transport error.
    pub fn fail_next_order_loads(&self, n: u32) {
        self.state.lock().faults.order_loads = n;
    }

    /// Fail the next `n` submissions with a transport error.
    pub fn fail_next_submits(&self, n: u32) {
        self.state.lock().faults.submits = n;
    }

    /// Every batch handed to `submit`, including failed ones.
    pub fn submitted_batches(&self) -> Vec<OperationBatch> {
        self.state.lock().submitted.clone()
    }

    pub fn offers(&self) -> Vec<Offer> {
        self.state.lock().offers.values().cloned().collect()
    }

    fn check_account(&self, account: &str) -> LedgerResult<()> {
        if account != self.account {
            return Err(LedgerError::NotFound(format!("account {account}")));
        }
        Ok(())
    }

    fn pair_for(&self, side: OrderSide) -> (Asset, Asset) {
        match side {
            OrderSide::Sell => (self.base.clone(), self.quote.clone()),
            OrderSide::Buy => (self.quote.clone(), self.base.clone()),
        }
    }

    /// Apply a batch to a copy of the book; the copy replaces the book only
    /// if every intent applied.
    fn apply(&self, state: &mut PaperState, batch: &OperationBatch) -> LedgerResult<Vec<OfferId>> {
        let mut offers = state.offers.clone();
        let mut next_offer_id = state.next_offer_id;
        let mut created = Vec::with_capacity(batch.create_count());

        for intent in batch.intents() {
            match intent {
                OperationIntent::Cancel { id, .. } => {
                    if offers.remove(id).is_none() {
                        return Err(LedgerError::Rejected(format!("unknown offer #{id}")));
                    }
                }
                OperationIntent::Create {
                    side,
                    price,
                    amount,
                } => {
                    if !price.is_positive() || !amount.is_positive() {
                        return Err(LedgerError::Rejected(format!("malformed offer: {intent}")));
                    }
                    let id = OfferId::new(next_offer_id);
                    next_offer_id += 1;
                    created.push(id);
                    let (selling, buying) = self.pair_for(*side);
                    offers.insert(
                        id,
                        Offer {
                            id,
                            selling,
                            buying,
                            price: *price,
                            amount: *amount,
                        },
                    );
                }
            }
        }

        state.offers = offers;
        state.next_offer_id = next_offer_id;
        Ok(created)
    }
}

impl BalanceSource for PaperLedger {
    fn load_balances<'a>(
        &'a self,
        account: &'a str,
    ) -> BoxFuture<'a, LedgerResult<Vec<BalanceLine>>> {
        Box::pin(async move {
            self.check_account(account)?;
            let mut state = self.state.lock();
            if take_fault(&mut state.faults.balance_loads) {
                return Err(LedgerError::Transport("injected balance load fault".to_string()));
            }
            Ok(state.lines.values().cloned().collect())
        })
    }
}

impl OrderBookSource for PaperLedger {
    fn load_own_offers<'a>(
        &'a self,
        account: &'a str,
    ) -> BoxFuture<'a, LedgerResult<Vec<Offer>>> {
        Box::pin(async move {
            self.check_account(account)?;
            let mut state = self.state.lock();
            if take_fault(&mut state.faults.order_loads) {
                return Err(LedgerError::Transport("injected order load fault".to_string()));
            }
            Ok(state.offers.values().cloned().collect())
        })
    }
}

impl OperationSubmitter for PaperLedger {
    fn submit(&self, batch: OperationBatch) -> BoxFuture<'_, LedgerResult<Vec<OfferId>>> {
        Box::pin(async move {
            let mut state = self.state.lock();
            state.submitted.push(batch.clone());
            if take_fault(&mut state.faults.submits) {
                return Err(LedgerError::Transport("injected submit fault".to_string()));
            }
            let created = self.apply(&mut state, &batch)?;
            debug!(
                cancels = batch.cancel_count(),
                creates = batch.create_count(),
                offers = state.offers.len(),
                "Paper batch applied"
            );
            Ok(created)
        })
    }
}
