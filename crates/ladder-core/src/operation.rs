//! Operation intents produced by strategies and consumed by submission.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{Amount, OfferId, OrderSide, Price};

/// A request to change the live book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum OperationIntent {
    /// Cancel one of the bot's resting orders.
    Cancel { id: OfferId, side: OrderSide },
    /// Create a new order. Price and amount are in the side's own frame.
    Create {
        side: OrderSide,
        price: Price,
        amount: Amount,
    },
}

impl OperationIntent {
    pub fn cancel(id: OfferId, side: OrderSide) -> Self {
        Self::Cancel { id, side }
    }

    pub fn create(side: OrderSide, price: Price, amount: Amount) -> Self {
        Self::Create {
            side,
            price,
            amount,
        }
    }

    pub fn side(&self) -> OrderSide {
        match self {
            Self::Cancel { side, .. } | Self::Create { side, .. } => *side,
        }
    }

    pub fn is_cancel(&self) -> bool {
        matches!(self, Self::Cancel { .. })
    }

    pub fn is_create(&self) -> bool {
        matches!(self, Self::Create { .. })
    }
}

impl fmt::Display for OperationIntent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cancel { id, side } => write!(f, "cancel {side} #{id}"),
            Self::Create {
                side,
                price,
                amount,
            } => write!(f, "create {side} {amount} @ {price}"),
        }
    }
}

/// An ordered batch of intents, applied all-or-nothing by the submitter.
///
/// Cancels always precede creates so that excess levels are removed before
/// new exposure is added.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationBatch {
    intents: Vec<OperationIntent>,
}

impl OperationBatch {
    /// Build a batch from the prune phase's cancels and the update phase's intents.
    pub fn from_phases(prune: Vec<OperationIntent>, update: Vec<OperationIntent>) -> Self {
        let (mut intents, creates): (Vec<_>, Vec<_>) =
            prune.into_iter().chain(update).partition(OperationIntent::is_cancel);
        intents.extend(creates);
        Self { intents }
    }

    /// A batch cancelling every given order.
    pub fn cancel_all<'a>(orders: impl IntoIterator<Item = &'a crate::RestingOrder>) -> Self {
        Self {
            intents: orders
                .into_iter()
                .map(|o| OperationIntent::cancel(o.id, o.side))
                .collect(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.intents.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.intents.len()
    }

    pub fn intents(&self) -> &[OperationIntent] {
        &self.intents
    }

    pub fn cancel_count(&self) -> usize {
        self.intents.iter().filter(|i| i.is_cancel()).count()
    }

    pub fn create_count(&self) -> usize {
        self.intents.iter().filter(|i| i.is_create()).count()
    }

    /// Resting orders produced by this batch's creates, given the ids the
    /// ledger assigned to them in order.
    pub fn placed_orders(&self, ids: &[OfferId]) -> Vec<crate::RestingOrder> {
        self.intents
            .iter()
            .filter_map(|intent| match intent {
                OperationIntent::Create {
                    side,
                    price,
                    amount,
                } => Some((*side, *price, *amount)),
                OperationIntent::Cancel { .. } => None,
            })
            .zip(ids)
            .map(|((side, price, amount), id)| crate::RestingOrder::new(*id, side, price, amount))
            .collect()
    }
}

impl IntoIterator for OperationBatch {
    type Item = OperationIntent;
    type IntoIter = std::vec::IntoIter<OperationIntent>;

    fn into_iter(self) -> Self::IntoIter {
        self.intents.into_iter()
    }
}
