//! Live orders as reported by the ledger.
//!
//! The ledger reports every offer in the frame of the asset it sells:
//! `amount` is in sold units and `price` is bought units per sold unit.
//! A buy-side offer therefore sells the quote asset and is priced in base
//! per quote. `partition_offers` keeps that frame and only tags the side.

use serde::{Deserialize, Serialize};

use crate::{Amount, Asset, OfferId, OrderSide, Price};

/// One of the bot's own live orders on one side of the pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestingOrder {
    pub id: OfferId,
    pub side: OrderSide,
    /// Bought units per sold unit, in the side's own frame.
    pub price: Price,
    /// Sold units remaining on the book.
    pub amount: Amount,
}

impl RestingOrder {
    pub fn new(id: OfferId, side: OrderSide, price: Price, amount: Amount) -> Self {
        Self {
            id,
            side,
            price,
            amount,
        }
    }
}

/// A raw account offer as enumerated from the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Offer {
    pub id: OfferId,
    pub selling: Asset,
    pub buying: Asset,
    pub price: Price,
    pub amount: Amount,
}

impl Offer {
    /// Tag this offer with the side it belongs to.
    pub fn to_resting(&self, side: OrderSide) -> RestingOrder {
        RestingOrder::new(self.id, side, self.price, self.amount)
    }
}

/// Sort orders best first: ascending price in the side's own frame, then by id.
pub fn sort_best_first(orders: &mut [RestingOrder]) {
    orders.sort_by(|a, b| a.price.cmp(&b.price).then(a.id.cmp(&b.id)));
}

/// Split an account's offers into `(buying_base, selling_base)` for the given pair.
///
/// Offers on any other pair are ignored. Both sides come back sorted best first.
pub fn partition_offers(
    offers: &[Offer],
    base: &Asset,
    quote: &Asset,
) -> (Vec<RestingOrder>, Vec<RestingOrder>) {
    let mut buying = Vec::new();
    let mut selling = Vec::new();

    for offer in offers {
        if &offer.selling == base && &offer.buying == quote {
            selling.push(offer.to_resting(OrderSide::Sell));
        } else if &offer.selling == quote && &offer.buying == base {
            buying.push(offer.to_resting(OrderSide::Buy));
        }
    }

    sort_best_first(&mut buying);
    sort_best_first(&mut selling);
    (buying, selling)
}
