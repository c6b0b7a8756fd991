//! Target quote levels.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{Amount, Price};

/// A single target quote point.
///
/// `price` is in units of the bought asset per unit of the sold asset and
/// `amount` is in units of the asset the level is sized from. A level is
/// immutable; every tick produces a fresh sequence where index 0 is the
/// innermost (best) level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Level {
    price: Price,
    amount: Amount,
}

impl Level {
    pub fn new(price: Price, amount: Amount) -> Self {
        Self { price, amount }
    }

    #[inline]
    pub fn price(&self) -> Price {
        self.price
    }

    #[inline]
    pub fn amount(&self) -> Amount {
        self.amount
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} @ {}", self.amount, self.price)
    }
}
