//! Account balances of the traded pair.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};
use crate::Amount;

/// Spendable (`max_*`) and trusted (`trust_*`) amounts of the pair's two assets.
///
/// Asset A is the base asset, asset B the quote asset. Refreshed every tick.
/// `trust >= max` is expected but not enforced here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Balances {
    pub max_base: Amount,
    pub max_quote: Amount,
    pub trust_base: Amount,
    pub trust_quote: Amount,
}

impl Balances {
    pub fn new(max_base: Amount, max_quote: Amount, trust_base: Amount, trust_quote: Amount) -> Self {
        Self {
            max_base,
            max_quote,
            trust_base,
            trust_quote,
        }
    }

    /// The same balances seen from the other side of the pair (base and quote swapped).
    pub fn inverted(&self) -> Self {
        Self {
            max_base: self.max_quote,
            max_quote: self.max_base,
            trust_base: self.trust_quote,
            trust_quote: self.trust_base,
        }
    }

    /// Reject any negative component.
    pub fn check_non_negative(&self) -> Result<()> {
        let fields = [
            ("max_base", self.max_base),
            ("max_quote", self.max_quote),
            ("trust_base", self.trust_base),
            ("trust_quote", self.trust_quote),
        ];
        for (field, value) in fields {
            if value.is_negative() {
                return Err(CoreError::NegativeBalance {
                    field,
                    value: value.inner(),
                });
            }
        }
        Ok(())
    }
}
