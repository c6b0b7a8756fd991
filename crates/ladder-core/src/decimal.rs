//! Precision-safe decimal types for quoting.
//!
//! Uses `rust_decimal` for exact decimal arithmetic, so tolerance checks
//! against a configured boundary behave exactly at the boundary.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{CoreError, Result};

/// Whether `value` lies within a relative `tolerance` of `target`.
///
/// The boundary is inclusive: `|value - target| <= tolerance * |target|`.
#[inline]
pub fn within_tolerance(value: Decimal, target: Decimal, tolerance: Decimal) -> bool {
    (value - target).abs() <= tolerance * target.abs()
}

/// Price with exact decimal precision.
///
/// Always expressed as units of the bought asset per unit of the sold asset,
/// from the point of view of the side that owns it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(pub Decimal);

impl Price {
    pub const ZERO: Self = Self(Decimal::ZERO);
    pub const ONE: Self = Self(Decimal::ONE);

    #[inline]
    pub fn new(value: Decimal) -> Self {
        Self(value)
    }

    #[inline]
    pub fn inner(&self) -> Decimal {
        self.0
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    #[inline]
    pub fn is_positive(&self) -> bool {
        self.0.is_sign_positive() && !self.0.is_zero()
    }

    /// Price seen from the opposite side of the pair (`1 / price`).
    pub fn invert(&self) -> Result<Self> {
        Decimal::ONE
            .checked_div(self.0)
            .map(Self)
            .ok_or(CoreError::DivisionByZero("price inversion"))
    }

    /// Whether this price is within a relative tolerance of `target` (inclusive).
    #[inline]
    pub fn within(&self, target: Price, tolerance: Decimal) -> bool {
        within_tolerance(self.0, target.0, tolerance)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Price {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}

impl From<Decimal> for Price {
    fn from(d: Decimal) -> Self {
        Self(d)
    }
}

/// Amount of an asset with exact decimal precision.
///
/// Used for balances, trust limits and order sizes; never mixed with prices.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Amount(pub Decimal);

impl Amount {
    pub const ZERO: Self = Self(Decimal::ZERO);

    #[inline]
    pub fn new(value: Decimal) -> Self {
        Self(value)
    }

    #[inline]
    pub fn inner(&self) -> Decimal {
        self.0
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    #[inline]
    pub fn is_positive(&self) -> bool {
        self.0.is_sign_positive() && !self.0.is_zero()
    }

    #[inline]
    pub fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    /// Convert an amount of the bought asset into units of the sold asset.
    pub fn per_price(&self, price: Price) -> Result<Self> {
        self.0
            .checked_div(price.0)
            .map(Self)
            .ok_or(CoreError::DivisionByZero("amount per price"))
    }

    /// Whether this amount is within a relative tolerance of `target` (inclusive).
    #[inline]
    pub fn within(&self, target: Amount, tolerance: Decimal) -> bool {
        within_tolerance(self.0, target.0, tolerance)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Amount {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}

impl From<Decimal> for Amount {
    fn from(d: Decimal) -> Self {
        Self(d)
    }
}
