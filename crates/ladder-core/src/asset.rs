//! Ledger asset identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// An asset on the ledger: either the native asset or a code issued by an account.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Asset {
    /// Asset code (e.g. "XLM", "USD").
    pub code: String,
    /// Issuing account. `None` for the native asset.
    #[serde(default)]
    pub issuer: Option<String>,
}

impl Asset {
    /// The native asset. It has no issuer and no trust line.
    pub fn native(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            issuer: None,
        }
    }

    /// An issued (credit) asset.
    pub fn credit(code: impl Into<String>, issuer: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            issuer: Some(issuer.into()),
        }
    }

    pub fn is_native(&self) -> bool {
        self.issuer.is_none()
    }
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.issuer {
            Some(issuer) => write!(f, "{}:{}", self.code, issuer),
            None => write!(f, "{}:native", self.code),
        }
    }
}
