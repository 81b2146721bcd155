//! Wallet codes: opaque strings reserved before a wallet is bound to a user.

use crate::error::Result;
use crate::user::required;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Maximum wallet code length (matches the `wallet_codes.wallet_code` column).
pub const MAX_WALLET_CODE_LEN: usize = 128;

/// Identifier of a stored wallet code.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WalletCodeId(i64);

impl WalletCodeId {
    /// Create a `WalletCodeId` from its raw database value
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Get the raw value
    #[must_use]
    pub const fn get(&self) -> i64 {
        self.0
    }
}

/// A stored wallet code.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletCode {
    /// Identifier
    pub id: WalletCodeId,
    /// The code itself (unique)
    pub code: String,
    /// When it was saved
    pub created_at: DateTime<Utc>,
}

/// Trim and check a wallet code before it reaches a store.
///
/// # Errors
///
/// Returns [`crate::MarketError::Validation`] if the code is empty or longer than
/// [`MAX_WALLET_CODE_LEN`].
pub fn validate_wallet_code(code: &str) -> Result<String> {
    required("wallet_code", code, MAX_WALLET_CODE_LEN)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wallet_code_validation() {
        assert_eq!(validate_wallet_code(" abc ").ok().as_deref(), Some("abc"));
        assert!(validate_wallet_code("").is_err());
        assert!(validate_wallet_code(&"x".repeat(MAX_WALLET_CODE_LEN + 1)).is_err());
    }
}
