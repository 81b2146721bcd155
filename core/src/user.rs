//! Wallet-registered users.

use crate::error::{MarketError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum username length (matches the `users.username` column).
pub const MAX_USERNAME_LEN: usize = 32;

/// Maximum wallet address length (matches the `users.wallet_address` column).
pub const MAX_WALLET_ADDRESS_LEN: usize = 64;

/// Maximum display name length.
pub const MAX_DISPLAY_NAME_LEN: usize = 500;

/// Unique, immutable identifier of a user.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(i64);

impl UserId {
    /// Create a `UserId` from its raw database value
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

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A registered marketplace user.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier
    pub id: UserId,
    /// Wallet address used as the login credential (unique, immutable)
    pub wallet_address: String,
    /// Public handle (unique)
    pub username: String,
    /// Free-form display name
    pub display_name: String,
    /// When the user registered
    pub created_at: DateTime<Utc>,
    /// Last successful authentication, if any
    pub last_login_at: Option<DateTime<Utc>>,
}

/// Validated registration request.
///
/// Construct with [`NewUser::new`]; the fields are trimmed and checked there,
/// so every `NewUser` that reaches a store is well-formed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewUser {
    display_name: String,
    username: String,
    wallet_address: String,
}

impl NewUser {
    /// Validate and build a registration request.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::Validation`] if any field is empty or too long.
    pub fn new(
        display_name: &str,
        username: &str,
        wallet_address: &str,
    ) -> Result<Self> {
        let display_name = required("nameSurname", display_name, MAX_DISPLAY_NAME_LEN)?;
        let username = required("username", username, MAX_USERNAME_LEN)?;
        let wallet_address = required("wallet_address", wallet_address, MAX_WALLET_ADDRESS_LEN)?;

        if username.chars().any(char::is_whitespace) {
            return Err(MarketError::validation("username must not contain whitespace"));
        }

        Ok(Self {
            display_name,
            username,
            wallet_address,
        })
    }

    /// Display name
    #[must_use]
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Username
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Wallet address
    #[must_use]
    pub fn wallet_address(&self) -> &str {
        &self.wallet_address
    }

    /// Materialize the user once the store has assigned an id.
    #[must_use]
    pub fn into_user(self, id: UserId, created_at: DateTime<Utc>) -> User {
        User {
            id,
            wallet_address: self.wallet_address,
            username: self.username,
            display_name: self.display_name,
            created_at,
            last_login_at: None,
        }
    }
}

/// Trim `value` and check it is non-empty and at most `max_len` characters.
pub(crate) fn required(field: &str, value: &str, max_len: usize) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(MarketError::validation(format!("{field} is required")));
    }
    if trimmed.chars().count() > max_len {
        return Err(MarketError::validation(format!(
            "{field} must be at most {max_len} characters"
        )));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_new_user_trims_fields() {
        let user = NewUser::new("  Ada Lovelace ", " ada ", " SP2J6ZY48GV1 ").unwrap();
        assert_eq!(user.display_name(), "Ada Lovelace");
        assert_eq!(user.username(), "ada");
        assert_eq!(user.wallet_address(), "SP2J6ZY48GV1");
    }

    #[test]
    fn test_new_user_rejects_empty_fields() {
        assert!(matches!(
            NewUser::new("", "ada", "SP1"),
            Err(MarketError::Validation(_))
        ));
        assert!(matches!(
            NewUser::new("Ada", "   ", "SP1"),
            Err(MarketError::Validation(_))
        ));
        assert!(matches!(
            NewUser::new("Ada", "ada", ""),
            Err(MarketError::Validation(_))
        ));
    }

    #[test]
    fn test_new_user_rejects_long_username() {
        let long = "a".repeat(MAX_USERNAME_LEN + 1);
        assert!(matches!(
            NewUser::new("Ada", &long, "SP1"),
            Err(MarketError::Validation(_))
        ));
    }

    #[test]
    fn test_new_user_rejects_whitespace_in_username() {
        assert!(NewUser::new("Ada", "ada lovelace", "SP1").is_err());
    }

    #[test]
    fn test_into_user_starts_without_login() {
        let now = Utc::now();
        let user = NewUser::new("Ada", "ada", "SP1")
            .unwrap()
            .into_user(UserId::new(7), now);
        assert_eq!(user.id, UserId::new(7));
        assert_eq!(user.created_at, now);
        assert!(user.last_login_at.is_none());
    }
}
