//! User registration and wallet lookups.

use crate::metrics;
use chaingo_core::wallet_code::validate_wallet_code;
use chaingo_core::{
    Clock, IdentityStore, MarketError, NewUser, Result, User, WalletCode, WalletCodeStore,
};
use std::sync::Arc;

/// Registration and lookups over the identity and wallet-code stores.
#[derive(Clone)]
pub struct IdentityService {
    users: Arc<dyn IdentityStore>,
    wallet_codes: Arc<dyn WalletCodeStore>,
    clock: Arc<dyn Clock>,
}

impl IdentityService {
    /// Create a new identity service.
    #[must_use]
    pub fn new(
        users: Arc<dyn IdentityStore>,
        wallet_codes: Arc<dyn WalletCodeStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            users,
            wallet_codes,
            clock,
        }
    }

    /// Register a new user.
    ///
    /// # Errors
    ///
    /// - `Validation`: a field is empty or too long
    /// - `Conflict`: wallet address or username already registered
    pub async fn register(
        &self,
        display_name: &str,
        username: &str,
        wallet_address: &str,
    ) -> Result<User> {
        let new_user = NewUser::new(display_name, username, wallet_address)?;
        let user = self.users.register(new_user, self.clock.now()).await?;

        metrics::record_user_registered();
        tracing::info!(user_id = %user.id, username = %user.username, "User registered");
        Ok(user)
    }

    /// Find the user behind `username`, for wallet lookups.
    ///
    /// # Errors
    ///
    /// - `NotFound`: no such user
    pub async fn find_by_username(&self, username: &str) -> Result<User> {
        self.users
            .find_by_username(username.trim().to_string())
            .await?
            .ok_or(MarketError::not_found("User"))
    }

    /// Save a wallet code.
    ///
    /// # Errors
    ///
    /// - `Validation`: empty or longer than 128 characters
    /// - `Conflict`: code already saved
    pub async fn save_wallet_code(&self, code: &str) -> Result<WalletCode> {
        let code = validate_wallet_code(code)?;
        let saved = self.wallet_codes.save(code, self.clock.now()).await?;
        tracing::info!(wallet_code_id = saved.id.get(), "Wallet code saved");
        Ok(saved)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chaingo_testing::{InMemoryIdentityStore, InMemoryWalletCodeStore, test_clock};

    fn service() -> IdentityService {
        IdentityService::new(
            Arc::new(InMemoryIdentityStore::new()),
            Arc::new(InMemoryWalletCodeStore::new()),
            Arc::new(test_clock()),
        )
    }

    #[tokio::test]
    async fn test_register_and_lookup() {
        let service = service();
        let user = service.register("Alice A.", "alice", "0xabc").await.unwrap();
        assert_eq!(user.created_at, test_clock().now());

        let found = service.find_by_username("alice").await.unwrap();
        assert_eq!(found.wallet_address, "0xabc");
        assert_eq!(
            service.find_by_username("bob").await.unwrap_err(),
            MarketError::not_found("User")
        );
    }

    #[tokio::test]
    async fn test_duplicate_registration_conflicts() {
        let service = service();
        service.register("Alice", "alice", "0xabc").await.unwrap();

        assert!(matches!(
            service.register("Other", "alice", "0xdef").await,
            Err(MarketError::Conflict(_))
        ));
        assert!(matches!(
            service.register("Other", "other", "0xabc").await,
            Err(MarketError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn test_wallet_codes() {
        let service = service();
        let saved = service.save_wallet_code(" CODE-1 ").await.unwrap();
        assert_eq!(saved.code, "CODE-1");

        assert!(matches!(
            service.save_wallet_code("CODE-1").await,
            Err(MarketError::Conflict(_))
        ));
        assert!(matches!(
            service.save_wallet_code("  ").await,
            Err(MarketError::Validation(_))
        ));
    }
}
