//! Session issuing and validation.

use crate::config::SessionConfig;
use crate::token::{Claims, TokenCodec};
use chaingo_core::{Clock, IdentityStore, MarketError, Result, User, UserId};
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;

/// Result of a successful wallet login.
#[derive(Clone, Debug)]
pub struct AuthenticatedSession {
    /// The user, with `last_login_at` already updated
    pub user: User,
    /// Signed bearer token
    pub token: String,
    /// When `token` stops being accepted
    pub expires_at: DateTime<Utc>,
}

/// Identity behind a validated token.
///
/// `user` is re-read from the identity store, not copied from the token,
/// so it reflects the account as it is now.
#[derive(Clone, Debug)]
pub struct SessionIdentity {
    /// Live user record
    pub user: User,
    /// Token expiry
    pub expires_at: DateTime<Utc>,
}

impl SessionIdentity {
    /// Username bound to this session.
    #[must_use]
    pub fn username(&self) -> &str {
        &self.user.username
    }

    /// Require that this session acts as `username`.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::Forbidden`] if `username` is not the session's username.
    pub fn ensure_acts_as(&self, username: &str) -> Result<()> {
        if self.user.username == username.trim() {
            Ok(())
        } else {
            Err(MarketError::Forbidden {
                session: self.user.username.clone(),
                requested: username.to_string(),
            })
        }
    }
}

/// Issues and validates bearer sessions for wallet-registered users.
#[derive(Clone)]
pub struct SessionIssuer {
    identity: Arc<dyn IdentityStore>,
    clock: Arc<dyn Clock>,
    codec: TokenCodec,
    ttl: Duration,
}

impl SessionIssuer {
    /// Create an issuer over `identity`.
    #[must_use]
    pub fn new(
        identity: Arc<dyn IdentityStore>,
        clock: Arc<dyn Clock>,
        config: &SessionConfig,
    ) -> Self {
        Self {
            identity,
            clock,
            codec: TokenCodec::new(config.secret()),
            ttl: config.session_ttl,
        }
    }

    /// Log in with a wallet address.
    ///
    /// Returns `Ok(None)` when no user owns the wallet; that is the normal
    /// "not registered yet" outcome, not an error.
    ///
    /// # Errors
    ///
    /// - `Validation`: empty wallet address
    /// - `StoreUnavailable`: identity store unreachable
    pub async fn authenticate(&self, wallet_address: &str) -> Result<Option<AuthenticatedSession>> {
        let wallet_address = wallet_address.trim();
        if wallet_address.is_empty() {
            return Err(MarketError::validation("wallet_address is required"));
        }

        let Some(mut user) = self.identity.find_by_wallet(wallet_address.to_string()).await? else {
            tracing::debug!(wallet = %wallet_address, "Wallet not registered");
            return Ok(None);
        };

        let now = self.clock.now();
        self.identity.touch_login(user.id, now).await?;
        user.last_login_at = Some(now);

        let expires_at = now + self.ttl;
        let token = self.codec.encode(&Claims {
            user_id: user.id.get(),
            wallet: user.wallet_address.clone(),
            username: user.username.clone(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        })?;

        tracing::info!(user_id = %user.id, username = %user.username, "Session issued");

        Ok(Some(AuthenticatedSession {
            user,
            token,
            expires_at,
        }))
    }

    /// Validate a bearer token and resolve the live user behind it.
    ///
    /// # Errors
    ///
    /// - `InvalidToken`: malformed, wrongly signed or expired token
    /// - `UserNotFound`: the token's user no longer exists
    pub async fn validate(&self, token: &str) -> Result<SessionIdentity> {
        let claims = self.codec.decode(token, self.clock.now())?;
        let expires_at = DateTime::from_timestamp(claims.exp, 0)
            .ok_or_else(|| MarketError::InvalidToken("expiry out of range".into()))?;

        let user = self
            .identity
            .find_by_id(UserId::new(claims.user_id))
            .await?
            .ok_or_else(|| {
                tracing::warn!(user_id = claims.user_id, "Valid token for missing user");
                MarketError::UserNotFound
            })?;

        Ok(SessionIdentity { user, expires_at })
    }
}
