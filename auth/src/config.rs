//! Session configuration.
//!
//! Values are provided by the application at startup, never hardcoded.

use chrono::Duration;
use std::fmt;
use thiserror::Error;

/// Errors building a [`SessionConfig`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionConfigError {
    /// Signing secret is shorter than [`SessionConfig::MIN_SECRET_LEN`].
    #[error("session secret must be at least {min} bytes (got {len})")]
    SecretTooShort {
        /// Length provided
        len: usize,
        /// Minimum accepted length
        min: usize,
    },

    /// Session lifetime is zero or negative.
    #[error("session ttl must be positive")]
    NonPositiveTtl,
}

/// Signing key and validity window for session tokens.
#[derive(Clone)]
pub struct SessionConfig {
    secret: Vec<u8>,

    /// How long an issued token stays valid.
    ///
    /// Default: 3 days
    pub session_ttl: Duration,
}

impl SessionConfig {
    /// Shortest accepted signing secret, in bytes.
    pub const MIN_SECRET_LEN: usize = 32;

    /// Default token lifetime in seconds (3 days).
    pub const DEFAULT_TTL_SECS: i64 = 259_200;

    /// Create a configuration with the default lifetime.
    ///
    /// # Errors
    ///
    /// Returns [`SessionConfigError::SecretTooShort`] if `secret` has fewer
    /// than [`Self::MIN_SECRET_LEN`] bytes.
    pub fn new(secret: impl Into<Vec<u8>>) -> Result<Self, SessionConfigError> {
        let secret = secret.into();
        if secret.len() < Self::MIN_SECRET_LEN {
            return Err(SessionConfigError::SecretTooShort {
                len: secret.len(),
                min: Self::MIN_SECRET_LEN,
            });
        }
        Ok(Self {
            secret,
            session_ttl: Duration::seconds(Self::DEFAULT_TTL_SECS),
        })
    }

    /// Set the token lifetime.
    ///
    /// # Errors
    ///
    /// Returns [`SessionConfigError::NonPositiveTtl`] if `ttl` is zero or negative.
    pub fn with_session_ttl(mut self, ttl: Duration) -> Result<Self, SessionConfigError> {
        if ttl <= Duration::zero() {
            return Err(SessionConfigError::NonPositiveTtl);
        }
        self.session_ttl = ttl;
        Ok(self)
    }

    pub(crate) fn secret(&self) -> &[u8] {
        &self.secret
    }
}

impl fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionConfig")
            .field("secret", &"<redacted>")
            .field("session_ttl", &self.session_ttl)
            .finish()
    }
}
