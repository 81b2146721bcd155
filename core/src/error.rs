//! Error taxonomy for marketplace operations.

use thiserror::Error;

/// Result type alias for marketplace operations.
pub type Result<T> = std::result::Result<T, MarketError>;

/// Every failure a marketplace operation can surface to its caller.
///
/// Each variant has a stable machine-readable code (see [`MarketError::code`])
/// and a human-readable message. Transport layers map variants to their own
/// status vocabulary; the domain never talks about HTTP.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MarketError {
    // ═══════════════════════════════════════════════════════════
    // Input & Uniqueness
    // ═══════════════════════════════════════════════════════════

    /// Malformed input (empty field, negative price, page size out of range).
    #[error("Validation failed: {0}")]
    Validation(String),

    /// A unique key (wallet, username, wallet code) is already taken.
    #[error("{0}")]
    Conflict(String),

    // ═══════════════════════════════════════════════════════════
    // Lookup & Ownership
    // ═══════════════════════════════════════════════════════════

    /// Requested entity does not exist.
    #[error("{entity} not found")]
    NotFound {
        /// Kind of entity that was looked up
        entity: &'static str,
    },

    /// Entity is missing or not owned by the requester.
    ///
    /// The two cases are merged so non-owners cannot probe for existence.
    #[error("Listing not found or you do not own it")]
    NotFoundOrForbidden,

    /// Listing is missing or already sold.
    #[error("Listing is not available for purchase")]
    NotAvailable,

    // ═══════════════════════════════════════════════════════════
    // Sessions
    // ═══════════════════════════════════════════════════════════

    /// Token is malformed, wrongly signed or expired.
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    /// Token verified but its subject no longer exists.
    #[error("User not found")]
    UserNotFound,

    /// Session identity does not match the username being acted upon.
    #[error("Session user '{session}' cannot act as '{requested}'")]
    Forbidden {
        /// Username bound to the session
        session: String,
        /// Username the request tried to act as
        requested: String,
    },

    // ═══════════════════════════════════════════════════════════
    // System
    // ═══════════════════════════════════════════════════════════

    /// Backing store unreachable (pool exhausted, connection refused).
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    /// Unexpected failure (not exposed to users verbatim).
    #[error("Internal error: {0}")]
    Internal(String),
}

impl MarketError {
    /// Shorthand for [`MarketError::Validation`].
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Shorthand for [`MarketError::Conflict`].
    #[must_use]
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    /// Shorthand for [`MarketError::NotFound`].
    #[must_use]
    pub const fn not_found(entity: &'static str) -> Self {
        Self::NotFound { entity }
    }

    /// Stable error code for clients.
    ///
    /// # Examples
    ///
    /// ```
    /// # use chaingo_core::MarketError;
    /// assert_eq!(MarketError::NotAvailable.code(), "NOT_AVAILABLE");
    /// ```
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Conflict(_) => "CONFLICT",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::NotFoundOrForbidden => "NOT_FOUND_OR_FORBIDDEN",
            Self::NotAvailable => "NOT_AVAILABLE",
            Self::InvalidToken(_) => "INVALID_TOKEN",
            Self::UserNotFound => "USER_NOT_FOUND",
            Self::Forbidden { .. } => "FORBIDDEN",
            Self::StoreUnavailable(_) => "STORE_UNAVAILABLE",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns `true` if the caller can fix this by changing the request.
    ///
    /// # Examples
    ///
    /// ```
    /// # use chaingo_core::MarketError;
    /// assert!(MarketError::validation("price").is_user_error());
    /// assert!(!MarketError::Internal("boom".into()).is_user_error());
    /// ```
    #[must_use]
    pub const fn is_user_error(&self) -> bool {
        !matches!(self, Self::StoreUnavailable(_) | Self::Internal(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_distinct() {
        let errors = [
            MarketError::validation("x"),
            MarketError::conflict("x"),
            MarketError::not_found("Listing"),
            MarketError::NotFoundOrForbidden,
            MarketError::NotAvailable,
            MarketError::InvalidToken("x".into()),
            MarketError::UserNotFound,
            MarketError::Forbidden {
                session: "a".into(),
                requested: "b".into(),
            },
            MarketError::StoreUnavailable("x".into()),
            MarketError::Internal("x".into()),
        ];

        let mut codes: Vec<_> = errors.iter().map(MarketError::code).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
    }

    #[test]
    fn test_display_messages() {
        assert_eq!(
            MarketError::not_found("User").to_string(),
            "User not found"
        );
        assert_eq!(
            MarketError::Forbidden {
                session: "alice".into(),
                requested: "bob".into()
            }
            .to_string(),
            "Session user 'alice' cannot act as 'bob'"
        );
    }
}
