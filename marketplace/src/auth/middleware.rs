//! Authentication extractor for Axum handlers.
//!
//! # Example
//!
//! ```ignore
//! use marketplace::auth::SessionUser;
//!
//! async fn create_listing(
//!     State(state): State<AppState>,
//!     session: SessionUser,
//! ) -> Result<Json<CreateListingResponse>, AppError> {
//!     // session.username() is the live username behind the bearer token
//!     ...
//! }
//! ```

use crate::server::state::AppState;
use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use chaingo_auth::SessionIdentity;
use chaingo_web::{AppError, BearerToken};
use std::ops::Deref;

/// Authenticated caller.
///
/// Extracting it reads `Authorization: Bearer <token>`, verifies the token
/// and re-reads the user, so a deleted account is rejected with 404 even
/// while its token is unexpired.
#[derive(Debug, Clone)]
pub struct SessionUser(pub SessionIdentity);

impl Deref for SessionUser {
    type Target = SessionIdentity;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[async_trait]
impl FromRequestParts<AppState> for SessionUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let BearerToken(token) = BearerToken::from_request_parts(parts, state).await?;

        let identity = state.sessions.validate(&token).await.map_err(|e| {
            tracing::debug!(error = %e, "Session rejected");
            AppError::from(e)
        })?;

        Ok(Self(identity))
    }
}
