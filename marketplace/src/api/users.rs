//! Wallet login and registration endpoints.
//!
//! - POST /is_exists_user - log in with a wallet address
//! - POST /create_new_user - register a wallet
//! - POST /verify_token - resolve a session token to the live user

use crate::metrics;
use crate::server::state::AppState;
use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use chaingo_core::User;
use chaingo_web::WebResult;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Request/Response Types
// ============================================================================

/// Wallet login request.
#[derive(Debug, Deserialize)]
pub struct WalletLoginRequest {
    /// Wallet address to log in with
    pub wallet_address: String,
}

/// Public profile returned on login.
#[derive(Debug, Serialize)]
pub struct ProfileView {
    /// Display name
    pub name: String,
    /// Username
    pub username: String,
    /// Wallet address
    pub wallet_address: String,
    /// Registration time
    pub creation_time: DateTime<Utc>,
}

impl From<User> for ProfileView {
    fn from(user: User) -> Self {
        Self {
            name: user.display_name,
            username: user.username,
            wallet_address: user.wallet_address,
            creation_time: user.created_at,
        }
    }
}

/// Wallet login outcome.
///
/// An unknown wallet is a normal answer (`{"status": false}`), not an error,
/// so the client can offer registration.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum WalletLoginResponse {
    /// Wallet belongs to a user; a session was issued
    Registered {
        /// Always `true`
        status: bool,
        /// Bearer token
        token: String,
        /// Token expiry
        expires_at: DateTime<Utc>,
        /// The user's profile
        user: ProfileView,
    },
    /// No user owns the wallet
    Unregistered {
        /// Always `false`
        status: bool,
    },
}

/// Registration request.
#[derive(Debug, Deserialize)]
pub struct NewUserRequest {
    /// Display name
    #[serde(rename = "nameSurname")]
    pub name_surname: String,
    /// Username (unique)
    pub username: String,
    /// Wallet address (unique)
    pub wallet_address: String,
}

/// Response after registration.
#[derive(Debug, Serialize)]
pub struct NewUserResponse {
    /// Always `"ok"`
    pub status: &'static str,
    /// New user ID
    pub user_id: i64,
}

/// Token verification request.
#[derive(Debug, Deserialize)]
pub struct VerifyTokenRequest {
    /// Session token to check
    pub token: String,
}

/// Live user behind a verified token.
#[derive(Debug, Serialize)]
pub struct TokenUserView {
    /// User ID
    pub user_id: i64,
    /// Username
    pub username: String,
    /// Wallet address
    pub wallet: String,
    /// Display name
    pub name: String,
    /// Registration time
    pub created_at: DateTime<Utc>,
}

/// Response for a valid token.
#[derive(Debug, Serialize)]
pub struct VerifyTokenResponse {
    /// Always `true`; invalid tokens get 401
    pub valid: bool,
    /// Live user
    pub user: TokenUserView,
}

// ============================================================================
// Handlers
// ============================================================================

/// Log in with a wallet address.
///
/// # Example
///
/// ```bash
/// curl -X POST http://localhost:8080/is_exists_user \
///   -H "Content-Type: application/json" \
///   -d '{"wallet_address": "0xabc"}'
/// ```
pub async fn is_exists_user(
    State(state): State<AppState>,
    payload: Result<Json<WalletLoginRequest>, JsonRejection>,
) -> WebResult<Json<WalletLoginResponse>> {
    let Json(request) = payload?;

    let response = match state.sessions.authenticate(&request.wallet_address).await? {
        Some(session) => {
            metrics::record_session_issued();
            WalletLoginResponse::Registered {
                status: true,
                token: session.token,
                expires_at: session.expires_at,
                user: session.user.into(),
            }
        }
        None => WalletLoginResponse::Unregistered { status: false },
    };

    Ok(Json(response))
}

/// Register a new user.
///
/// Duplicate wallet address or username yields 409.
pub async fn create_new_user(
    State(state): State<AppState>,
    payload: Result<Json<NewUserRequest>, JsonRejection>,
) -> WebResult<Json<NewUserResponse>> {
    let Json(request) = payload?;

    let user = state
        .identity
        .register(
            &request.name_surname,
            &request.username,
            &request.wallet_address,
        )
        .await?;

    Ok(Json(NewUserResponse {
        status: "ok",
        user_id: user.id.get(),
    }))
}

/// Verify a session token.
///
/// Invalid or expired tokens yield 401; a token whose user was deleted
/// yields 404.
pub async fn verify_token(
    State(state): State<AppState>,
    payload: Result<Json<VerifyTokenRequest>, JsonRejection>,
) -> WebResult<Json<VerifyTokenResponse>> {
    let Json(request) = payload?;
    let identity = state.sessions.validate(&request.token).await?;
    let user = identity.user;

    Ok(Json(VerifyTokenResponse {
        valid: true,
        user: TokenUserView {
            user_id: user.id.get(),
            username: user.username,
            wallet: user.wallet_address,
            name: user.display_name,
            created_at: user.created_at,
        },
    }))
}
