//! Wallet lookup and wallet code endpoints.
//!
//! - GET /get_user_wallet?username= - wallet address of a user
//! - POST /save_wallet_code - store a wallet code

use super::UsernameQuery;
use crate::server::state::AppState;
use axum::{
    Json,
    extract::{
        Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
};
use chaingo_web::WebResult;
use serde::{Deserialize, Serialize};

/// Wallet address of a user.
#[derive(Debug, Serialize)]
pub struct WalletResponse {
    /// Username
    pub username: String,
    /// Wallet address
    pub wallet_address: String,
}

/// Request to store a wallet code.
#[derive(Debug, Deserialize)]
pub struct SaveWalletCodeRequest {
    /// Code to store
    pub wallet_code: String,
}

/// Response after storing a wallet code.
#[derive(Debug, Serialize)]
pub struct SaveWalletCodeResponse {
    /// Always `"ok"`
    pub status: &'static str,
    /// Stored code ID
    pub id: i64,
    /// Stored code
    pub wallet_code: String,
}

/// Look up a user's wallet address.
pub async fn get_user_wallet(
    State(state): State<AppState>,
    query: Result<Query<UsernameQuery>, QueryRejection>,
) -> WebResult<Json<WalletResponse>> {
    let Query(query) = query?;
    let user = state.identity.find_by_username(&query.username).await?;

    Ok(Json(WalletResponse {
        username: user.username,
        wallet_address: user.wallet_address,
    }))
}

/// Store a wallet code; duplicates yield 409.
pub async fn save_wallet_code(
    State(state): State<AppState>,
    payload: Result<Json<SaveWalletCodeRequest>, JsonRejection>,
) -> WebResult<Json<SaveWalletCodeResponse>> {
    let Json(request) = payload?;
    let saved = state.identity.save_wallet_code(&request.wallet_code).await?;

    Ok(Json(SaveWalletCodeResponse {
        status: "ok",
        id: saved.id.get(),
        wallet_code: saved.code,
    }))
}
