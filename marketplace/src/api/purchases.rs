//! Purchase API endpoints.
//!
//! - POST /complete_purchase - buy a listing (requires auth)
//! - GET /get_user_purchases?username= - listings bought by a user

use super::{ListingView, UsernameQuery};
use crate::auth::SessionUser;
use crate::server::state::AppState;
use axum::{
    Json,
    extract::{
        Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
};
use chaingo_core::{Listing, ListingId};
use chaingo_web::WebResult;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request to buy a listing.
#[derive(Debug, Deserialize)]
pub struct PurchaseRequest {
    /// Listing to buy
    pub listing_id: i64,
    /// Buyer; must be the session user
    pub buyer_username: String,
    /// Transaction reference recorded with the sale
    pub txid: String,
}

/// Response after a completed purchase.
#[derive(Debug, Serialize)]
pub struct PurchaseResponse {
    /// Always `"success"`
    pub status: &'static str,
    /// Human-readable confirmation
    pub message: &'static str,
    /// The listing as sold
    pub listing: ListingView,
}

/// A bought listing, seen from the buyer.
#[derive(Debug, Serialize)]
pub struct PurchaseView {
    /// Listing ID
    pub id: i64,
    /// Title
    pub title: String,
    /// Description
    pub description: String,
    /// Price as a decimal string
    pub price: String,
    /// Category
    pub category: Option<String>,
    /// Listing owner
    pub seller_username: String,
    /// Buyer
    pub buyer_username: Option<String>,
    /// Stored image file names
    pub images: Vec<String>,
    /// Listing creation time
    pub created_at: DateTime<Utc>,
    /// Always `true` for purchases
    pub is_sold: bool,
    /// Sale time
    pub sold_at: Option<DateTime<Utc>>,
    /// Transaction reference recorded with the sale
    pub txid: Option<String>,
}

impl From<Listing> for PurchaseView {
    fn from(listing: Listing) -> Self {
        let sale = listing.sale;
        Self {
            id: listing.id.get(),
            title: listing.title,
            description: listing.description,
            price: listing.price.to_string(),
            category: listing.category,
            seller_username: listing.owner_username,
            is_sold: sale.is_some(),
            buyer_username: sale.as_ref().map(|s| s.buyer_username.clone()),
            sold_at: sale.as_ref().map(|s| s.sold_at),
            txid: sale.and_then(|s| s.tx_ref),
            images: listing.image_refs,
            created_at: listing.created_at,
        }
    }
}

/// Response for a user's purchases.
#[derive(Debug, Serialize)]
pub struct UserPurchasesResponse {
    /// Purchases, most recent first
    pub purchases: Vec<PurchaseView>,
}

// ============================================================================
// Handlers
// ============================================================================

/// Buy a listing.
///
/// Requires authentication; `buyer_username` must be the session user.
/// A listing that is missing or already sold yields 409.
///
/// # Example
///
/// ```bash
/// curl -X POST http://localhost:8080/complete_purchase \
///   -H "Authorization: Bearer <session_token>" \
///   -H "Content-Type: application/json" \
///   -d '{"listing_id": 42, "buyer_username": "alice", "txid": "0xabc..."}'
/// ```
pub async fn complete_purchase(
    State(state): State<AppState>,
    session: SessionUser,
    payload: Result<Json<PurchaseRequest>, JsonRejection>,
) -> WebResult<Json<PurchaseResponse>> {
    let Json(request) = payload?;

    let listing = state
        .purchases
        .complete_purchase(
            &session,
            ListingId::new(request.listing_id),
            &request.buyer_username,
            &request.txid,
        )
        .await?;

    Ok(Json(PurchaseResponse {
        status: "success",
        message: "Purchase completed",
        listing: listing.into(),
    }))
}

/// Listings bought by `username`, most recent sale first.
pub async fn get_user_purchases(
    State(state): State<AppState>,
    query: Result<Query<UsernameQuery>, QueryRejection>,
) -> WebResult<Json<UserPurchasesResponse>> {
    let Query(query) = query?;
    let purchases = state.queries.list_purchases(&query.username).await?;

    Ok(Json(UserPurchasesResponse {
        purchases: purchases.into_iter().map(PurchaseView::from).collect(),
    }))
}
