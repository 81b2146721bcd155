//! HTTP API handlers.
//!
//! Paths and JSON field names follow the marketplace's existing web client:
//!
//! - [`listings`]: create, delete, fetch and browse listings
//! - [`purchases`]: complete a purchase, purchase history
//! - [`users`]: wallet login, registration, token verification
//! - [`wallet`]: wallet lookup and wallet codes

pub mod listings;
pub mod purchases;
pub mod users;
pub mod wallet;

use chaingo_core::Listing;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// `?username=` query used by the per-user endpoints.
#[derive(Debug, Deserialize)]
pub struct UsernameQuery {
    /// Username to act on or look up
    pub username: String,
}

/// Listing as returned by the read endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct ListingView {
    /// Listing ID
    pub id: i64,
    /// Title
    pub title: String,
    /// Description
    pub description: String,
    /// Price as a decimal string, e.g. `"12.50"`
    pub price: String,
    /// Category
    pub category: Option<String>,
    /// Location
    pub location: Option<String>,
    /// Item condition
    pub item_condition: Option<String>,
    /// Owner username
    pub username: String,
    /// Stored image file names, in upload order
    pub images: Vec<String>,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Whether the listing is sold
    pub is_sold: bool,
    /// Buyer, once sold
    pub buyer_username: Option<String>,
    /// Sale time, once sold
    pub sold_at: Option<DateTime<Utc>>,
}

impl From<Listing> for ListingView {
    fn from(listing: Listing) -> Self {
        let (buyer_username, sold_at) = match listing.sale {
            Some(sale) => (Some(sale.buyer_username), Some(sale.sold_at)),
            None => (None, None),
        };

        Self {
            id: listing.id.get(),
            title: listing.title,
            description: listing.description,
            price: listing.price.to_string(),
            category: listing.category,
            location: listing.location,
            item_condition: listing.item_condition,
            username: listing.owner_username,
            images: listing.image_refs,
            created_at: listing.created_at,
            is_sold: buyer_username.is_some(),
            buyer_username,
            sold_at,
        }
    }
}
