//! Listings and their `active → sold` lifecycle.
//!
//! A listing is created active, may be deleted by its owner while it exists,
//! and becomes sold at most once. The sale is a single optional value so a
//! listing can never be "half sold" (a buyer without a sale time or the
//! reverse).

use crate::error::{MarketError, Result};
use crate::user::required;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Maximum title length (matches the `listings.title` column).
pub const MAX_TITLE_LEN: usize = 255;

/// Maximum length of `category`, `location`, `item_condition` and usernames on a listing.
pub const MAX_LABEL_LEN: usize = 100;

/// Maximum length of a transaction reference.
pub const MAX_TX_REF_LEN: usize = 128;

// ============================================================================
// Identifiers
// ============================================================================

/// Unique, immutable identifier of a listing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ListingId(i64);

impl ListingId {
    /// Create a `ListingId` from its raw database value
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

impl fmt::Display for ListingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Price
// ============================================================================

/// Non-negative price in cents (avoids floating point issues).
///
/// Parsed from and rendered as a decimal string with two fractional digits,
/// bounded like a `DECIMAL(10, 2)` column.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Price(i64);

impl Price {
    /// Largest representable price: `99999999.99`.
    pub const MAX_CENTS: i64 = 9_999_999_999;

    /// Creates a `Price` from cents.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::Validation`] if `cents` is negative or above [`Price::MAX_CENTS`].
    pub fn from_cents(cents: i64) -> Result<Self> {
        if cents < 0 {
            return Err(MarketError::validation("price must not be negative"));
        }
        if cents > Self::MAX_CENTS {
            return Err(MarketError::validation("price exceeds the maximum of 99999999.99"));
        }
        Ok(Self(cents))
    }

    /// Returns the amount in cents
    #[must_use]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Checks if this price is zero
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

impl FromStr for Price {
    type Err = MarketError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(MarketError::validation("price is required"));
        }
        if s.starts_with('-') {
            return Err(MarketError::validation("price must not be negative"));
        }

        let (whole, frac) = s.split_once('.').unwrap_or((s, ""));
        let all_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
        if (whole.is_empty() && frac.is_empty()) || !all_digits(whole) || !all_digits(frac) {
            return Err(MarketError::validation(format!("'{s}' is not a valid price")));
        }
        if frac.len() > 2 {
            return Err(MarketError::validation("price has more than two decimal places"));
        }

        let whole = whole.trim_start_matches('0');
        if whole.len() > 8 {
            return Err(MarketError::validation("price exceeds the maximum of 99999999.99"));
        }

        let parse = |part: &str| -> Result<i64> {
            if part.is_empty() {
                Ok(0)
            } else {
                part.parse::<i64>()
                    .map_err(|_| MarketError::validation(format!("'{s}' is not a valid price")))
            }
        };
        let cents = match frac.len() {
            1 => parse(frac)? * 10,
            _ => parse(frac)?,
        };

        Self::from_cents(parse(whole)? * 100 + cents)
    }
}

impl From<Price> for String {
    fn from(price: Price) -> Self {
        price.to_string()
    }
}

impl TryFrom<String> for Price {
    type Error = MarketError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

// ============================================================================
// Sale
// ============================================================================

/// The completed purchase of a listing.
///
/// Present on a [`Listing`] exactly when the listing is sold.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sale {
    /// Username of the buyer (never changes once recorded)
    pub buyer_username: String,
    /// When the sale was recorded
    pub sold_at: DateTime<Utc>,
    /// Caller-supplied transaction reference, recorded for audit only.
    ///
    /// `None` only for rows migrated from before references were recorded.
    pub tx_ref: Option<String>,
}

impl Sale {
    /// Validate and build a sale record.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::Validation`] if the buyer or transaction reference is empty or too long.
    pub fn new(buyer_username: &str, tx_ref: &str, sold_at: DateTime<Utc>) -> Result<Self> {
        Ok(Self {
            buyer_username: required("buyer_username", buyer_username, MAX_LABEL_LEN)?,
            sold_at,
            tx_ref: Some(required("txid", tx_ref, MAX_TX_REF_LEN)?),
        })
    }
}

// ============================================================================
// Listing
// ============================================================================

/// A sellable item.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Listing {
    /// Unique identifier
    pub id: ListingId,
    /// Short title
    pub title: String,
    /// Long description
    pub description: String,
    /// Asking price
    pub price: Price,
    /// Optional category label
    pub category: Option<String>,
    /// Optional location label
    pub location: Option<String>,
    /// Optional item condition label
    pub item_condition: Option<String>,
    /// Owner (seller) username, immutable after creation
    pub owner_username: String,
    /// Ordered opaque references to uploaded images
    pub image_refs: Vec<String>,
    /// Creation time, immutable
    pub created_at: DateTime<Utc>,
    /// Sale record, `Some` once sold
    pub sale: Option<Sale>,
}

impl Listing {
    /// Whether this listing has been sold.
    #[must_use]
    pub const fn is_sold(&self) -> bool {
        self.sale.is_some()
    }

    /// Buyer username, if sold.
    #[must_use]
    pub fn buyer_username(&self) -> Option<&str> {
        self.sale.as_ref().map(|sale| sale.buyer_username.as_str())
    }

    /// Sale time, if sold.
    #[must_use]
    pub fn sold_at(&self) -> Option<DateTime<Utc>> {
        self.sale.as_ref().map(|sale| sale.sold_at)
    }

    /// Whether `username` owns this listing.
    #[must_use]
    pub fn is_owned_by(&self, username: &str) -> bool {
        self.owner_username == username
    }

    /// Sort key for purchase history: sale time, falling back to creation time.
    #[must_use]
    pub fn purchase_order_key(&self) -> DateTime<Utc> {
        self.sold_at().unwrap_or(self.created_at)
    }

    /// Apply the `active → sold` transition.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::NotAvailable`] if the listing is already sold;
    /// the existing sale is left untouched.
    pub fn complete_sale(&mut self, sale: Sale) -> Result<()> {
        if self.is_sold() {
            return Err(MarketError::NotAvailable);
        }
        self.sale = Some(sale);
        Ok(())
    }
}

/// Validated request to create a listing.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NewListing {
    /// Short title (required)
    pub title: String,
    /// Long description (required)
    pub description: String,
    /// Asking price
    pub price: Option<Price>,
    /// Optional category
    pub category: Option<String>,
    /// Optional location
    pub location: Option<String>,
    /// Optional item condition
    pub item_condition: Option<String>,
    /// Owner username (required)
    pub owner_username: String,
    /// Ordered image references
    pub image_refs: Vec<String>,
}

impl NewListing {
    /// Trim and check every field.
    ///
    /// Empty optional labels are normalized to `None`.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::Validation`] if title, description, price or owner
    /// is missing, or any field exceeds its column width.
    pub fn validated(self) -> Result<Self> {
        let optional = |field: &str, value: Option<String>| -> Result<Option<String>> {
            match value {
                Some(v) if !v.trim().is_empty() => required(field, &v, MAX_LABEL_LEN).map(Some),
                _ => Ok(None),
            }
        };

        let description = self.description.trim();
        if description.is_empty() {
            return Err(MarketError::validation("description is required"));
        }

        Ok(Self {
            title: required("title", &self.title, MAX_TITLE_LEN)?,
            description: description.to_string(),
            price: Some(
                self.price
                    .ok_or_else(|| MarketError::validation("price is required"))?,
            ),
            category: optional("category", self.category)?,
            location: optional("location", self.location)?,
            item_condition: optional("condition", self.item_condition)?,
            owner_username: required("username", &self.owner_username, MAX_LABEL_LEN)?,
            image_refs: self.image_refs,
        })
    }

    /// Materialize the listing once the store has assigned an id.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::Validation`] if the price is missing.
    pub fn into_listing(self, id: ListingId, created_at: DateTime<Utc>) -> Result<Listing> {
        Ok(Listing {
            id,
            title: self.title,
            description: self.description,
            price: self
                .price
                .ok_or_else(|| MarketError::validation("price is required"))?,
            category: self.category,
            location: self.location,
            item_condition: self.item_condition,
            owner_username: self.owner_username,
            image_refs: self.image_refs,
            created_at,
            sale: None,
        })
    }
}
