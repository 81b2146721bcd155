//! Read-only listing views.

use crate::config::ListingsConfig;
use chaingo_core::{Listing, ListingId, ListingStore, MarketError, Page, PageRequest, Result};
use std::sync::Arc;

/// Paginated and per-user listing reads.
#[derive(Clone)]
pub struct ListingQueryService {
    listings: Arc<dyn ListingStore>,
    limits: ListingsConfig,
}

impl ListingQueryService {
    /// Create a query service with the given page-size limits.
    #[must_use]
    pub fn new(listings: Arc<dyn ListingStore>, limits: ListingsConfig) -> Self {
        Self { listings, limits }
    }

    /// Fetch one listing, sold or not.
    ///
    /// # Errors
    ///
    /// - `NotFound`: no listing with `id`
    pub async fn get(&self, id: ListingId) -> Result<Listing> {
        self.listings
            .get(id)
            .await?
            .ok_or(MarketError::not_found("Listing"))
    }

    /// Unsold listings, newest first.
    ///
    /// Missing values default to page 1 and the configured page size.
    ///
    /// # Errors
    ///
    /// - `Validation`: `page < 1` or `page_size` outside `1..=max_page_size`
    pub async fn list_active(
        &self,
        page: Option<u32>,
        page_size: Option<u32>,
    ) -> Result<Page<Listing>> {
        let request = PageRequest::new(page, page_size, self.limits.default_page_size)
            .validate(self.limits.max_page_size)?;
        self.listings.list_active(request).await
    }

    /// All listings owned by `username`, newest first.
    ///
    /// # Errors
    ///
    /// - `StoreUnavailable`: store unreachable
    pub async fn list_by_owner(&self, username: &str) -> Result<Vec<Listing>> {
        self.listings.list_by_owner(username.trim().to_string()).await
    }

    /// Listings bought by `username`, most recent sale first.
    ///
    /// # Errors
    ///
    /// - `StoreUnavailable`: store unreachable
    pub async fn list_purchases(&self, username: &str) -> Result<Vec<Listing>> {
        self.listings.list_purchases(username.trim().to_string()).await
    }
}
