//! Listing creation and deletion.

use crate::metrics;
use crate::uploads::{ImageStore, ImageUpload};
use chaingo_auth::SessionIdentity;
use chaingo_core::{Clock, Listing, ListingId, ListingStore, NewListing, Result};
use std::sync::Arc;

/// Mutating listing operations, gated by the caller's session.
#[derive(Clone)]
pub struct ListingService {
    listings: Arc<dyn ListingStore>,
    images: ImageStore,
    clock: Arc<dyn Clock>,
}

impl ListingService {
    /// Create a new listing service.
    #[must_use]
    pub fn new(listings: Arc<dyn ListingStore>, images: ImageStore, clock: Arc<dyn Clock>) -> Self {
        Self {
            listings,
            images,
            clock,
        }
    }

    /// Create a listing owned by the session user.
    ///
    /// An empty `owner_username` is filled from the session. The request is
    /// validated before any image is written; images are stored in the order
    /// given and removed again if the listing cannot be persisted.
    ///
    /// # Errors
    ///
    /// - `Forbidden`: `owner_username` names somebody else
    /// - `Validation`: missing title, description or price
    /// - `Internal`: an image could not be written
    pub async fn create(
        &self,
        session: &SessionIdentity,
        mut listing: NewListing,
        uploads: Vec<ImageUpload>,
    ) -> Result<Listing> {
        if listing.owner_username.trim().is_empty() {
            listing.owner_username = session.username().to_string();
        } else {
            session.ensure_acts_as(&listing.owner_username)?;
        }
        let mut listing = listing.validated()?;

        let stored = self.images.save_all(uploads).await?;
        listing.image_refs.extend(stored.iter().cloned());

        match self.listings.create(listing, self.clock.now()).await {
            Ok(created) => {
                metrics::record_listing_created(stored.len());
                tracing::info!(
                    listing_id = %created.id,
                    username = %created.owner_username,
                    images = created.image_refs.len(),
                    "Listing created"
                );
                Ok(created)
            }
            Err(e) => {
                self.images.discard(&stored).await;
                Err(e)
            }
        }
    }

    /// Delete a listing owned by `username` together with its image files.
    ///
    /// # Errors
    ///
    /// - `Forbidden`: `username` is not the session user
    /// - `NotFoundOrForbidden`: no listing `id` owned by `username`
    pub async fn delete(
        &self,
        session: &SessionIdentity,
        id: ListingId,
        username: &str,
    ) -> Result<()> {
        session.ensure_acts_as(username)?;
        let deleted = self
            .listings
            .delete_owned(id, session.username().to_string())
            .await?;
        self.images.discard(&deleted.image_refs).await;

        metrics::record_listing_deleted();
        tracing::info!(
            listing_id = %id,
            username = %session.username(),
            images = deleted.image_refs.len(),
            "Listing deleted"
        );
        Ok(())
    }
}
