//! Purchase coordination: the `active → sold` transition.
//!
//! ```text
//! session ──ensure_acts_as(buyer)──▶ Sale::new ──▶ verifier ──▶ mark_sold
//!    │                                  │             │             │
//!    └─ Forbidden                       └─ Validation └─ (any)      └─ NotAvailable
//! ```
//!
//! Exactly-once is enforced by the store: `mark_sold` is a single
//! conditional update, so concurrent attempts on one listing produce one
//! success and `NotAvailable` for everybody else.

use crate::metrics::{self, PurchaseOutcome};
use chaingo_auth::SessionIdentity;
use chaingo_core::{Clock, Listing, ListingId, ListingStore, MarketError, Result, Sale, StoreFuture};
use std::sync::Arc;

/// Checks a transaction reference before a sale is recorded.
pub trait TransactionVerifier: Send + Sync {
    /// Accept or reject `tx_ref` as payment for `listing` by `buyer_username`.
    ///
    /// # Errors
    ///
    /// Any error aborts the purchase and is returned to the caller unchanged.
    fn verify<'a>(
        &'a self,
        listing: ListingId,
        buyer_username: &'a str,
        tx_ref: &'a str,
    ) -> StoreFuture<'a, ()>;
}

/// Records transaction references without checking them.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAllVerifier;

impl TransactionVerifier for AcceptAllVerifier {
    fn verify<'a>(
        &'a self,
        _listing: ListingId,
        _buyer_username: &'a str,
        _tx_ref: &'a str,
    ) -> StoreFuture<'a, ()> {
        Box::pin(async { Ok(()) })
    }
}

/// Orchestrates purchases.
#[derive(Clone)]
pub struct PurchaseCoordinator {
    listings: Arc<dyn ListingStore>,
    verifier: Arc<dyn TransactionVerifier>,
    clock: Arc<dyn Clock>,
}

impl PurchaseCoordinator {
    /// Create a coordinator.
    #[must_use]
    pub fn new(
        listings: Arc<dyn ListingStore>,
        verifier: Arc<dyn TransactionVerifier>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            listings,
            verifier,
            clock,
        }
    }

    /// Mark `id` sold to `buyer_username`, recording `tx_ref`.
    ///
    /// # Errors
    ///
    /// - `Forbidden`: `buyer_username` is not the session user
    /// - `Validation`: empty `tx_ref`
    /// - `NotAvailable`: listing missing or already sold
    pub async fn complete_purchase(
        &self,
        session: &SessionIdentity,
        id: ListingId,
        buyer_username: &str,
        tx_ref: &str,
    ) -> Result<Listing> {
        let result = self.try_purchase(session, id, buyer_username, tx_ref).await;

        match &result {
            Ok(listing) => {
                metrics::record_purchase(PurchaseOutcome::Completed);
                tracing::info!(
                    listing_id = %listing.id,
                    buyer = %session.username(),
                    seller = %listing.owner_username,
                    "Purchase completed"
                );
            }
            Err(MarketError::NotAvailable) => {
                metrics::record_purchase(PurchaseOutcome::NotAvailable);
                tracing::info!(listing_id = %id, buyer = %session.username(), "Listing not available");
            }
            Err(e) => {
                metrics::record_purchase(PurchaseOutcome::Rejected);
                tracing::warn!(listing_id = %id, error = %e, "Purchase rejected");
            }
        }

        result
    }

    async fn try_purchase(
        &self,
        session: &SessionIdentity,
        id: ListingId,
        buyer_username: &str,
        tx_ref: &str,
    ) -> Result<Listing> {
        session.ensure_acts_as(buyer_username)?;
        let sale = Sale::new(session.username(), tx_ref, self.clock.now())?;

        if let Some(tx_ref) = sale.tx_ref.as_deref() {
            self.verifier.verify(id, &sale.buyer_username, tx_ref).await?;
        }

        self.listings.mark_sold(id, sale).await
    }
}
