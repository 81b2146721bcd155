//! Application state for the marketplace HTTP server.

use crate::app::{IdentityService, ListingQueryService, ListingService, PurchaseCoordinator};
use chaingo_auth::SessionIssuer;
use chaingo_core::Readiness;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;

/// Application state shared across all HTTP handlers.
///
/// Cloned for each request; every field is a cheap handle.
#[derive(Clone)]
pub struct AppState {
    /// Session issuing and validation
    pub sessions: SessionIssuer,
    /// Registration, wallet lookups and wallet codes
    pub identity: IdentityService,
    /// Listing create/delete
    pub listings: ListingService,
    /// Purchases
    pub purchases: PurchaseCoordinator,
    /// Listing reads
    pub queries: ListingQueryService,
    /// Backend probe for `/db-check`
    pub readiness: Arc<dyn Readiness>,
    /// Prometheus exposition for `/metrics`
    pub metrics: PrometheusHandle,
}
