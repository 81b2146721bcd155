//! Business metrics for the marketplace.
//!
//! # Exported Metrics
//!
//! ## Counters
//! - `marketplace_listings_created_total` - Listings created
//! - `marketplace_listings_deleted_total` - Listings deleted by their owner
//! - `marketplace_purchases_total{outcome}` - Purchase attempts by outcome
//!   (`completed`, `not_available`, `rejected`)
//! - `marketplace_sessions_issued_total` - Successful wallet logins
//! - `marketplace_users_registered_total` - New users
//! - `marketplace_images_uploaded_total` - Image files written to the upload directory

use metrics::describe_counter;
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};

/// Initialize and register all business metrics descriptions.
///
/// This should be called once at application startup, before any metrics are recorded.
pub fn register_business_metrics() {
    describe_counter!(
        "marketplace_listings_created_total",
        "Total number of listings created"
    );
    describe_counter!(
        "marketplace_listings_deleted_total",
        "Total number of listings deleted by their owner"
    );
    describe_counter!(
        "marketplace_purchases_total",
        "Total purchase attempts by outcome (completed, not_available, rejected)"
    );
    describe_counter!(
        "marketplace_sessions_issued_total",
        "Total number of session tokens issued"
    );
    describe_counter!(
        "marketplace_users_registered_total",
        "Total number of registered users"
    );
    describe_counter!(
        "marketplace_images_uploaded_total",
        "Total number of listing images stored"
    );

    tracing::info!("Business metrics registered");
}

/// Install the global Prometheus recorder and describe every metric.
///
/// # Errors
///
/// Returns [`BuildError`] if a recorder is already installed.
pub fn install() -> Result<PrometheusHandle, BuildError> {
    let handle = PrometheusBuilder::new().install_recorder()?;
    register_business_metrics();
    Ok(handle)
}

/// A handle backed by a recorder that is not installed globally.
///
/// Rendering it yields an empty exposition; used where the process-wide
/// recorder must stay untouched (tests, embedded routers).
#[must_use]
pub fn detached_handle() -> PrometheusHandle {
    PrometheusBuilder::new().build_recorder().handle()
}

// ============================================================================
// Metric Recording Functions
// ============================================================================

/// Outcome label for `marketplace_purchases_total`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PurchaseOutcome {
    /// Listing marked sold
    Completed,
    /// Listing missing or already sold
    NotAvailable,
    /// Refused before reaching the store (validation, authorization, verifier)
    Rejected,
}

impl PurchaseOutcome {
    const fn label(self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::NotAvailable => "not_available",
            Self::Rejected => "rejected",
        }
    }
}

/// Record a listing creation.
pub fn record_listing_created(images: usize) {
    metrics::counter!("marketplace_listings_created_total").increment(1);
    metrics::counter!("marketplace_images_uploaded_total")
        .increment(u64::try_from(images).unwrap_or(u64::MAX));
}

/// Record a listing deletion.
pub fn record_listing_deleted() {
    metrics::counter!("marketplace_listings_deleted_total").increment(1);
}

/// Record a purchase attempt.
pub fn record_purchase(outcome: PurchaseOutcome) {
    metrics::counter!("marketplace_purchases_total", "outcome" => outcome.label()).increment(1);
    tracing::debug!(outcome = outcome.label(), "Recorded purchase metric");
}

/// Record an issued session.
pub fn record_session_issued() {
    metrics::counter!("marketplace_sessions_issued_total").increment(1);
}

/// Record a user registration.
pub fn record_user_registered() {
    metrics::counter!("marketplace_users_registered_total").increment(1);
}
