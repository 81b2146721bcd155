//! `sqlx` error classification.

use chaingo_core::MarketError;

/// Map a driver error onto the marketplace taxonomy.
///
/// Connectivity failures become `StoreUnavailable`; everything else is
/// `Internal`. Unique violations are handled by the callers that expect them.
pub(crate) fn store_error(context: &str, error: &sqlx::Error) -> MarketError {
    match error {
        sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::WorkerCrashed => {
            tracing::warn!(error = %error, "{context}: database unavailable");
            MarketError::StoreUnavailable(format!("{context}: {error}"))
        },
        _ => MarketError::Internal(format!("{context}: {error}")),
    }
}

/// Name of the violated unique constraint, if `error` is a unique violation.
pub(crate) fn unique_violation(error: &sqlx::Error) -> Option<String> {
    if let sqlx::Error::Database(db_err) = error {
        if db_err.is_unique_violation() {
            return Some(db_err.constraint().unwrap_or_default().to_string());
        }
    }
    None
}
