//! `PostgreSQL` stores for the ChainGo marketplace.
//!
//! This crate implements the store traits from `chaingo-core` on top of a
//! shared `sqlx` connection pool:
//!
//! - [`PostgresIdentityStore`]: users, unique by wallet address and username
//! - [`PostgresListingStore`]: listings with an ordered `listing_images` association
//! - [`PostgresWalletCodeStore`]: the wallet code registry
//!
//! Queries are checked at runtime, so building does not need a live
//! database. The schema ships as embedded migrations (see [`migrate`]).
//!
//! # Example
//!
//! ```no_run
//! use chaingo_postgres::{PoolSettings, PostgresListingStore, connect, migrate};
//!
//! # async fn example() -> chaingo_core::Result<()> {
//! let pool = connect(&PoolSettings::new("postgres://localhost/chaingo")).await?;
//! migrate(&pool).await?;
//! let listings = PostgresListingStore::new(pool);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod identity;
mod listings;
mod wallet_codes;

pub use identity::PostgresIdentityStore;
pub use listings::PostgresListingStore;
pub use wallet_codes::PostgresWalletCodeStore;

use chaingo_core::{MarketError, Result};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::time::Duration;

/// Connection pool settings.
#[derive(Debug, Clone)]
pub struct PoolSettings {
    /// `PostgreSQL` connection URL
    pub url: String,
    /// Maximum number of connections in the pool
    pub max_connections: u32,
    /// Minimum number of idle connections in the pool
    pub min_connections: u32,
    /// How long to wait for a connection before failing
    pub acquire_timeout: Duration,
}

impl PoolSettings {
    /// Settings for `url` with the default pool sizes (2..=10, 30 s timeout).
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_connections: 10,
            min_connections: 2,
            acquire_timeout: Duration::from_secs(30),
        }
    }
}

/// Open a connection pool.
///
/// # Errors
///
/// Returns [`MarketError::StoreUnavailable`] if the database cannot be reached.
pub async fn connect(settings: &PoolSettings) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .min_connections(settings.min_connections)
        .acquire_timeout(settings.acquire_timeout)
        .connect(&settings.url)
        .await
        .map_err(|e| MarketError::StoreUnavailable(format!("Failed to connect: {e}")))?;

    tracing::info!(
        max_connections = settings.max_connections,
        "PostgreSQL pool ready"
    );
    Ok(pool)
}

/// Apply the embedded schema migrations.
///
/// # Errors
///
/// Returns [`MarketError::Internal`] if a migration fails.
pub async fn migrate(pool: &PgPool) -> Result<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(|e| MarketError::Internal(format!("Migration failed: {e}")))?;
    tracing::info!("Marketplace migrations complete");
    Ok(())
}
