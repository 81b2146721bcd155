//! Wiring: stores, services and the router.
//!
//! ```text
//! Config ──▶ Stores (postgres | memory) ──▶ AppState ──▶ Router
//! ```

use crate::app::{
    AcceptAllVerifier, IdentityService, ListingQueryService, ListingService, PurchaseCoordinator,
};
use crate::config::{Config, DatabaseConfig, StorageBackend};
use crate::server::{AppState, build_router};
use crate::uploads::ImageStore;
use anyhow::Context;
use axum::Router;
use chaingo_auth::SessionIssuer;
use chaingo_core::{
    Clock, IdentityStore, ListingStore, Readiness, Result, SystemClock, WalletCodeStore,
};
use chaingo_postgres::{
    PoolSettings, PostgresIdentityStore, PostgresListingStore, PostgresWalletCodeStore,
};
use chaingo_testing::{InMemoryIdentityStore, InMemoryListingStore, InMemoryWalletCodeStore};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use std::time::Duration;

/// The store implementations behind the services.
#[derive(Clone)]
pub struct Stores {
    /// Users
    pub identity: Arc<dyn IdentityStore>,
    /// Listings and sales
    pub listings: Arc<dyn ListingStore>,
    /// Wallet codes
    pub wallet_codes: Arc<dyn WalletCodeStore>,
    /// Backend probe
    pub readiness: Arc<dyn Readiness>,
}

impl Stores {
    /// Process-local stores; contents are lost on restart.
    #[must_use]
    pub fn in_memory() -> Self {
        let listings = Arc::new(InMemoryListingStore::new());
        Self {
            identity: Arc::new(InMemoryIdentityStore::new()),
            listings: listings.clone(),
            wallet_codes: Arc::new(InMemoryWalletCodeStore::new()),
            readiness: listings,
        }
    }

    /// Connect to `PostgreSQL` and apply migrations.
    ///
    /// # Errors
    ///
    /// - `StoreUnavailable`: database unreachable
    /// - `Internal`: a migration failed
    pub async fn postgres(config: &DatabaseConfig) -> Result<Self> {
        let settings = PoolSettings {
            url: config.url.clone(),
            max_connections: config.max_connections,
            min_connections: config.min_connections,
            acquire_timeout: Duration::from_secs(config.connect_timeout),
        };
        let pool = chaingo_postgres::connect(&settings).await?;
        chaingo_postgres::migrate(&pool).await?;

        let listings = Arc::new(PostgresListingStore::new(pool.clone()));
        Ok(Self {
            identity: Arc::new(PostgresIdentityStore::new(pool.clone())),
            listings: listings.clone(),
            wallet_codes: Arc::new(PostgresWalletCodeStore::new(pool)),
            readiness: listings,
        })
    }

    /// Stores for the configured backend.
    ///
    /// # Errors
    ///
    /// Same as [`Stores::postgres`]; the memory backend cannot fail.
    pub async fn from_config(config: &Config) -> Result<Self> {
        match config.storage {
            StorageBackend::Postgres => Self::postgres(&config.database).await,
            StorageBackend::Memory => {
                tracing::warn!("Using in-memory storage; data is lost on restart");
                Ok(Self::in_memory())
            }
        }
    }
}

/// Assemble the services over `stores`.
#[must_use]
pub fn build_state(
    config: &Config,
    stores: Stores,
    clock: Arc<dyn Clock>,
    metrics: PrometheusHandle,
) -> AppState {
    let images = ImageStore::new(&config.server.upload_dir);

    AppState {
        sessions: SessionIssuer::new(Arc::clone(&stores.identity), Arc::clone(&clock), &config.auth),
        identity: IdentityService::new(stores.identity, stores.wallet_codes, Arc::clone(&clock)),
        listings: ListingService::new(Arc::clone(&stores.listings), images, Arc::clone(&clock)),
        purchases: PurchaseCoordinator::new(
            Arc::clone(&stores.listings),
            Arc::new(AcceptAllVerifier),
            clock,
        ),
        queries: ListingQueryService::new(stores.listings, config.listings),
        readiness: stores.readiness,
        metrics,
    }
}

/// Connect storage, prepare the upload directory and build the router.
///
/// # Errors
///
/// Returns an error if storage cannot be initialised or the upload
/// directory cannot be created.
pub async fn build_app(config: &Config, metrics: PrometheusHandle) -> anyhow::Result<Router> {
    let stores = Stores::from_config(config)
        .await
        .context("failed to initialise storage")?;

    let images = ImageStore::new(&config.server.upload_dir);
    images.ensure_dir().await.with_context(|| {
        format!("failed to create upload directory {}", images.dir().display())
    })?;

    let state = build_state(config, stores, Arc::new(SystemClock), metrics);
    Ok(build_router(state, &config.server))
}
