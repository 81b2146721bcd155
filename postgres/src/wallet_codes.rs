//! `PostgreSQL` wallet code registry.

use crate::error::{store_error, unique_violation};
use chaingo_core::wallet_code::WalletCodeId;
use chaingo_core::{MarketError, StoreFuture, WalletCode, WalletCodeStore};
use chrono::{DateTime, Utc};
use sqlx::PgPool;

/// `wallet_codes` table.
#[derive(Clone)]
pub struct PostgresWalletCodeStore {
    pool: PgPool,
}

impl PostgresWalletCodeStore {
    /// Create a store over `pool`.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl WalletCodeStore for PostgresWalletCodeStore {
    fn save(&self, code: String, created_at: DateTime<Utc>) -> StoreFuture<'_, WalletCode> {
        Box::pin(async move {
            let (id,): (i64,) = sqlx::query_as(
                "INSERT INTO wallet_codes (wallet_code, created_at) VALUES ($1, $2) RETURNING id",
            )
            .bind(&code)
            .bind(created_at)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                if unique_violation(&e).is_some() {
                    MarketError::conflict("Wallet code already exists")
                } else {
                    store_error("Failed to save wallet code", &e)
                }
            })?;

            tracing::debug!(wallet_code_id = id, "Wallet code saved");
            Ok(WalletCode {
                id: WalletCodeId::new(id),
                code,
                created_at,
            })
        })
    }
}
