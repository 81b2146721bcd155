//! `PostgreSQL` listing store.
//!
//! Images live in `listing_images(listing_id, position, file_ref)` and are
//! loaded in one `= ANY($1)` query per read, ordered by `position`.
//!
//! The sold transition is a single conditional update:
//!
//! ```sql
//! UPDATE listings SET is_sold = TRUE, ... WHERE id = $1 AND is_sold = FALSE RETURNING ...
//! ```
//!
//! Zero returned rows means the listing was missing or somebody else bought
//! it first; `PostgreSQL` row locking serializes the concurrent updates.

use crate::error::store_error;
use chaingo_core::{
    Listing, ListingId, ListingStore, MarketError, NewListing, Page, PageRequest, Price,
    Readiness, Result, Sale, StoreFuture,
};
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use std::collections::HashMap;

const LISTING_COLUMNS: &str = "id, title, description, price_cents, category, location, \
     item_condition, owner_username, created_at, is_sold, buyer_username, sold_at, tx_ref";

#[derive(FromRow)]
struct ListingRow {
    id: i64,
    title: String,
    description: String,
    price_cents: i64,
    category: Option<String>,
    location: Option<String>,
    item_condition: Option<String>,
    owner_username: String,
    created_at: DateTime<Utc>,
    is_sold: bool,
    buyer_username: Option<String>,
    sold_at: Option<DateTime<Utc>>,
    tx_ref: Option<String>,
}

impl ListingRow {
    fn into_listing(self, image_refs: Vec<String>) -> Result<Listing> {
        let price = Price::from_cents(self.price_cents).map_err(|_| {
            MarketError::Internal(format!("listing {} has invalid price", self.id))
        })?;

        // Rows migrated without a sale time sort by creation time instead.
        let sale = match (self.is_sold, self.buyer_username) {
            (true, Some(buyer_username)) => Some(Sale {
                buyer_username,
                sold_at: self.sold_at.unwrap_or(self.created_at),
                tx_ref: self.tx_ref,
            }),
            _ => None,
        };

        Ok(Listing {
            id: ListingId::new(self.id),
            title: self.title,
            description: self.description,
            price,
            category: self.category,
            location: self.location,
            item_condition: self.item_condition,
            owner_username: self.owner_username,
            image_refs,
            created_at: self.created_at,
            sale,
        })
    }
}

#[derive(FromRow)]
struct ImageRow {
    listing_id: i64,
    file_ref: String,
}

/// Listings table plus its ordered image association.
#[derive(Clone)]
pub struct PostgresListingStore {
    pool: PgPool,
}

impl PostgresListingStore {
    /// Create a store over `pool`.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn begin(&self) -> Result<Transaction<'static, Postgres>> {
        self.pool
            .begin()
            .await
            .map_err(|e| store_error("Failed to begin transaction", &e))
    }

    /// Attach images to `rows`, preserving row order.
    async fn hydrate<'c, E>(executor: E, rows: Vec<ListingRow>) -> Result<Vec<Listing>>
    where
        E: sqlx::Executor<'c, Database = Postgres>,
    {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<i64> = rows.iter().map(|r| r.id).collect();
        let images: Vec<ImageRow> = sqlx::query_as(
            r"
            SELECT listing_id, file_ref
            FROM listing_images
            WHERE listing_id = ANY($1)
            ORDER BY listing_id, position
            ",
        )
        .bind(&ids)
        .fetch_all(executor)
        .await
        .map_err(|e| store_error("Failed to load listing images", &e))?;

        let mut by_listing: HashMap<i64, Vec<String>> = HashMap::new();
        for image in images {
            by_listing.entry(image.listing_id).or_default().push(image.file_ref);
        }

        rows.into_iter()
            .map(|row| {
                let refs = by_listing.remove(&row.id).unwrap_or_default();
                row.into_listing(refs)
            })
            .collect()
    }

    async fn fetch_where(&self, filter_and_order: &str, value: String) -> Result<Vec<Listing>> {
        let rows: Vec<ListingRow> = sqlx::query_as(&format!(
            "SELECT {LISTING_COLUMNS} FROM listings {filter_and_order}"
        ))
        .bind(value)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| store_error("Failed to list listings", &e))?;

        Self::hydrate(&self.pool, rows).await
    }

    async fn single(&self, row: ListingRow) -> Result<Listing> {
        Self::hydrate(&self.pool, vec![row])
            .await?
            .pop()
            .ok_or_else(|| MarketError::Internal("listing vanished while loading images".into()))
    }
}

impl ListingStore for PostgresListingStore {
    fn create(&self, listing: NewListing, created_at: DateTime<Utc>) -> StoreFuture<'_, Listing> {
        Box::pin(async move {
            let price = listing
                .price
                .ok_or_else(|| MarketError::validation("price is required"))?;

            let mut tx = self.begin().await?;

            let row: ListingRow = sqlx::query_as(&format!(
                r"
                INSERT INTO listings
                    (title, description, price_cents, category, location, item_condition,
                     owner_username, created_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                RETURNING {LISTING_COLUMNS}
                "
            ))
            .bind(&listing.title)
            .bind(&listing.description)
            .bind(price.cents())
            .bind(&listing.category)
            .bind(&listing.location)
            .bind(&listing.item_condition)
            .bind(&listing.owner_username)
            .bind(created_at)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| store_error("Failed to create listing", &e))?;

            if !listing.image_refs.is_empty() {
                sqlx::query(
                    r"
                    INSERT INTO listing_images (listing_id, position, file_ref)
                    SELECT $1, (t.ord - 1)::INTEGER, t.file_ref
                    FROM UNNEST($2::TEXT[]) WITH ORDINALITY AS t(file_ref, ord)
                    ",
                )
                .bind(row.id)
                .bind(&listing.image_refs)
                .execute(&mut *tx)
                .await
                .map_err(|e| store_error("Failed to store listing images", &e))?;
            }

            tx.commit()
                .await
                .map_err(|e| store_error("Failed to commit listing", &e))?;

            tracing::debug!(listing_id = row.id, images = listing.image_refs.len(), "Listing stored");
            row.into_listing(listing.image_refs)
        })
    }

    fn get(&self, id: ListingId) -> StoreFuture<'_, Option<Listing>> {
        Box::pin(async move {
            let row: Option<ListingRow> = sqlx::query_as(&format!(
                "SELECT {LISTING_COLUMNS} FROM listings WHERE id = $1"
            ))
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| store_error("Failed to get listing", &e))?;

            match row {
                Some(row) => self.single(row).await.map(Some),
                None => Ok(None),
            }
        })
    }

    fn delete_owned(&self, id: ListingId, owner_username: String) -> StoreFuture<'_, Listing> {
        Box::pin(async move {
            let mut tx = self.begin().await?;

            let row: Option<ListingRow> = sqlx::query_as(&format!(
                "SELECT {LISTING_COLUMNS} FROM listings \
                 WHERE id = $1 AND owner_username = $2 FOR UPDATE"
            ))
            .bind(id.get())
            .bind(&owner_username)
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| store_error("Failed to lock listing", &e))?;
            let row = row.ok_or(MarketError::NotFoundOrForbidden)?;

            // Images cascade with the row, so read them first.
            let listing = Self::hydrate(&mut *tx, vec![row])
                .await?
                .pop()
                .ok_or_else(|| MarketError::Internal("listing vanished while loading images".into()))?;

            sqlx::query("DELETE FROM listings WHERE id = $1")
                .bind(id.get())
                .execute(&mut *tx)
                .await
                .map_err(|e| store_error("Failed to delete listing", &e))?;

            tx.commit()
                .await
                .map_err(|e| store_error("Failed to commit listing delete", &e))?;

            Ok(listing)
        })
    }

    fn list_by_owner(&self, owner_username: String) -> StoreFuture<'_, Vec<Listing>> {
        Box::pin(async move {
            self.fetch_where(
                "WHERE owner_username = $1 ORDER BY created_at DESC, id DESC",
                owner_username,
            )
            .await
        })
    }

    fn list_active(&self, request: PageRequest) -> StoreFuture<'_, Page<Listing>> {
        Box::pin(async move {
            let limit = i64::try_from(request.limit())
                .map_err(|_| MarketError::validation("page_size out of range"))?;
            let offset = i64::try_from(request.offset())
                .map_err(|_| MarketError::validation("page out of range"))?;

            // Count and slice from one snapshot.
            let mut tx = self.begin().await?;
            sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ READ ONLY")
                .execute(&mut *tx)
                .await
                .map_err(|e| store_error("Failed to set isolation level", &e))?;

            let (total,): (i64,) =
                sqlx::query_as("SELECT COUNT(*) FROM listings WHERE NOT is_sold")
                    .fetch_one(&mut *tx)
                    .await
                    .map_err(|e| store_error("Failed to count active listings", &e))?;

            let rows: Vec<ListingRow> = sqlx::query_as(&format!(
                r"
                SELECT {LISTING_COLUMNS}
                FROM listings
                WHERE NOT is_sold
                ORDER BY created_at DESC, id DESC
                LIMIT $1 OFFSET $2
                "
            ))
            .bind(limit)
            .bind(offset)
            .fetch_all(&mut *tx)
            .await
            .map_err(|e| store_error("Failed to list active listings", &e))?;

            let items = Self::hydrate(&mut *tx, rows).await?;
            tx.commit()
                .await
                .map_err(|e| store_error("Failed to finish read", &e))?;

            Ok(Page::new(items, u64::try_from(total).unwrap_or_default(), request))
        })
    }

    fn list_purchases(&self, buyer_username: String) -> StoreFuture<'_, Vec<Listing>> {
        Box::pin(async move {
            self.fetch_where(
                "WHERE buyer_username = $1 AND is_sold \
                 ORDER BY COALESCE(sold_at, created_at) DESC, id DESC",
                buyer_username,
            )
            .await
        })
    }

    fn mark_sold(&self, id: ListingId, sale: Sale) -> StoreFuture<'_, Listing> {
        Box::pin(async move {
            let row: Option<ListingRow> = sqlx::query_as(&format!(
                r"
                UPDATE listings
                SET is_sold = TRUE, buyer_username = $2, sold_at = $3, tx_ref = $4
                WHERE id = $1 AND is_sold = FALSE
                RETURNING {LISTING_COLUMNS}
                "
            ))
            .bind(id.get())
            .bind(&sale.buyer_username)
            .bind(sale.sold_at)
            .bind(&sale.tx_ref)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| store_error("Failed to mark listing sold", &e))?;

            let row = row.ok_or(MarketError::NotAvailable)?;
            self.single(row).await
        })
    }
}

impl Readiness for PostgresListingStore {
    fn ping(&self) -> StoreFuture<'_, ()> {
        Box::pin(async move {
            sqlx::query("SELECT 1")
                .execute(&self.pool)
                .await
                .map_err(|e| store_error("Database ping failed", &e))?;
            Ok(())
        })
    }
}
