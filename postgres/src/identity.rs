//! `PostgreSQL` identity store.

use crate::error::{store_error, unique_violation};
use chaingo_core::{IdentityStore, MarketError, NewUser, StoreFuture, User, UserId};
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

const USER_COLUMNS: &str =
    "id, wallet_address, username, display_name, created_at, last_login_at";

#[derive(FromRow)]
struct UserRow {
    id: i64,
    wallet_address: String,
    username: String,
    display_name: String,
    created_at: DateTime<Utc>,
    last_login_at: Option<DateTime<Utc>>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: UserId::new(row.id),
            wallet_address: row.wallet_address,
            username: row.username,
            display_name: row.display_name,
            created_at: row.created_at,
            last_login_at: row.last_login_at,
        }
    }
}

enum Lookup {
    Id(i64),
    Wallet(String),
    Username(String),
}

/// Users table, unique by wallet address and by username.
#[derive(Clone)]
pub struct PostgresIdentityStore {
    pool: PgPool,
}

impl PostgresIdentityStore {
    /// Create a store over `pool`.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn find_one(&self, lookup: Lookup) -> chaingo_core::Result<Option<User>> {
        let column = match &lookup {
            Lookup::Id(_) => "id",
            Lookup::Wallet(_) => "wallet_address",
            Lookup::Username(_) => "username",
        };
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE {column} = $1");
        let query = sqlx::query_as::<_, UserRow>(&sql);
        let query = match lookup {
            Lookup::Id(id) => query.bind(id),
            Lookup::Wallet(value) | Lookup::Username(value) => query.bind(value),
        };

        let row = query
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| store_error("Failed to get user", &e))?;
        Ok(row.map(User::from))
    }
}

impl IdentityStore for PostgresIdentityStore {
    fn find_by_wallet(&self, wallet_address: String) -> StoreFuture<'_, Option<User>> {
        Box::pin(async move { self.find_one(Lookup::Wallet(wallet_address)).await })
    }

    fn find_by_id(&self, id: UserId) -> StoreFuture<'_, Option<User>> {
        Box::pin(async move { self.find_one(Lookup::Id(id.get())).await })
    }

    fn find_by_username(&self, username: String) -> StoreFuture<'_, Option<User>> {
        Box::pin(async move { self.find_one(Lookup::Username(username)).await })
    }

    fn register(&self, user: NewUser, created_at: DateTime<Utc>) -> StoreFuture<'_, User> {
        Box::pin(async move {
            let row: UserRow = sqlx::query_as(&format!(
                r"
                INSERT INTO users (wallet_address, username, display_name, created_at)
                VALUES ($1, $2, $3, $4)
                RETURNING {USER_COLUMNS}
                "
            ))
            .bind(user.wallet_address())
            .bind(user.username())
            .bind(user.display_name())
            .bind(created_at)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| match unique_violation(&e).as_deref() {
                Some("users_wallet_address_unique") => {
                    MarketError::conflict("Wallet address already registered")
                },
                Some("users_username_unique") => MarketError::conflict("Username already taken"),
                Some(_) => MarketError::conflict("User already exists"),
                None => store_error("Failed to register user", &e),
            })?;

            tracing::info!(user_id = row.id, username = %row.username, "User registered");
            Ok(User::from(row))
        })
    }

    fn touch_login(&self, id: UserId, at: DateTime<Utc>) -> StoreFuture<'_, ()> {
        Box::pin(async move {
            let result = sqlx::query("UPDATE users SET last_login_at = $2 WHERE id = $1")
                .bind(id.get())
                .bind(at)
                .execute(&self.pool)
                .await
                .map_err(|e| store_error("Failed to update last login", &e))?;

            if result.rows_affected() == 0 {
                return Err(MarketError::UserNotFound);
            }
            Ok(())
        })
    }
}
