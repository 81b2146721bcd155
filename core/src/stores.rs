//! Storage seams for users, listings and wallet codes.
//!
//! Each trait is implemented twice: over `PostgreSQL` in `chaingo-postgres`
//! and in memory in `chaingo-testing`. Services hold them as
//! `Arc<dyn …Store>` so the backend is chosen at startup.
//!
//! # Design
//!
//! Methods return [`StoreFuture`] (an explicit `Pin<Box<dyn Future>>`) instead
//! of using `async fn`, which keeps the traits dyn-compatible.

use crate::error::Result;
use crate::listing::{Listing, ListingId, NewListing, Sale};
use crate::pagination::{Page, PageRequest};
use crate::user::{NewUser, User, UserId};
use crate::wallet_code::WalletCode;
use chrono::{DateTime, Utc};
use std::future::Future;
use std::pin::Pin;

/// Boxed future returned by every store method.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + Send + 'a>>;

/// User records keyed by wallet address and username.
pub trait IdentityStore: Send + Sync {
    /// Look up a user by wallet address. A miss is `Ok(None)`.
    fn find_by_wallet(&self, wallet_address: String) -> StoreFuture<'_, Option<User>>;

    /// Look up a user by id.
    fn find_by_id(&self, id: UserId) -> StoreFuture<'_, Option<User>>;

    /// Look up a user by username.
    fn find_by_username(&self, username: String) -> StoreFuture<'_, Option<User>>;

    /// Persist a new user.
    ///
    /// # Errors
    ///
    /// - `Conflict`: wallet address or username already registered
    /// - `StoreUnavailable`: backend unreachable
    fn register(&self, user: NewUser, created_at: DateTime<Utc>) -> StoreFuture<'_, User>;

    /// Record a successful authentication at `at`.
    ///
    /// # Errors
    ///
    /// - `UserNotFound`: the user was removed in the meantime
    fn touch_login(&self, id: UserId, at: DateTime<Utc>) -> StoreFuture<'_, ()>;
}

/// Listing records and their `active → sold` transition.
pub trait ListingStore: Send + Sync {
    /// Persist a validated listing with its image references in order.
    fn create(&self, listing: NewListing, created_at: DateTime<Utc>) -> StoreFuture<'_, Listing>;

    /// Fetch a listing by id.
    fn get(&self, id: ListingId) -> StoreFuture<'_, Option<Listing>>;

    /// Delete a listing owned by `owner_username`, returning it as it was.
    ///
    /// # Errors
    ///
    /// - `NotFoundOrForbidden`: no listing with that id is owned by `owner_username`
    fn delete_owned(&self, id: ListingId, owner_username: String) -> StoreFuture<'_, Listing>;

    /// All listings owned by `owner_username`, newest first.
    fn list_by_owner(&self, owner_username: String) -> StoreFuture<'_, Vec<Listing>>;

    /// One page of unsold listings, newest first.
    fn list_active(&self, request: PageRequest) -> StoreFuture<'_, Page<Listing>>;

    /// Sold listings bought by `buyer_username`, most recent sale first.
    fn list_purchases(&self, buyer_username: String) -> StoreFuture<'_, Vec<Listing>>;

    /// Atomically apply the sold transition.
    ///
    /// The check that the listing is unsold and the write of `sale` happen as
    /// one step; of any number of concurrent calls for the same listing at
    /// most one succeeds.
    ///
    /// # Errors
    ///
    /// - `NotAvailable`: listing missing or already sold
    fn mark_sold(&self, id: ListingId, sale: Sale) -> StoreFuture<'_, Listing>;
}

/// Uniqueness-checked registry of wallet codes.
pub trait WalletCodeStore: Send + Sync {
    /// Save an already validated code.
    ///
    /// # Errors
    ///
    /// - `Conflict`: code already saved
    fn save(&self, code: String, created_at: DateTime<Utc>) -> StoreFuture<'_, WalletCode>;
}

/// Backend round-trip used by readiness probes.
pub trait Readiness: Send + Sync {
    /// Succeeds when the backend answers a trivial query.
    fn ping(&self) -> StoreFuture<'_, ()>;
}
