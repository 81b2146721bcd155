//! In-memory store implementations.
//!
//! `HashMap`/`BTreeMap` tables behind an `RwLock`. Every check-and-write
//! happens under a single write guard, so these stores give the same
//! uniqueness and exactly-once guarantees as the `PostgreSQL` ones.

use chaingo_core::{
    IdentityStore, Listing, ListingId, ListingStore, MarketError, NewListing, NewUser, Page,
    PageRequest, Readiness, Sale, StoreFuture, User, UserId, WalletCode, WalletCodeStore,
};
use chaingo_core::wallet_code::WalletCodeId;
use chrono::{DateTime, Utc};
use std::cmp::Reverse;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

fn to_usize(value: u64) -> usize {
    usize::try_from(value).unwrap_or(usize::MAX)
}

// ============================================================================
// Identity
// ============================================================================

#[derive(Debug, Default)]
struct UserTable {
    next_id: i64,
    users: BTreeMap<UserId, User>,
}

/// In-memory [`IdentityStore`].
#[derive(Clone, Debug, Default)]
pub struct InMemoryIdentityStore {
    table: Arc<RwLock<UserTable>>,
}

impl InMemoryIdentityStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Delete a user outright (simulates an account removed after a token was issued)
    pub fn remove_user(&self, id: UserId) -> Option<User> {
        write(&self.table).users.remove(&id)
    }

    /// Number of registered users
    #[must_use]
    pub fn len(&self) -> usize {
        read(&self.table).users.len()
    }

    /// Check if no user is registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        read(&self.table).users.is_empty()
    }

    fn find(&self, predicate: impl Fn(&User) -> bool) -> Option<User> {
        read(&self.table).users.values().find(|u| predicate(u)).cloned()
    }
}

impl IdentityStore for InMemoryIdentityStore {
    fn find_by_wallet(&self, wallet_address: String) -> StoreFuture<'_, Option<User>> {
        Box::pin(async move { Ok(self.find(|u| u.wallet_address == wallet_address)) })
    }

    fn find_by_id(&self, id: UserId) -> StoreFuture<'_, Option<User>> {
        Box::pin(async move { Ok(read(&self.table).users.get(&id).cloned()) })
    }

    fn find_by_username(&self, username: String) -> StoreFuture<'_, Option<User>> {
        Box::pin(async move { Ok(self.find(|u| u.username == username)) })
    }

    fn register(&self, user: NewUser, created_at: DateTime<Utc>) -> StoreFuture<'_, User> {
        Box::pin(async move {
            let mut table = write(&self.table);

            if table.users.values().any(|u| u.wallet_address == user.wallet_address()) {
                return Err(MarketError::conflict("Wallet address already registered"));
            }
            if table.users.values().any(|u| u.username == user.username()) {
                return Err(MarketError::conflict("Username already taken"));
            }

            table.next_id += 1;
            let user = user.into_user(UserId::new(table.next_id), created_at);
            table.users.insert(user.id, user.clone());
            Ok(user)
        })
    }

    fn touch_login(&self, id: UserId, at: DateTime<Utc>) -> StoreFuture<'_, ()> {
        Box::pin(async move {
            let mut table = write(&self.table);
            let user = table.users.get_mut(&id).ok_or(MarketError::UserNotFound)?;
            user.last_login_at = Some(at);
            Ok(())
        })
    }
}

// ============================================================================
// Listings
// ============================================================================

#[derive(Debug, Default)]
struct ListingTable {
    next_id: i64,
    listings: BTreeMap<ListingId, Listing>,
}

/// In-memory [`ListingStore`].
#[derive(Clone, Debug, Default)]
pub struct InMemoryListingStore {
    table: Arc<RwLock<ListingTable>>,
}

impl InMemoryListingStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored listings (sold and unsold)
    #[must_use]
    pub fn len(&self) -> usize {
        read(&self.table).listings.len()
    }

    /// Check if the store is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        read(&self.table).listings.is_empty()
    }

    /// Listings matching `predicate`, newest first.
    fn newest_first(&self, predicate: impl Fn(&Listing) -> bool) -> Vec<Listing> {
        let mut listings: Vec<Listing> = read(&self.table)
            .listings
            .values()
            .filter(|l| predicate(l))
            .cloned()
            .collect();
        listings.sort_by_key(|l| Reverse((l.created_at, l.id)));
        listings
    }
}

impl ListingStore for InMemoryListingStore {
    fn create(&self, listing: NewListing, created_at: DateTime<Utc>) -> StoreFuture<'_, Listing> {
        Box::pin(async move {
            let mut table = write(&self.table);
            let id = ListingId::new(table.next_id + 1);
            let listing = listing.into_listing(id, created_at)?;
            table.next_id += 1;
            table.listings.insert(id, listing.clone());
            Ok(listing)
        })
    }

    fn get(&self, id: ListingId) -> StoreFuture<'_, Option<Listing>> {
        Box::pin(async move { Ok(read(&self.table).listings.get(&id).cloned()) })
    }

    fn delete_owned(&self, id: ListingId, owner_username: String) -> StoreFuture<'_, Listing> {
        Box::pin(async move {
            let mut table = write(&self.table);
            match table.listings.get(&id) {
                Some(listing) if listing.is_owned_by(&owner_username) => {
                    table.listings.remove(&id).ok_or(MarketError::NotFoundOrForbidden)
                },
                _ => Err(MarketError::NotFoundOrForbidden),
            }
        })
    }

    fn list_by_owner(&self, owner_username: String) -> StoreFuture<'_, Vec<Listing>> {
        Box::pin(async move { Ok(self.newest_first(|l| l.is_owned_by(&owner_username))) })
    }

    fn list_active(&self, request: PageRequest) -> StoreFuture<'_, Page<Listing>> {
        Box::pin(async move {
            let active = self.newest_first(|l| !l.is_sold());
            let total = active.len() as u64;
            let items = active
                .into_iter()
                .skip(to_usize(request.offset()))
                .take(to_usize(request.limit()))
                .collect();
            Ok(Page::new(items, total, request))
        })
    }

    fn list_purchases(&self, buyer_username: String) -> StoreFuture<'_, Vec<Listing>> {
        Box::pin(async move {
            let mut purchases: Vec<Listing> = read(&self.table)
                .listings
                .values()
                .filter(|l| l.buyer_username() == Some(buyer_username.as_str()))
                .cloned()
                .collect();
            purchases.sort_by_key(|l| Reverse((l.purchase_order_key(), l.id)));
            Ok(purchases)
        })
    }

    fn mark_sold(&self, id: ListingId, sale: Sale) -> StoreFuture<'_, Listing> {
        Box::pin(async move {
            let mut table = write(&self.table);
            let listing = table
                .listings
                .get_mut(&id)
                .ok_or(MarketError::NotAvailable)?;
            listing.complete_sale(sale)?;
            Ok(listing.clone())
        })
    }
}

impl Readiness for InMemoryListingStore {
    fn ping(&self) -> StoreFuture<'_, ()> {
        Box::pin(async { Ok(()) })
    }
}

// ============================================================================
// Wallet codes
// ============================================================================

#[derive(Debug, Default)]
struct WalletCodeTable {
    next_id: i64,
    codes: HashMap<String, WalletCode>,
}

/// In-memory [`WalletCodeStore`].
#[derive(Clone, Debug, Default)]
pub struct InMemoryWalletCodeStore {
    table: Arc<RwLock<WalletCodeTable>>,
}

impl InMemoryWalletCodeStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if `code` has been saved
    #[must_use]
    pub fn contains(&self, code: &str) -> bool {
        read(&self.table).codes.contains_key(code)
    }
}

impl WalletCodeStore for InMemoryWalletCodeStore {
    fn save(&self, code: String, created_at: DateTime<Utc>) -> StoreFuture<'_, WalletCode> {
        Box::pin(async move {
            let mut table = write(&self.table);
            if table.codes.contains_key(&code) {
                return Err(MarketError::conflict("Wallet code already exists"));
            }
            table.next_id += 1;
            let saved = WalletCode {
                id: WalletCodeId::new(table.next_id),
                code: code.clone(),
                created_at,
            };
            table.codes.insert(code, saved.clone());
            Ok(saved)
        })
    }
}
