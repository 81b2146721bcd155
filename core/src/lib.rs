//! # ChainGo Core
//!
//! Domain types, error taxonomy and storage abstractions for the ChainGo
//! marketplace.
//!
//! ## Core Concepts
//!
//! - **User**: a wallet-registered identity, unique by wallet address and username
//! - **Listing**: a sellable item whose lifecycle is `active → sold`
//! - **Sale**: the buyer, timestamp and transaction reference recorded exactly once
//! - **Stores**: trait seams over persistence (`IdentityStore`, `ListingStore`, `WalletCodeStore`)
//! - **Clock**: injected time source so every timestamp is deterministic in tests
//!
//! ## Lifecycle
//!
//! ```text
//! create ──▶ Active ──complete_sale──▶ Sold (terminal)
//!              │
//!              └──delete (owner only)──▶ gone
//! ```
//!
//! The sold transition is modelled as `Listing::sale: Option<Sale>`, so a
//! listing is sold exactly when buyer and sale time are both present.
//!
//! ## Implementations
//!
//! - `chaingo-postgres`: production stores backed by `PostgreSQL`
//! - `chaingo-testing`: in-memory stores for tests and local demos

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod environment;
pub mod error;
pub mod listing;
pub mod pagination;
pub mod stores;
pub mod user;
pub mod wallet_code;

pub use environment::{Clock, SystemClock};
pub use error::{MarketError, Result};
pub use listing::{Listing, ListingId, NewListing, Price, Sale};
pub use pagination::{Page, PageRequest};
pub use stores::{IdentityStore, ListingStore, Readiness, StoreFuture, WalletCodeStore};
pub use user::{NewUser, User, UserId};
pub use wallet_code::{WalletCode, WalletCodeId};
