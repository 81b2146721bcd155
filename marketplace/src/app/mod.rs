//! Application services.
//!
//! Each service owns its store handles and a clock, checks the caller's
//! session where an operation mutates state, and records business metrics:
//!
//! - [`IdentityService`]: registration, wallet lookup, wallet codes
//! - [`ListingService`]: create and delete listings
//! - [`PurchaseCoordinator`]: the `active → sold` transition
//! - [`ListingQueryService`]: read-only listing views

pub mod coordinator;
pub mod identity;
pub mod listings;
pub mod queries;

pub use coordinator::{AcceptAllVerifier, PurchaseCoordinator, TransactionVerifier};
pub use identity::IdentityService;
pub use listings::ListingService;
pub use queries::ListingQueryService;
