//! # ChainGo Testing
//!
//! Testing utilities for the ChainGo marketplace.
//!
//! This crate provides:
//! - [`FixedClock`]: deterministic, manually advanced time
//! - In-memory implementations of every store trait (also used by the
//!   `memory` storage backend of the server)
//! - Fixtures for users and listings
//!
//! ## Example
//!
//! ```
//! use chaingo_testing::{test_clock, InMemoryListingStore};
//! use chaingo_testing::fixtures::new_listing;
//! use chaingo_core::{Clock, ListingStore};
//!
//! # async fn example() -> chaingo_core::Result<()> {
//! let clock = test_clock();
//! let store = InMemoryListingStore::new();
//! let listing = store.create(new_listing("bob", "Camera"), clock.now()).await?;
//! assert!(!listing.is_sold());
//! # Ok(())
//! # }
//! ```

pub mod fixtures;
pub mod stores;

use chaingo_core::Clock;
use chrono::{DateTime, Duration, Utc};
use std::sync::{Arc, PoisonError, RwLock};

/// Mock implementations of environment traits.
pub mod mocks {
    use super::{Arc, Clock, DateTime, Duration, PoisonError, RwLock, Utc};

    /// Fixed clock for deterministic tests
    ///
    /// Returns the same time until moved with [`FixedClock::advance`] or
    /// [`FixedClock::set`]. Clones share the same time.
    ///
    /// # Example
    ///
    /// ```
    /// use chaingo_testing::mocks::FixedClock;
    /// use chaingo_core::Clock;
    /// use chrono::{Duration, Utc};
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// let time1 = clock.now();
    /// assert_eq!(time1, clock.now());
    ///
    /// clock.advance(Duration::seconds(5));
    /// assert_eq!(clock.now() - time1, Duration::seconds(5));
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: Arc<RwLock<DateTime<Utc>>>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub fn new(time: DateTime<Utc>) -> Self {
            Self {
                time: Arc::new(RwLock::new(time)),
            }
        }

        /// Move the clock forward by `by`
        pub fn advance(&self, by: Duration) {
            let mut time = self.time.write().unwrap_or_else(PoisonError::into_inner);
            *time += by;
        }

        /// Jump to `time`
        pub fn set(&self, time: DateTime<Utc>) {
            *self.time.write().unwrap_or_else(PoisonError::into_inner) = time;
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            *self.time.read().unwrap_or_else(PoisonError::into_inner)
        }
    }

    /// Create a default fixed clock for tests (2025-01-01 00:00:00 UTC)
    #[must_use]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(DateTime::<Utc>::UNIX_EPOCH + Duration::seconds(1_735_689_600))
    }
}

// Re-export commonly used items
pub use mocks::{FixedClock, test_clock};
pub use stores::{InMemoryIdentityStore, InMemoryListingStore, InMemoryWalletCodeStore};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_clock() {
        let clock = test_clock();
        let time1 = clock.now();
        let time2 = clock.now();
        assert_eq!(time1, time2);
        assert_eq!(time1.to_rfc3339(), "2025-01-01T00:00:00+00:00");
    }

    #[test]
    fn test_clones_share_time() {
        let clock = test_clock();
        let shared = clock.clone();
        clock.advance(Duration::minutes(1));
        assert_eq!(shared.now(), clock.now());
    }
}
