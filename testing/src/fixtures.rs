//! Builders for common test data.

use chaingo_core::{IdentityStore, NewListing, NewUser, Price, Result, User};
use chrono::{DateTime, Utc};

/// A valid listing request owned by `owner` with a 10.00 price and two images.
#[must_use]
pub fn new_listing(owner: &str, title: &str) -> NewListing {
    NewListing {
        title: title.to_string(),
        description: format!("{title} in good condition"),
        price: Price::from_cents(1_000).ok(),
        category: Some("electronics".to_string()),
        location: None,
        item_condition: None,
        owner_username: owner.to_string(),
        image_refs: vec![format!("{title}-1.png"), format!("{title}-2.png")],
    }
}

/// Register `username` with wallet `W-<username>`.
///
/// # Errors
///
/// Propagates the store's error (for example `Conflict` on a duplicate).
pub async fn register_user(
    store: &dyn IdentityStore,
    username: &str,
    created_at: DateTime<Utc>,
) -> Result<User> {
    let new_user = NewUser::new(&format!("{username} tester"), username, &wallet_for(username))?;
    store.register(new_user, created_at).await
}

/// Wallet address used by [`register_user`] for `username`.
#[must_use]
pub fn wallet_for(username: &str) -> String {
    format!("W-{username}")
}
