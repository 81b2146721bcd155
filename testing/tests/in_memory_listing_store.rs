//! Behavioural tests for `InMemoryListingStore`.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use chaingo_core::{Clock, ListingId, ListingStore, MarketError, PageRequest, Sale};
use chaingo_testing::fixtures::new_listing;
use chaingo_testing::{InMemoryListingStore, test_clock};
use chrono::Duration;
use std::sync::Arc;

#[tokio::test]
async fn create_then_get_preserves_image_order() {
    let store = InMemoryListingStore::new();
    let mut request = new_listing("bob", "lamp");
    request.image_refs = vec!["c.png".into(), "a.png".into(), "b.png".into()];

    let created = store.create(request, test_clock().now()).await.unwrap();
    let fetched = store.get(created.id).await.unwrap().expect("listing exists");

    assert_eq!(fetched.image_refs, vec!["c.png", "a.png", "b.png"]);
    assert!(!fetched.is_sold());
    assert_eq!(fetched.buyer_username(), None);
    assert_eq!(fetched.sold_at(), None);
}

#[tokio::test]
async fn delete_requires_ownership() {
    let store = InMemoryListingStore::new();
    let listing = store
        .create(new_listing("bob", "desk"), test_clock().now())
        .await
        .unwrap();

    let by_alice = store.delete_owned(listing.id, "alice".into()).await;
    assert_eq!(by_alice, Err(MarketError::NotFoundOrForbidden));
    assert!(store.get(listing.id).await.unwrap().is_some());

    let deleted = store.delete_owned(listing.id, "bob".into()).await.unwrap();
    assert_eq!(deleted, listing);
    assert!(store.get(listing.id).await.unwrap().is_none());

    let missing = store.delete_owned(ListingId::new(999), "bob".into()).await;
    assert_eq!(missing, Err(MarketError::NotFoundOrForbidden));
}

#[tokio::test]
async fn list_active_second_page_of_twenty_five() {
    let store = InMemoryListingStore::new();
    let clock = test_clock();

    let mut created = Vec::new();
    for i in 0..25 {
        clock.advance(Duration::seconds(1));
        created.push(
            store
                .create(new_listing("bob", &format!("item-{i}")), clock.now())
                .await
                .unwrap(),
        );
    }
    // Newest first: item-24 .. item-0
    created.reverse();

    let page = store
        .list_active(PageRequest { page: 2, page_size: 10 })
        .await
        .unwrap();

    assert_eq!(page.total_items, 25);
    assert_eq!(page.total_pages, 3);
    let ids: Vec<_> = page.items.iter().map(|l| l.id).collect();
    let expected: Vec<_> = created[10..20].iter().map(|l| l.id).collect();
    assert_eq!(ids, expected);
}

#[tokio::test]
async fn sold_listings_leave_active_and_enter_purchases() {
    let store = InMemoryListingStore::new();
    let clock = test_clock();

    let first = store.create(new_listing("bob", "a"), clock.now()).await.unwrap();
    let second = store.create(new_listing("bob", "b"), clock.now()).await.unwrap();
    store.create(new_listing("bob", "c"), clock.now()).await.unwrap();

    clock.advance(Duration::minutes(1));
    store
        .mark_sold(second.id, Sale::new("alice", "0x2", clock.now()).unwrap())
        .await
        .unwrap();
    clock.advance(Duration::minutes(1));
    store
        .mark_sold(first.id, Sale::new("alice", "0x1", clock.now()).unwrap())
        .await
        .unwrap();

    let active = store.list_active(PageRequest::default()).await.unwrap();
    assert_eq!(active.total_items, 1);
    assert!(active.items.iter().all(|l| !l.is_sold()));

    let purchases = store.list_purchases("alice".into()).await.unwrap();
    let ids: Vec<_> = purchases.iter().map(|l| l.id).collect();
    assert_eq!(ids, vec![first.id, second.id]);
    assert!(purchases
        .iter()
        .all(|l| l.is_sold() && l.buyer_username().is_some() && l.sold_at().is_some()));

    assert!(store.list_purchases("bob".into()).await.unwrap().is_empty());
}

#[tokio::test]
async fn mark_sold_is_exactly_once_under_contention() {
    let store = Arc::new(InMemoryListingStore::new());
    let clock = test_clock();
    let listing = store.create(new_listing("bob", "bike"), clock.now()).await.unwrap();
    let id = listing.id;

    let attempts = (0..16).map(|i| {
        let store = Arc::clone(&store);
        let sale = Sale::new(&format!("buyer{i}"), &format!("0x{i}"), clock.now()).unwrap();
        tokio::spawn(async move { store.mark_sold(id, sale).await })
    });
    let results = futures::future::join_all(attempts).await;

    let successes = results.iter().filter(|r| matches!(r, Ok(Ok(_)))).count();
    let unavailable = results
        .iter()
        .filter(|r| matches!(r, Ok(Err(MarketError::NotAvailable))))
        .count();
    assert_eq!(successes, 1);
    assert_eq!(unavailable, 15);

    let sold = store.get(id).await.unwrap().unwrap();
    let winner = results
        .into_iter()
        .find_map(|r| r.ok().and_then(Result::ok))
        .unwrap();
    assert_eq!(sold.buyer_username(), winner.buyer_username());
}
