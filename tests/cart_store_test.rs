mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{event_sender, listing, CountingStore};
use rstest::rstest;
use rust_decimal_macros::dec;
use storefront_client::models::{CartLineItem, StorageScope};
use storefront_client::stores::CartStore;
use uuid::Uuid;

const PREFIX: &str = "guest_cart";
const DEBOUNCE: Duration = Duration::from_millis(500);

fn cart_with(storage: Arc<CountingStore>) -> CartStore {
    CartStore::new(storage, event_sender(), PREFIX, DEBOUNCE)
}

#[tokio::test]
async fn re_adding_a_listing_merges_quantities() {
    let storage = Arc::new(CountingStore::new());
    let cart = cart_with(storage);
    cart.initialize(StorageScope::Anonymous).await;

    let p1 = listing(1, dec!(100), dec!(100));
    cart.add_to_cart(p1.clone(), 1).await;
    cart.add_to_cart(p1.clone(), 1).await;

    assert_eq!(cart.items().len(), 1);
    assert_eq!(cart.quantity_of(p1.id), Some(2));
    assert_eq!(cart.total(), dec!(200));
}

#[tokio::test]
async fn update_quantity_to_zero_empties_the_cart() {
    let storage = Arc::new(CountingStore::new());
    let cart = cart_with(storage);
    cart.initialize(StorageScope::Anonymous).await;

    let p1 = listing(1, dec!(25), dec!(30));
    cart.add_to_cart(p1.clone(), 3).await;
    cart.update_quantity(p1.id, 0).await;

    assert!(cart.items().is_empty());
    assert_eq!(cart.item_count(), 0);
    assert_eq!(cart.total(), dec!(0));
}

#[rstest]
#[case(5, Some(5))]
#[case(1, Some(1))]
#[tokio::test]
async fn update_quantity_replaces_the_quantity(
    #[case] quantity: u32,
    #[case] expected: Option<u32>,
) {
    let storage = Arc::new(CountingStore::new());
    let cart = cart_with(storage);
    cart.initialize(StorageScope::Anonymous).await;

    let p1 = listing(1, dec!(25), dec!(30));
    cart.add_to_cart(p1.clone(), 3).await;
    cart.update_quantity(p1.id, quantity).await;

    assert_eq!(cart.quantity_of(p1.id), expected);
}

#[tokio::test]
async fn totals_and_savings_recompute_per_call() {
    let storage = Arc::new(CountingStore::new());
    let cart = cart_with(storage);
    cart.initialize(StorageScope::Anonymous).await;

    cart.add_to_cart(listing(1, dec!(100), dec!(120)), 2).await;
    cart.add_to_cart(listing(2, dec!(9.50), dec!(9.50)), 3).await;
    assert_eq!(cart.total(), dec!(228.50));
    assert_eq!(cart.savings(), dec!(40));
    assert_eq!(cart.item_count(), 5);

    cart.remove_from_cart(Uuid::from_u128(1)).await;
    assert_eq!(cart.total(), dec!(28.50));
    assert_eq!(cart.savings(), dec!(0));
}

#[tokio::test(start_paused = true)]
async fn rapid_mutations_coalesce_into_one_write() {
    let storage = Arc::new(CountingStore::new());
    let cart = cart_with(Arc::clone(&storage));
    cart.initialize(StorageScope::Anonymous).await;

    let p1 = listing(1, dec!(10), dec!(12));
    let p2 = listing(2, dec!(20), dec!(20));
    cart.add_to_cart(p1.clone(), 1).await;
    cart.add_to_cart(p2.clone(), 1).await;
    cart.update_quantity(p1.id, 4).await;
    cart.remove_from_cart(p2.id).await;
    cart.add_to_cart(p2.clone(), 2).await;

    assert_eq!(storage.write_count(), 0);
    tokio::time::sleep(DEBOUNCE + Duration::from_millis(100)).await;
    assert_eq!(storage.write_count(), 1);

    let persisted: Vec<CartLineItem> =
        serde_json::from_str(&storage.stored(PREFIX).await.unwrap()).unwrap();
    assert_eq!(persisted.len(), 2);
    assert_eq!(
        persisted.iter().find(|i| i.listing.id == p1.id).unwrap().quantity,
        4
    );
    assert_eq!(
        persisted.iter().find(|i| i.listing.id == p2.id).unwrap().quantity,
        2
    );
}

#[tokio::test(start_paused = true)]
async fn flush_cancels_the_pending_debounced_write() {
    let storage = Arc::new(CountingStore::new());
    let cart = cart_with(Arc::clone(&storage));
    cart.initialize(StorageScope::Anonymous).await;

    cart.add_to_cart(listing(1, dec!(10), dec!(10)), 1).await;
    cart.flush().await.unwrap();
    assert_eq!(storage.write_count(), 1);

    tokio::time::sleep(DEBOUNCE * 2).await;
    assert_eq!(storage.write_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn clear_cart_persists_immediately() {
    let storage = Arc::new(CountingStore::new());
    let cart = cart_with(Arc::clone(&storage));
    cart.initialize(StorageScope::Anonymous).await;

    cart.add_to_cart(listing(1, dec!(10), dec!(10)), 1).await;
    cart.clear_cart().await;

    // The pending debounced add was cancelled; only the clear wrote.
    assert_eq!(storage.write_count(), 1);
    assert_eq!(storage.stored(PREFIX).await.as_deref(), Some("[]"));

    tokio::time::sleep(DEBOUNCE * 2).await;
    assert_eq!(storage.write_count(), 1);
}

#[tokio::test]
async fn persistence_failure_keeps_in_memory_state() {
    let storage = Arc::new(CountingStore::new());
    let cart = cart_with(Arc::clone(&storage));
    cart.initialize(StorageScope::Anonymous).await;

    storage.set_fail_writes(true);
    let p1 = listing(1, dec!(10), dec!(10));
    cart.add_to_cart(p1.clone(), 2).await;

    assert!(cart.flush().await.is_err());
    // The optimistic mutation is never rolled back for storage failures.
    assert_eq!(cart.quantity_of(p1.id), Some(2));
    assert!(cart.last_error().is_some());

    storage.set_fail_writes(false);
    cart.flush().await.unwrap();
    assert!(cart.last_error().is_none());
}

#[tokio::test]
async fn initialize_loads_the_scope_partition() {
    let user_id = Uuid::from_u128(42);
    let storage = Arc::new(CountingStore::new());

    let seeded = serde_json::to_string(&vec![CartLineItem {
        listing: listing(1, dec!(10), dec!(12)),
        quantity: 2,
        added_at: chrono::Utc::now(),
    }])
    .unwrap();
    storage
        .seed(&StorageScope::User(user_id).storage_key(PREFIX), &seeded)
        .await;

    let cart = cart_with(Arc::clone(&storage));
    cart.initialize(StorageScope::User(user_id)).await;
    assert_eq!(cart.item_count(), 2);

    // Same scope again: idempotent, nothing re-read or reset.
    cart.add_to_cart(listing(2, dec!(5), dec!(5)), 1).await;
    cart.initialize(StorageScope::User(user_id)).await;
    assert_eq!(cart.items().len(), 2);

    // Logout: the anonymous partition is empty.
    cart.initialize(StorageScope::Anonymous).await;
    assert!(cart.items().is_empty());
}

#[tokio::test]
async fn initialize_discards_unreadable_snapshots() {
    let storage = Arc::new(CountingStore::new());
    storage.seed(PREFIX, "not json").await;

    let cart = cart_with(Arc::clone(&storage));
    cart.initialize(StorageScope::Anonymous).await;

    assert!(cart.items().is_empty());
    assert!(cart.last_error().is_some());
}
