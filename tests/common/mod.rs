#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use storefront_client::api::{
    CouponValidation, OfferValidation, StorefrontApi, WishlistItemRecord, WishlistRecord,
};
use storefront_client::errors::{StoreError, StoreResult};
use storefront_client::events::EventSender;
use storefront_client::models::{DiscountType, ProductListing};
use storefront_client::storage::{InMemoryStore, KeyValueStore};
use uuid::Uuid;

pub fn listing(id: u128, price: Decimal, list_price: Decimal) -> ProductListing {
    ProductListing {
        id: Uuid::from_u128(id),
        name: format!("Listing {id}"),
        slug: format!("listing-{id}"),
        price,
        list_price,
        image_url: Some(format!("https://cdn.example.com/{id}.jpg")),
        brand_id: None,
        category_id: None,
        variant_label: None,
        stock: 50,
        purchase_limit: 10,
    }
}

pub fn event_sender() -> Arc<EventSender> {
    let (sender, _receiver) = EventSender::channel(64);
    Arc::new(sender)
}

/// Key-value store that counts writes and can be told to fail them.
#[derive(Default)]
pub struct CountingStore {
    inner: InMemoryStore,
    pub writes: AtomicUsize,
    pub fail_writes: AtomicBool,
}

impl CountingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub async fn stored(&self, key: &str) -> Option<String> {
        self.inner.get(key).await.unwrap()
    }

    pub async fn seed(&self, key: &str, value: &str) {
        self.inner.set(key, value).await.unwrap();
    }
}

#[async_trait]
impl KeyValueStore for CountingStore {
    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Persistence("disk full".to_string()));
        }
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.set(key, value).await
    }

    async fn remove(&self, key: &str) -> StoreResult<()> {
        self.inner.remove(key).await
    }
}

/// Scripted in-memory storefront API with call counters and failure
/// switches, standing in for the HTTP implementation.
pub struct FakeApi {
    pub wishlist_id: Uuid,
    has_wishlist: AtomicBool,
    items: Mutex<Vec<WishlistItemRecord>>,
    pub fail_deletes: AtomicBool,
    pub fetch_wishlist_calls: AtomicUsize,
    pub create_wishlist_calls: AtomicUsize,
    pub create_item_calls: AtomicUsize,
    pub delete_calls: AtomicUsize,
}

impl FakeApi {
    pub fn new() -> Self {
        Self {
            wishlist_id: Uuid::from_u128(1000),
            has_wishlist: AtomicBool::new(false),
            items: Mutex::new(Vec::new()),
            fail_deletes: AtomicBool::new(false),
            fetch_wishlist_calls: AtomicUsize::new(0),
            create_wishlist_calls: AtomicUsize::new(0),
            create_item_calls: AtomicUsize::new(0),
            delete_calls: AtomicUsize::new(0),
        }
    }

    pub fn with_existing_wishlist() -> Self {
        let api = Self::new();
        api.has_wishlist.store(true, Ordering::SeqCst);
        api
    }

    pub fn set_fail_deletes(&self, fail: bool) {
        self.fail_deletes.store(fail, Ordering::SeqCst);
    }

    pub fn remote_item_count(&self) -> usize {
        self.items.lock().unwrap().len()
    }

    fn record(&self, user_id: Uuid) -> WishlistRecord {
        WishlistRecord {
            id: self.wishlist_id,
            user_id,
            estore_id: Uuid::nil(),
        }
    }
}

impl Default for FakeApi {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StorefrontApi for FakeApi {
    async fn fetch_wishlist(&self, user_id: Uuid) -> StoreResult<Option<WishlistRecord>> {
        self.fetch_wishlist_calls.fetch_add(1, Ordering::SeqCst);
        if self.has_wishlist.load(Ordering::SeqCst) {
            Ok(Some(self.record(user_id)))
        } else {
            Ok(None)
        }
    }

    async fn create_wishlist(&self, user_id: Uuid) -> StoreResult<WishlistRecord> {
        self.create_wishlist_calls.fetch_add(1, Ordering::SeqCst);
        self.has_wishlist.store(true, Ordering::SeqCst);
        Ok(self.record(user_id))
    }

    async fn fetch_wishlist_items(
        &self,
        _wishlist_id: Uuid,
    ) -> StoreResult<Vec<WishlistItemRecord>> {
        Ok(self.items.lock().unwrap().clone())
    }

    async fn create_wishlist_item(
        &self,
        wishlist_id: Uuid,
        product_listing_id: Uuid,
    ) -> StoreResult<WishlistItemRecord> {
        self.create_item_calls.fetch_add(1, Ordering::SeqCst);
        let record = WishlistItemRecord {
            id: Uuid::new_v4(),
            wishlist_id,
            product_listing_id,
            product_listing: None,
        };
        self.items.lock().unwrap().push(record.clone());
        Ok(record)
    }

    async fn delete_wishlist_item(&self, item_id: Uuid) -> StoreResult<()> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(StoreError::ExternalApi("server unavailable".to_string()));
        }
        self.items.lock().unwrap().retain(|i| i.id != item_id);
        Ok(())
    }

    async fn validate_coupon(
        &self,
        code: &str,
        _cart_value: Decimal,
    ) -> StoreResult<CouponValidation> {
        Ok(CouponValidation {
            code: code.to_string(),
            discount_type: DiscountType::Fixed,
            discount: dec!(10),
        })
    }

    async fn validate_offer(
        &self,
        offer_id: Uuid,
        _product_ids: &[Uuid],
        _quantities: &[u32],
    ) -> StoreResult<OfferValidation> {
        Ok(OfferValidation {
            id: offer_id,
            name: "Bundle deal".to_string(),
            discount_type: DiscountType::Percentage,
            discount: dec!(5),
        })
    }
}
