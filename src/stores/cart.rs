use std::sync::{Arc, RwLock};
use std::time::Duration;

use chrono::Utc;
use rust_decimal::Decimal;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::errors::StoreResult;
use crate::events::{Event, EventSender};
use crate::models::{CartLineItem, ProductListing, StorageScope};
use crate::storage::{DebouncedWriter, KeyValueStore};

/// In-memory cart collection. Pure mutations over an ordered item list;
/// persistence and events are handled by the owning [`CartStore`].
#[derive(Debug, Clone, Default)]
pub struct CartState {
    items: Vec<CartLineItem>,
}

impl CartState {
    /// Increments the quantity when the listing is already present,
    /// inserts a new line item otherwise. A zero quantity is treated as
    /// one, so no line item ever holds a quantity below one. Returns the
    /// resulting quantity.
    pub fn add(&mut self, listing: ProductListing, quantity: u32) -> u32 {
        let quantity = quantity.max(1);
        if let Some(item) = self.items.iter_mut().find(|i| i.listing.id == listing.id) {
            item.quantity = item.quantity.saturating_add(quantity);
            item.quantity
        } else {
            self.items.push(CartLineItem {
                listing,
                quantity,
                added_at: Utc::now(),
            });
            quantity
        }
    }

    /// Replaces the quantity of a line item; zero removes it. Returns
    /// whether anything changed.
    pub fn update_quantity(&mut self, listing_id: Uuid, quantity: u32) -> bool {
        if quantity == 0 {
            return self.remove(listing_id);
        }
        match self.items.iter_mut().find(|i| i.listing.id == listing_id) {
            Some(item) => {
                item.quantity = quantity;
                true
            }
            None => false,
        }
    }

    /// Removes a line item. Returns whether it was present.
    pub fn remove(&mut self, listing_id: Uuid) -> bool {
        let before = self.items.len();
        self.items.retain(|i| i.listing.id != listing_id);
        self.items.len() != before
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn set_items(&mut self, items: Vec<CartLineItem>) {
        self.items = items;
    }

    pub fn total(&self) -> Decimal {
        self.items.iter().map(CartLineItem::line_total).sum()
    }

    pub fn savings(&self) -> Decimal {
        self.items.iter().map(CartLineItem::line_savings).sum()
    }

    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    pub fn contains(&self, listing_id: Uuid) -> bool {
        self.items.iter().any(|i| i.listing.id == listing_id)
    }

    pub fn quantity_of(&self, listing_id: Uuid) -> Option<u32> {
        self.items
            .iter()
            .find(|i| i.listing.id == listing_id)
            .map(|i| i.quantity)
    }

    pub fn items(&self) -> &[CartLineItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// The authoritative client-side shopping cart for the active scope.
///
/// Mutations apply instantly in memory and are never rejected; persistence
/// is an asynchronous, debounced side effect against the injected
/// [`KeyValueStore`]. Persistence failures are logged and recorded in
/// [`CartStore::last_error`], never rolled back: local storage is a
/// best-effort cache, the in-memory state stays authoritative for the
/// session.
pub struct CartStore {
    state: RwLock<CartState>,
    scope: RwLock<StorageScope>,
    loaded_for: RwLock<Option<StorageScope>>,
    storage: Arc<dyn KeyValueStore>,
    writer: DebouncedWriter,
    key_prefix: String,
    event_sender: Arc<EventSender>,
}

impl CartStore {
    pub fn new(
        storage: Arc<dyn KeyValueStore>,
        event_sender: Arc<EventSender>,
        key_prefix: impl Into<String>,
        debounce: Duration,
    ) -> Self {
        Self {
            state: RwLock::new(CartState::default()),
            scope: RwLock::new(StorageScope::Anonymous),
            loaded_for: RwLock::new(None),
            storage: Arc::clone(&storage),
            writer: DebouncedWriter::new(storage, debounce),
            key_prefix: key_prefix.into(),
            event_sender,
        }
    }

    /// Loads the persisted collection for `scope` exactly once. Calling it
    /// again for the already-loaded scope is a no-op; calling it with a
    /// different scope (login/logout) resets the in-memory state and loads
    /// the new partition. No remote fetch happens here: the cart is a
    /// purely local concept.
    ///
    /// A missing snapshot starts an empty cart; an unreadable one is
    /// discarded with the failure recorded in [`CartStore::last_error`].
    #[instrument(skip(self))]
    pub async fn initialize(&self, scope: StorageScope) {
        if *self.loaded_for.read().unwrap() == Some(scope) {
            debug!("cart already initialized for this scope");
            return;
        }
        self.writer.cancel();

        let key = scope.storage_key(&self.key_prefix);
        let items = match self.storage.get(&key).await {
            Ok(Some(snapshot)) => match serde_json::from_str::<Vec<CartLineItem>>(&snapshot) {
                Ok(items) => items,
                Err(err) => {
                    warn!(%key, error = %err, "discarding unreadable cart snapshot");
                    self.writer.record_error(err.to_string());
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(err) => {
                warn!(%key, error = %err, "failed to load cart snapshot");
                self.writer.record_error(err.to_string());
                Vec::new()
            }
        };

        let count = items.len();
        self.state.write().unwrap().set_items(items);
        *self.scope.write().unwrap() = scope;
        *self.loaded_for.write().unwrap() = Some(scope);
        info!(%key, items = count, "cart initialized");
    }

    /// Adds `quantity` of the listing, merging into an existing line item
    /// when present. Always succeeds; stock limits are advisory and live in
    /// [`ProductListing::max_purchasable`]. Schedules a debounced save.
    #[instrument(skip(self, listing), fields(listing_id = %listing.id))]
    pub async fn add_to_cart(&self, listing: ProductListing, quantity: u32) {
        let listing_id = listing.id;
        let new_quantity = self.state.write().unwrap().add(listing, quantity);
        self.schedule_save();
        self.event_sender
            .send_or_log(Event::CartItemAdded {
                listing_id,
                quantity: new_quantity,
            })
            .await;
        info!(%listing_id, quantity = new_quantity, "added listing to cart");
    }

    /// Replaces a line item's quantity; zero delegates to removal. A
    /// missing listing is a no-op. Schedules a debounced save.
    #[instrument(skip(self))]
    pub async fn update_quantity(&self, listing_id: Uuid, quantity: u32) {
        if quantity == 0 {
            self.remove_from_cart(listing_id).await;
            return;
        }
        if !self.state.write().unwrap().update_quantity(listing_id, quantity) {
            debug!(%listing_id, "quantity update for listing not in cart");
            return;
        }
        self.schedule_save();
        self.event_sender
            .send_or_log(Event::CartQuantityChanged {
                listing_id,
                quantity,
            })
            .await;
    }

    /// Removes a line item; a missing listing is a no-op. Schedules a
    /// debounced save.
    #[instrument(skip(self))]
    pub async fn remove_from_cart(&self, listing_id: Uuid) {
        if !self.state.write().unwrap().remove(listing_id) {
            debug!(%listing_id, "removal for listing not in cart");
            return;
        }
        self.schedule_save();
        self.event_sender
            .send_or_log(Event::CartItemRemoved { listing_id })
            .await;
        info!(%listing_id, "removed listing from cart");
    }

    /// Empties the cart and persists immediately, not debounced, so a
    /// logout always leaves a clean slate behind.
    #[instrument(skip(self))]
    pub async fn clear_cart(&self) {
        self.state.write().unwrap().clear();
        let key = self.current_key();
        if let Err(err) = self.writer.flush(&key, "[]").await {
            warn!(%key, error = %err, "failed to persist cleared cart");
        }
        self.event_sender.send_or_log(Event::CartCleared).await;
        info!("cleared cart");
    }

    /// Cancels any pending debounced write and persists the current state
    /// now. The one cart operation with a synchronous persistence
    /// guarantee, for callers that need it (e.g. before backgrounding).
    pub async fn flush(&self) -> StoreResult<()> {
        let key = self.current_key();
        let snapshot = serde_json::to_string(self.state.read().unwrap().items())?;
        self.writer.flush(&key, &snapshot).await
    }

    pub fn total(&self) -> Decimal {
        self.state.read().unwrap().total()
    }

    pub fn savings(&self) -> Decimal {
        self.state.read().unwrap().savings()
    }

    pub fn item_count(&self) -> u32 {
        self.state.read().unwrap().item_count()
    }

    pub fn contains(&self, listing_id: Uuid) -> bool {
        self.state.read().unwrap().contains(listing_id)
    }

    pub fn quantity_of(&self, listing_id: Uuid) -> Option<u32> {
        self.state.read().unwrap().quantity_of(listing_id)
    }

    pub fn items(&self) -> Vec<CartLineItem> {
        self.state.read().unwrap().items().to_vec()
    }

    /// Last persistence failure, if any. In-memory state is unaffected by
    /// persistence failures.
    pub fn last_error(&self) -> Option<String> {
        self.writer.last_error()
    }

    fn current_key(&self) -> String {
        self.scope.read().unwrap().storage_key(&self.key_prefix)
    }

    fn schedule_save(&self) {
        let key = self.current_key();
        match serde_json::to_string(self.state.read().unwrap().items()) {
            Ok(snapshot) => self.writer.schedule(key, snapshot),
            Err(err) => {
                warn!(%key, error = %err, "failed to serialize cart snapshot");
                self.writer.record_error(err.to_string());
            }
        }
    }
}
