use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use futures::future::join_all;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use super::with_rollback;
use crate::api::StorefrontApi;
use crate::errors::{StoreError, StoreResult};
use crate::events::{Event, EventSender};
use crate::models::{ProductListing, WishlistItem};

/// Item collection plus the derived membership set. The two are only ever
/// mutated together, so the set always equals the listing ids across the
/// items.
#[derive(Debug, Clone, Default)]
struct WishlistState {
    wishlist_id: Option<Uuid>,
    items: Vec<WishlistItem>,
    member_ids: HashSet<Uuid>,
}

/// Outcome of [`WishlistStore::toggle_wishlist`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WishlistToggle {
    Added,
    Removed,
}

/// Per-user wishlist synchronized with the remote API.
///
/// Removal is optimistic with rollback on confirmed failure; addition is
/// reflected only after server confirmation. All mutating operations are
/// serialized by one store-wide busy flag: a second concurrent mutation
/// fails fast with [`StoreError::OperationInProgress`] instead of racing
/// the first. That serializes unrelated toggles on different listings too,
/// an accepted latency cost given the UI issues one tap at a time.
pub struct WishlistStore {
    state: RwLock<WishlistState>,
    api: Arc<dyn StorefrontApi>,
    event_sender: Arc<EventSender>,
    busy: AtomicBool,
}

/// RAII release for the store-wide busy flag.
struct BusyGuard<'a>(&'a AtomicBool);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl WishlistStore {
    pub fn new(api: Arc<dyn StorefrontApi>, event_sender: Arc<EventSender>) -> Self {
        Self {
            state: RwLock::new(WishlistState::default()),
            api,
            event_sender,
            busy: AtomicBool::new(false),
        }
    }

    fn acquire(&self) -> StoreResult<BusyGuard<'_>> {
        if self
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
        {
            Ok(BusyGuard(&self.busy))
        } else {
            Err(StoreError::OperationInProgress)
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.state.read().unwrap().wishlist_id.is_some()
    }

    /// O(1) membership check; the primary read used by product cards.
    pub fn is_in_wishlist(&self, listing_id: Uuid) -> bool {
        self.state.read().unwrap().member_ids.contains(&listing_id)
    }

    pub fn items(&self) -> Vec<WishlistItem> {
        self.state.read().unwrap().items.clone()
    }

    pub fn item_ids(&self) -> HashSet<Uuid> {
        self.state.read().unwrap().member_ids.clone()
    }

    /// Idempotent get-or-create initialization: fetches the user's
    /// wishlist, creates one when none exists, then loads all items. A
    /// no-op once the wishlist id is known.
    #[instrument(skip(self))]
    pub async fn ensure_initialized(&self, user_id: Uuid) -> StoreResult<()> {
        if self.is_initialized() {
            debug!("wishlist already initialized");
            return Ok(());
        }
        let _guard = self.acquire()?;
        // Re-check after winning the guard; a concurrent call may have
        // finished the job while we waited.
        if self.is_initialized() {
            return Ok(());
        }

        let record = match self.api.fetch_wishlist(user_id).await? {
            Some(record) => record,
            None => self.api.create_wishlist(user_id).await?,
        };
        let items: Vec<WishlistItem> = self
            .api
            .fetch_wishlist_items(record.id)
            .await?
            .into_iter()
            .map(|r| WishlistItem {
                id: r.id,
                wishlist_id: r.wishlist_id,
                product_listing_id: r.product_listing_id,
                listing: r.product_listing,
            })
            .collect();
        let member_ids: HashSet<Uuid> = items.iter().map(|i| i.product_listing_id).collect();
        let count = items.len();

        let mut state = self.state.write().unwrap();
        state.wishlist_id = Some(record.id);
        state.member_ids = member_ids;
        state.items = items;
        info!(wishlist_id = %record.id, items = count, "wishlist initialized");
        Ok(())
    }

    /// Adds a listing to the wishlist. An already-present listing is always
    /// a typed error, returned before any network call. The item appears
    /// locally only after server confirmation; there is no optimistic
    /// pre-insert for add.
    #[instrument(skip(self, listing), fields(listing_id = %listing.id))]
    pub async fn add_to_wishlist(&self, listing: ProductListing) -> StoreResult<WishlistItem> {
        let _guard = self.acquire()?;
        let wishlist_id = self
            .state
            .read()
            .unwrap()
            .wishlist_id
            .ok_or(StoreError::NotInitialized)?;
        if self.is_in_wishlist(listing.id) {
            return Err(StoreError::AlreadyInWishlist(listing.id));
        }

        let record = self.api.create_wishlist_item(wishlist_id, listing.id).await?;
        let item = WishlistItem {
            id: record.id,
            wishlist_id: record.wishlist_id,
            product_listing_id: record.product_listing_id,
            // Prefer the server's snapshot, fall back to the one we hold.
            listing: record.product_listing.or(Some(listing)),
        };
        {
            let mut state = self.state.write().unwrap();
            state.member_ids.insert(item.product_listing_id);
            state.items.push(item.clone());
        }
        self.event_sender
            .send_or_log(Event::WishlistItemAdded {
                listing_id: item.product_listing_id,
            })
            .await;
        info!(listing_id = %item.product_listing_id, "added listing to wishlist");
        Ok(item)
    }

    /// Removes a listing: optimistically drops it from both the item
    /// collection and the membership set, then issues the remote delete.
    /// On failure both are restored to their exact pre-call state.
    #[instrument(skip(self))]
    pub async fn remove_from_wishlist(&self, listing_id: Uuid) -> StoreResult<()> {
        let _guard = self.acquire()?;
        if !self.is_initialized() {
            return Err(StoreError::NotInitialized);
        }
        let item_id = self
            .state
            .read()
            .unwrap()
            .items
            .iter()
            .find(|i| i.product_listing_id == listing_id)
            .map(|i| i.id)
            .ok_or(StoreError::NotInWishlist(listing_id))?;

        let api = Arc::clone(&self.api);
        with_rollback(
            &self.state,
            |state| {
                state.items.retain(|i| i.id != item_id);
                state.member_ids.remove(&listing_id);
            },
            || async move { api.delete_wishlist_item(item_id).await },
        )
        .await?;

        self.event_sender
            .send_or_log(Event::WishlistItemRemoved { listing_id })
            .await;
        info!(%listing_id, "removed listing from wishlist");
        Ok(())
    }

    /// Adds or removes based on current membership. Requires the store to
    /// be initialized.
    pub async fn toggle_wishlist(&self, listing: ProductListing) -> StoreResult<WishlistToggle> {
        if !self.is_initialized() {
            return Err(StoreError::NotInitialized);
        }
        if self.is_in_wishlist(listing.id) {
            self.remove_from_wishlist(listing.id).await?;
            Ok(WishlistToggle::Removed)
        } else {
            self.add_to_wishlist(listing).await?;
            Ok(WishlistToggle::Added)
        }
    }

    /// Optimistically empties the wishlist and deletes every item remotely,
    /// in parallel. Any failed delete restores the full pre-clear snapshot;
    /// partial success is not distinguished from total failure.
    #[instrument(skip(self))]
    pub async fn clear_all_items(&self) -> StoreResult<()> {
        let _guard = self.acquire()?;
        if !self.is_initialized() {
            return Err(StoreError::NotInitialized);
        }
        let item_ids: Vec<Uuid> = self
            .state
            .read()
            .unwrap()
            .items
            .iter()
            .map(|i| i.id)
            .collect();
        if item_ids.is_empty() {
            return Ok(());
        }

        let api = Arc::clone(&self.api);
        with_rollback(
            &self.state,
            |state| {
                state.items.clear();
                state.member_ids.clear();
            },
            || async move {
                let results =
                    join_all(item_ids.iter().map(|id| api.delete_wishlist_item(*id))).await;
                if results.iter().any(|r| r.is_err()) {
                    return Err(StoreError::ExternalApi(
                        "failed to clear all wishlist items".to_string(),
                    ));
                }
                Ok(())
            },
        )
        .await?;

        self.event_sender.send_or_log(Event::WishlistCleared).await;
        info!("cleared all wishlist items");
        Ok(())
    }

    /// Local-only reset of items, membership set, and wishlist id. Used on
    /// logout; performs no remote call.
    pub fn clear_local(&self) {
        *self.state.write().unwrap() = WishlistState::default();
        info!("wishlist state cleared");
    }
}
