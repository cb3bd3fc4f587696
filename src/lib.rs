//! Headless storefront client.
//!
//! Client-side state stores for a mobile storefront: an offline shopping
//! cart with debounced local persistence, a server-synchronized wishlist
//! with optimistic rollback, and an applied-discount holder. The stores own
//! no server data; they consume the remote storefront API and a local
//! key-value persistence port, both injected, and emit change events for
//! UI layers to consume.

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

pub mod api;
pub mod auth;
pub mod config;
pub mod errors;
pub mod events;
pub mod models;
pub mod storage;
pub mod stores;

pub use errors::{StoreError, StoreResult};

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

/// One instance of each store wired to shared collaborators, mirroring what
/// an app shell constructs at startup.
pub struct StorefrontClient {
    pub auth: auth::AuthTokenStore,
    pub cart: Arc<stores::CartStore>,
    pub wishlist: Arc<stores::WishlistStore>,
    pub offers: Arc<stores::OffersStore>,
}

impl StorefrontClient {
    /// Wires the stores from configuration, returning the client and the
    /// event stream the UI should consume. Storage is file-backed when a
    /// data directory is configured, in-memory otherwise.
    pub fn from_config(
        config: &config::StorefrontConfig,
    ) -> StoreResult<(Self, mpsc::Receiver<events::Event>)> {
        let auth = auth::AuthTokenStore::new();
        let api: Arc<dyn api::StorefrontApi> =
            Arc::new(api::HttpStorefrontApi::new(config, auth.clone())?);
        let storage: Arc<dyn storage::KeyValueStore> = match &config.storage.data_dir {
            Some(dir) => Arc::new(storage::FileStore::new(dir)),
            None => Arc::new(storage::InMemoryStore::new()),
        };

        let (event_sender, events) = events::EventSender::channel(64);
        let event_sender = Arc::new(event_sender);

        let cart = Arc::new(stores::CartStore::new(
            storage,
            Arc::clone(&event_sender),
            config.storage.cart_key_prefix.clone(),
            Duration::from_millis(config.storage.debounce_ms),
        ));
        let wishlist = Arc::new(stores::WishlistStore::new(api, Arc::clone(&event_sender)));
        let offers = Arc::new(stores::OffersStore::new());

        Ok((
            Self {
                auth,
                cart,
                wishlist,
                offers,
            },
            events,
        ))
    }
}
