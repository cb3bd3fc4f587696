use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::warn;
use uuid::Uuid;

/// State-change notifications emitted by the stores after successful
/// mutations. UI layers consume these to refresh derived views (badges,
/// cart counters) without polling the stores.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    // Cart events
    CartItemAdded { listing_id: Uuid, quantity: u32 },
    CartQuantityChanged { listing_id: Uuid, quantity: u32 },
    CartItemRemoved { listing_id: Uuid },
    CartCleared,

    // Wishlist events
    WishlistItemAdded { listing_id: Uuid },
    WishlistItemRemoved { listing_id: Uuid },
    WishlistCleared,
}

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Creates a bounded channel and the sender half wired to it.
    pub fn channel(buffer: usize) -> (Self, mpsc::Receiver<Event>) {
        let (sender, receiver) = mpsc::channel(buffer);
        (Self::new(sender), receiver)
    }

    /// Sends an event, erroring when the receiver is gone. Stores use
    /// [`EventSender::send_or_log`] instead; this is for callers that need
    /// to know delivery failed.
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }

    /// Sends an event, logging instead of failing when nothing is
    /// listening. Store mutations never fail because of a missing consumer.
    pub async fn send_or_log(&self, event: Event) {
        if let Err(err) = self.send(event).await {
            warn!("event dropped: {}", err);
        }
    }
}
