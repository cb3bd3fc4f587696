use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::KeyValueStore;
use crate::errors::StoreResult;

/// Coalesces rapid successive writes into one storage write per debounce
/// window. Each new schedule aborts the still-pending task, so the last
/// snapshot scheduled before the timer fires is what gets persisted.
///
/// Failures never propagate to the scheduler: they are logged and recorded
/// in an error cell the owning store exposes, and the in-memory state is
/// kept as-is.
pub struct DebouncedWriter {
    store: Arc<dyn KeyValueStore>,
    delay: Duration,
    pending: Mutex<Option<JoinHandle<()>>>,
    last_error: Arc<RwLock<Option<String>>>,
}

impl DebouncedWriter {
    pub fn new(store: Arc<dyn KeyValueStore>, delay: Duration) -> Self {
        Self {
            store,
            delay,
            pending: Mutex::new(None),
            last_error: Arc::new(RwLock::new(None)),
        }
    }

    /// Schedules `value` to be written to `key` after the debounce delay,
    /// replacing any write still pending.
    pub fn schedule(&self, key: String, value: String) {
        self.cancel();

        let store = Arc::clone(&self.store);
        let delay = self.delay;
        let last_error = Arc::clone(&self.last_error);
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            match store.set(&key, &value).await {
                Ok(()) => {
                    debug!(%key, "debounced write flushed");
                    *last_error.write().unwrap() = None;
                }
                Err(err) => {
                    warn!(%key, error = %err, "debounced write failed");
                    *last_error.write().unwrap() = Some(err.to_string());
                }
            }
        });
        *self.pending.lock().unwrap() = Some(handle);
    }

    /// Cancels any pending write and persists `value` immediately.
    pub async fn flush(&self, key: &str, value: &str) -> StoreResult<()> {
        self.cancel();
        let result = self.store.set(key, value).await;
        *self.last_error.write().unwrap() = result.as_ref().err().map(ToString::to_string);
        result
    }

    /// Drops the pending write, if any, without persisting.
    pub fn cancel(&self) {
        if let Some(handle) = self.pending.lock().unwrap().take() {
            handle.abort();
        }
    }

    /// Records a persistence-adjacent failure in the same error cell the
    /// write path uses.
    pub fn record_error(&self, message: String) {
        *self.last_error.write().unwrap() = Some(message);
    }

    /// Last persistence failure, cleared by the next successful write.
    pub fn last_error(&self) -> Option<String> {
        self.last_error.read().unwrap().clone()
    }
}
