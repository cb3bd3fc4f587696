//! Client-side state stores. Each store owns its state exclusively; UI
//! layers hold no independent copies, only read snapshots and the event
//! stream.

use std::future::Future;
use std::sync::RwLock;

use crate::errors::StoreResult;

pub mod cart;
pub mod offers;
pub mod wishlist;

pub use cart::CartStore;
pub use offers::OffersStore;
pub use wishlist::WishlistStore;

/// Optimistic mutation with rollback: snapshot the current state, apply the
/// local mutation, run the remote side effect, and restore the snapshot
/// when the side effect fails. Every rolling-back operation goes through
/// here so the restore behavior cannot drift between call sites.
///
/// The lock is released before the side effect is awaited.
pub(crate) async fn with_rollback<S, M, F, Fut, T>(
    state: &RwLock<S>,
    mutate: M,
    side_effect: F,
) -> StoreResult<T>
where
    S: Clone,
    M: FnOnce(&mut S),
    F: FnOnce() -> Fut,
    Fut: Future<Output = StoreResult<T>>,
{
    let snapshot = {
        let mut guard = state.write().unwrap();
        let snapshot = guard.clone();
        mutate(&mut guard);
        snapshot
    };
    match side_effect().await {
        Ok(value) => Ok(value),
        Err(err) => {
            *state.write().unwrap() = snapshot;
            Err(err)
        }
    }
}
