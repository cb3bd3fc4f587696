use thiserror::Error;
use uuid::Uuid;

pub type StoreResult<T> = Result<T, StoreError>;

/// Errors surfaced by the stores. Nothing panics past the store boundary:
/// every async operation resolves to a [`StoreResult`] and callers decide
/// how to present failures.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Listing {0} is already in the wishlist")]
    AlreadyInWishlist(Uuid),

    #[error("Listing {0} is not in the wishlist")]
    NotInWishlist(Uuid),

    #[error("Wishlist is not initialized")]
    NotInitialized,

    #[error("Another wishlist operation is in progress")]
    OperationInProgress,

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("External API error: {0}")]
    ExternalApi(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl StoreError {
    /// True for errors raised locally before any side effect was attempted.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::Validation(_)
                | Self::AlreadyInWishlist(_)
                | Self::NotInWishlist(_)
                | Self::NotInitialized
                | Self::OperationInProgress
        )
    }
}
