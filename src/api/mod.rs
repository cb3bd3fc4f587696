//! The remote storefront API surface consumed by the stores. The server
//! owns every record here; the client only fetches, creates, and deletes.

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::StoreResult;
use crate::models::{DiscountType, ProductListing};

mod http;

pub use http::HttpStorefrontApi;

/// Wishlist container record. Created lazily server-side on first use.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WishlistRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub estore_id: Uuid,
}

/// Wishlist item record, optionally carrying the listing snapshot the
/// server denormalizes for rendering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WishlistItemRecord {
    pub id: Uuid,
    pub wishlist_id: Uuid,
    pub product_listing_id: Uuid,
    #[serde(default)]
    pub product_listing: Option<ProductListing>,
}

/// Result of server-side coupon validation. The discount amount arrives
/// pre-computed for the submitted cart value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CouponValidation {
    pub code: String,
    pub discount_type: DiscountType,
    pub discount: Decimal,
}

/// Result of server-side cart-offer validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OfferValidation {
    pub id: Uuid,
    pub name: String,
    pub discount_type: DiscountType,
    pub discount: Decimal,
}

/// Remote endpoints the stores depend on, kept behind a trait so tests can
/// substitute scripted fakes for the HTTP implementation.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StorefrontApi: Send + Sync {
    /// `GET /wishlists/?user_id=<id>` — the user's wishlist, if one exists.
    async fn fetch_wishlist(&self, user_id: Uuid) -> StoreResult<Option<WishlistRecord>>;

    /// `POST /wishlists/` — creates the user's wishlist.
    async fn create_wishlist(&self, user_id: Uuid) -> StoreResult<WishlistRecord>;

    /// `GET /wishlist_items/?wishlist_id=<id>` — all items in a wishlist.
    async fn fetch_wishlist_items(
        &self,
        wishlist_id: Uuid,
    ) -> StoreResult<Vec<WishlistItemRecord>>;

    /// `POST /wishlist_items/` — adds a listing to a wishlist.
    async fn create_wishlist_item(
        &self,
        wishlist_id: Uuid,
        product_listing_id: Uuid,
    ) -> StoreResult<WishlistItemRecord>;

    /// `DELETE /wishlist_items/<id>/` — removes a wishlist item.
    async fn delete_wishlist_item(&self, item_id: Uuid) -> StoreResult<()>;

    /// `GET /validate-coupon/<code>?cart_value=<v>` — validates a coupon
    /// against the current cart value.
    async fn validate_coupon(
        &self,
        code: &str,
        cart_value: Decimal,
    ) -> StoreResult<CouponValidation>;

    /// `POST /validate-offer/<id>` — validates a cart-level offer against
    /// the current cart contents.
    async fn validate_offer(
        &self,
        offer_id: Uuid,
        product_ids: &[Uuid],
        quantities: &[u32],
    ) -> StoreResult<OfferValidation>;
}
