//! Domain records shared across the stores. Listings, wishlist rows, and
//! validated discounts are server-owned; the client holds snapshots and
//! never mutates their fields.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Sellable product listing as the catalog returns it. `price` is what the
/// customer pays, `list_price` the crossed-out reference price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductListing {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub price: Decimal,
    pub list_price: Decimal,
    pub image_url: Option<String>,
    pub brand_id: Option<Uuid>,
    pub category_id: Option<Uuid>,
    pub variant_label: Option<String>,
    pub stock: u32,
    pub purchase_limit: u32,
}

impl ProductListing {
    /// Advisory per-order ceiling: the lower of the purchase limit and the
    /// available stock. The cart does not enforce it; checkout does.
    pub fn max_purchasable(&self) -> u32 {
        self.purchase_limit.min(self.stock)
    }
}

/// One cart line: a listing snapshot and how many of it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLineItem {
    pub listing: ProductListing,
    pub quantity: u32,
    pub added_at: DateTime<Utc>,
}

impl CartLineItem {
    pub fn line_total(&self) -> Decimal {
        self.listing.price * Decimal::from(self.quantity)
    }

    /// List-price delta across the line; zero when not discounted.
    pub fn line_savings(&self) -> Decimal {
        (self.listing.list_price - self.listing.price) * Decimal::from(self.quantity)
    }
}

/// Wishlist row. `listing` carries the denormalized snapshot when the
/// server provides one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WishlistItem {
    pub id: Uuid,
    pub wishlist_id: Uuid,
    pub product_listing_id: Uuid,
    pub listing: Option<ProductListing>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscountType {
    Percentage,
    Fixed,
}

/// Coupon committed to the offers store after server-side validation.
/// `discount` is the concrete amount computed for the submitted cart value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppliedCoupon {
    pub code: String,
    pub discount_type: DiscountType,
    pub discount: Decimal,
}

/// Cart-level offer committed after server-side validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppliedOffer {
    pub offer_id: Uuid,
    pub name: String,
    pub discount_type: DiscountType,
    pub discount: Decimal,
}

/// Which persisted partition a store reads and writes. Anonymous and
/// per-user carts never share a key, so a login switch cannot leak items
/// across accounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StorageScope {
    Anonymous,
    User(Uuid),
}

impl StorageScope {
    /// Storage key for this scope: the bare prefix for the anonymous
    /// partition, `<prefix>_<user id>` for a signed-in user.
    pub fn storage_key(&self, prefix: &str) -> String {
        match self {
            StorageScope::Anonymous => prefix.to_string(),
            StorageScope::User(user_id) => format!("{prefix}_{user_id}"),
        }
    }
}
