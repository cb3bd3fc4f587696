use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, Response, StatusCode};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use tracing::{instrument, warn};
use uuid::Uuid;

use super::{
    CouponValidation, OfferValidation, StorefrontApi, WishlistItemRecord, WishlistRecord,
};
use crate::auth::AuthTokenStore;
use crate::config::StorefrontConfig;
use crate::errors::{StoreError, StoreResult};

/// Error body shape used by the storefront API. Depending on the endpoint
/// the human-readable message lives in `message` or `detail`.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: Option<String>,
    detail: Option<String>,
}

/// `reqwest`-backed implementation of [`StorefrontApi`]. Attaches the
/// bearer token from the shared [`AuthTokenStore`] when one is present and
/// clears it on a 401 response.
#[derive(Clone)]
pub struct HttpStorefrontApi {
    client: Client,
    base_url: String,
    estore_id: Uuid,
    auth: AuthTokenStore,
}

impl HttpStorefrontApi {
    pub fn new(config: &StorefrontConfig, auth: AuthTokenStore) -> StoreResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            estore_id: config.estore_id,
            auth,
        })
    }

    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let mut request = self
            .client
            .request(method, format!("{}{}", self.base_url, path));
        if let Some(token) = self.auth.token() {
            request = request.bearer_auth(token);
        }
        request
    }

    /// Maps a non-success response to a store error, using the server's
    /// message when the body parses and clearing the stored token on 401.
    async fn check(&self, response: Response) -> StoreResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response
            .json::<ApiErrorBody>()
            .await
            .ok()
            .and_then(|body| body.message.or(body.detail))
            .unwrap_or_else(|| format!("request failed with status {status}"));
        if status == StatusCode::UNAUTHORIZED {
            warn!("received 401, clearing stored auth token");
            self.auth.clear();
            return Err(StoreError::Unauthorized(message));
        }
        Err(StoreError::ExternalApi(message))
    }
}

#[async_trait]
impl StorefrontApi for HttpStorefrontApi {
    #[instrument(skip(self))]
    async fn fetch_wishlist(&self, user_id: Uuid) -> StoreResult<Option<WishlistRecord>> {
        let response = self
            .request(Method::GET, "/wishlists/")
            .query(&[("user_id", user_id.to_string())])
            .send()
            .await?;
        let records: Vec<WishlistRecord> = self.check(response).await?.json().await?;
        Ok(records.into_iter().next())
    }

    #[instrument(skip(self))]
    async fn create_wishlist(&self, user_id: Uuid) -> StoreResult<WishlistRecord> {
        let response = self
            .request(Method::POST, "/wishlists/")
            .json(&json!({ "user_id": user_id, "estore_id": self.estore_id }))
            .send()
            .await?;
        Ok(self.check(response).await?.json().await?)
    }

    #[instrument(skip(self))]
    async fn fetch_wishlist_items(
        &self,
        wishlist_id: Uuid,
    ) -> StoreResult<Vec<WishlistItemRecord>> {
        let response = self
            .request(Method::GET, "/wishlist_items/")
            .query(&[("wishlist_id", wishlist_id.to_string())])
            .send()
            .await?;
        Ok(self.check(response).await?.json().await?)
    }

    #[instrument(skip(self))]
    async fn create_wishlist_item(
        &self,
        wishlist_id: Uuid,
        product_listing_id: Uuid,
    ) -> StoreResult<WishlistItemRecord> {
        let response = self
            .request(Method::POST, "/wishlist_items/")
            .json(&json!({
                "wishlist_id": wishlist_id,
                "product_listing_id": product_listing_id,
            }))
            .send()
            .await?;
        Ok(self.check(response).await?.json().await?)
    }

    #[instrument(skip(self))]
    async fn delete_wishlist_item(&self, item_id: Uuid) -> StoreResult<()> {
        let response = self
            .request(Method::DELETE, &format!("/wishlist_items/{item_id}/"))
            .send()
            .await?;
        self.check(response).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn validate_coupon(
        &self,
        code: &str,
        cart_value: Decimal,
    ) -> StoreResult<CouponValidation> {
        let response = self
            .request(Method::GET, &format!("/validate-coupon/{code}"))
            .query(&[("cart_value", cart_value.to_string())])
            .send()
            .await?;
        Ok(self.check(response).await?.json().await?)
    }

    #[instrument(skip(self))]
    async fn validate_offer(
        &self,
        offer_id: Uuid,
        product_ids: &[Uuid],
        quantities: &[u32],
    ) -> StoreResult<OfferValidation> {
        let response = self
            .request(Method::POST, &format!("/validate-offer/{offer_id}"))
            .json(&json!({
                "product_ids": product_ids,
                "quantities": quantities,
            }))
            .send()
            .await?;
        Ok(self.check(response).await?.json().await?)
    }
}
