//! REST client for the storefront backend.
//!
//! # Architecture
//!
//! - [`ApiClient`] wraps a shared `reqwest::Client` and the configured base
//!   URL; cloning is cheap
//! - [`StoreApi`] is the seam the services depend on, so they can be driven
//!   by a test double
//! - Path segments are percent-encoded (the cart user key is an email)
//!
//! Non-success responses are logged with a truncated body and surfaced as
//! [`ApiError::Status`]; `404` becomes [`ApiError::NotFound`].

pub mod types;

#[cfg(test)]
pub(crate) mod fake;

use std::future::Future;
use std::sync::Arc;

use reqwest::Method;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, instrument};
use url::Url;

use tienda_core::{Email, ProductId};

use crate::config::ApiConfig;
use types::{
    CartDelta, CartRemoval, Category, CreateOrderRequest, CreateOrderResponse, Order, Product,
    ProductQuery, RemoteCartLine, StoreUser,
};

/// Maximum number of body characters included in error logs.
const LOG_BODY_LIMIT: usize = 500;

/// Errors that can occur when talking to the backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport-level failure (connection refused, TLS, timeout...).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered with a non-success status.
    #[error("Backend returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    /// The backend answered `404 Not Found`.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The response body did not match the expected shape.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

impl ApiError {
    /// Whether the backend definitively reported the resource as missing.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Whether the request never got a response.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Http(_))
    }
}

// =============================================================================
// StoreApi
// =============================================================================

/// Backend operations used by the storefront services.
pub trait StoreApi: Send + Sync {
    /// `GET /products` with the query's filters as parameters.
    fn list_products(
        &self,
        query: &ProductQuery,
    ) -> impl Future<Output = Result<Vec<Product>, ApiError>> + Send;

    /// `GET /products/:id`.
    fn get_product(&self, id: ProductId)
    -> impl Future<Output = Result<Product, ApiError>> + Send;

    /// `GET /categories`.
    fn list_categories(&self) -> impl Future<Output = Result<Vec<Category>, ApiError>> + Send;

    /// `GET /users`.
    fn list_users(&self) -> impl Future<Output = Result<Vec<StoreUser>, ApiError>> + Send;

    /// `GET /orders`.
    fn list_orders(&self) -> impl Future<Output = Result<Vec<Order>, ApiError>> + Send;

    /// `GET /cart/:userKey`.
    fn fetch_cart(
        &self,
        user_key: &Email,
    ) -> impl Future<Output = Result<Vec<RemoteCartLine>, ApiError>> + Send;

    /// `POST /cart/add`.
    fn add_to_cart(&self, delta: &CartDelta)
    -> impl Future<Output = Result<(), ApiError>> + Send;

    /// `DELETE /cart/remove`.
    fn remove_from_cart(
        &self,
        removal: &CartRemoval,
    ) -> impl Future<Output = Result<(), ApiError>> + Send;

    /// `DELETE /cart/clear/:userKey`.
    fn clear_cart(&self, user_key: &Email) -> impl Future<Output = Result<(), ApiError>> + Send;

    /// `POST /orders/create`.
    ///
    /// A `2xx` answer is returned as-is even when it reports `success: false`;
    /// interpreting the body is up to the caller.
    fn create_order(
        &self,
        request: &CreateOrderRequest,
    ) -> impl Future<Output = Result<CreateOrderResponse, ApiError>> + Send;
}

// =============================================================================
// ApiClient
// =============================================================================

/// Client for the storefront REST API.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: Url,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.inner.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Create a new API client.
    #[must_use]
    pub fn new(config: &ApiConfig) -> Self {
        Self {
            inner: Arc::new(ApiClientInner {
                client: reqwest::Client::new(),
                base_url: config.base_url.clone(),
            }),
        }
    }

    /// The configured base URL.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Build an endpoint URL by appending percent-encoded path segments.
    #[must_use]
    pub fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.inner.base_url.clone();
        // The base URL is validated to be hierarchical, so this always applies.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// Send a request and return the body of a successful response.
    async fn execute(
        &self,
        method: Method,
        url: Url,
        body: Option<&serde_json::Value>,
    ) -> Result<String, ApiError> {
        debug!(method = %method, url = %url, "Sending backend request");

        let mut request = self.inner.client.request(method, url.clone());
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();

        // Get response body as text first for better error diagnostics
        let response_text = response.text().await?;

        if status == reqwest::StatusCode::NOT_FOUND {
            debug!(url = %url, "Backend returned 404");
            return Err(ApiError::NotFound(url.path().to_string()));
        }

        if !status.is_success() {
            tracing::error!(
                status = %status,
                url = %url,
                body = %truncate(&response_text),
                "Backend returned non-success status"
            );
            return Err(ApiError::Status {
                status,
                body: response_text.chars().take(200).collect(),
            });
        }

        Ok(response_text)
    }

    /// Parse a response body, logging it when it does not match.
    fn parse<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
        serde_json::from_str(body).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %truncate(body),
                "Failed to parse backend response"
            );
            ApiError::Parse(e)
        })
    }

    /// `GET` a JSON resource.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport failure, non-success status, or a body
    /// that does not deserialize into `T`.
    pub async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, ApiError> {
        let body = self.execute(Method::GET, url, None).await?;
        Self::parse(&body)
    }

    /// Send a JSON body and ignore the response body.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport failure or non-success status.
    pub async fn send(
        &self,
        method: Method,
        url: Url,
        body: &serde_json::Value,
    ) -> Result<(), ApiError> {
        self.execute(method, url, Some(body)).await.map(|_| ())
    }

    /// Send a JSON body and parse the JSON response.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport failure, non-success status, or a body
    /// that does not deserialize into `T`.
    pub async fn send_json<T: DeserializeOwned>(
        &self,
        method: Method,
        url: Url,
        body: &serde_json::Value,
    ) -> Result<T, ApiError> {
        let response = self.execute(method, url, Some(body)).await?;
        Self::parse(&response)
    }

    /// `DELETE` a resource without a body.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport failure or non-success status.
    pub async fn delete(&self, url: Url) -> Result<(), ApiError> {
        self.execute(Method::DELETE, url, None).await.map(|_| ())
    }
}

fn truncate(body: &str) -> String {
    body.chars().take(LOG_BODY_LIMIT).collect()
}

impl StoreApi for ApiClient {
    #[instrument(skip(self), fields(filtered = !query.is_unfiltered()))]
    async fn list_products(&self, query: &ProductQuery) -> Result<Vec<Product>, ApiError> {
        let mut url = self.endpoint(&["products"]);
        let pairs = query.to_query_pairs();
        if !pairs.is_empty() {
            url.query_pairs_mut().extend_pairs(pairs);
        }
        self.get(url).await
    }

    #[instrument(skip(self), fields(product_id = %id))]
    async fn get_product(&self, id: ProductId) -> Result<Product, ApiError> {
        let url = self.endpoint(&["products", &id.to_string()]);
        self.get(url).await
    }

    #[instrument(skip(self))]
    async fn list_categories(&self) -> Result<Vec<Category>, ApiError> {
        self.get(self.endpoint(&["categories"])).await
    }

    #[instrument(skip(self))]
    async fn list_users(&self) -> Result<Vec<StoreUser>, ApiError> {
        self.get(self.endpoint(&["users"])).await
    }

    #[instrument(skip(self))]
    async fn list_orders(&self) -> Result<Vec<Order>, ApiError> {
        self.get(self.endpoint(&["orders"])).await
    }

    #[instrument(skip(self), fields(user_key = %user_key))]
    async fn fetch_cart(&self, user_key: &Email) -> Result<Vec<RemoteCartLine>, ApiError> {
        self.get(self.endpoint(&["cart", user_key.as_str()])).await
    }

    #[instrument(skip(self), fields(product_id = %delta.product_id, quantity = delta.quantity))]
    async fn add_to_cart(&self, delta: &CartDelta) -> Result<(), ApiError> {
        let body = serde_json::to_value(delta)?;
        self.send(Method::POST, self.endpoint(&["cart", "add"]), &body)
            .await
    }

    #[instrument(skip(self), fields(product_id = %removal.product_id))]
    async fn remove_from_cart(&self, removal: &CartRemoval) -> Result<(), ApiError> {
        let body = serde_json::to_value(removal)?;
        self.send(Method::DELETE, self.endpoint(&["cart", "remove"]), &body)
            .await
    }

    #[instrument(skip(self), fields(user_key = %user_key))]
    async fn clear_cart(&self, user_key: &Email) -> Result<(), ApiError> {
        self.delete(self.endpoint(&["cart", "clear", user_key.as_str()]))
            .await
    }

    #[instrument(skip(self, request), fields(user_id = %request.user_id, items = request.items.len()))]
    async fn create_order(
        &self,
        request: &CreateOrderRequest,
    ) -> Result<CreateOrderResponse, ApiError> {
        let body = serde_json::to_value(request)?;
        self.send_json(Method::POST, self.endpoint(&["orders", "create"]), &body)
            .await
    }
}
