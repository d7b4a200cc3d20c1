//! Back-office mutation endpoints.
//!
//! [`AdminApi`] extends the storefront's [`StoreApi`] with the create,
//! update, toggle and delete calls. Every method resolves once the backend
//! answered with a success status; the response body is not used.

mod inputs;

pub use inputs::{CategoryInput, ProductInput};

use std::future::Future;

use reqwest::Method;
use serde_json::json;
use tracing::instrument;

use tienda_core::{CategoryId, OrderId, OrderStatus, ProductId, UserId};
use tienda_storefront::api::{ApiClient, ApiError, StoreApi};

/// Backend mutations used by the back-office.
pub trait AdminApi: StoreApi {
    /// `POST /products`.
    fn create_product(
        &self,
        input: &ProductInput,
    ) -> impl Future<Output = Result<(), ApiError>> + Send;

    /// `PUT /products/:id`.
    fn update_product(
        &self,
        id: ProductId,
        input: &ProductInput,
    ) -> impl Future<Output = Result<(), ApiError>> + Send;

    /// `PUT /products/:id` with only `isActive`.
    fn set_product_active(
        &self,
        id: ProductId,
        active: bool,
    ) -> impl Future<Output = Result<(), ApiError>> + Send;

    /// `DELETE /products/:id`.
    fn delete_product(&self, id: ProductId) -> impl Future<Output = Result<(), ApiError>> + Send;

    /// `POST /categories`.
    fn create_category(
        &self,
        input: &CategoryInput,
    ) -> impl Future<Output = Result<(), ApiError>> + Send;

    /// `PUT /categories/:id`.
    fn update_category(
        &self,
        id: CategoryId,
        input: &CategoryInput,
    ) -> impl Future<Output = Result<(), ApiError>> + Send;

    /// `DELETE /categories/:id`.
    fn delete_category(&self, id: CategoryId)
    -> impl Future<Output = Result<(), ApiError>> + Send;

    /// `PUT /users/:id` with only `activo`.
    fn set_user_active(
        &self,
        id: UserId,
        active: bool,
    ) -> impl Future<Output = Result<(), ApiError>> + Send;

    /// `DELETE /users/:id`.
    fn delete_user(&self, id: UserId) -> impl Future<Output = Result<(), ApiError>> + Send;

    /// `PUT /orders/:id` with only `estado`.
    fn set_order_status(
        &self,
        id: OrderId,
        status: &OrderStatus,
    ) -> impl Future<Output = Result<(), ApiError>> + Send;
}

impl AdminApi for ApiClient {
    #[instrument(skip(self, input), fields(name = %input.name))]
    async fn create_product(&self, input: &ProductInput) -> Result<(), ApiError> {
        let body = serde_json::to_value(input)?;
        self.send(Method::POST, self.endpoint(&["products"]), &body)
            .await
    }

    #[instrument(skip(self, input), fields(product_id = %id))]
    async fn update_product(&self, id: ProductId, input: &ProductInput) -> Result<(), ApiError> {
        let body = serde_json::to_value(input)?;
        let url = self.endpoint(&["products", &id.to_string()]);
        self.send(Method::PUT, url, &body).await
    }

    #[instrument(skip(self), fields(product_id = %id))]
    async fn set_product_active(&self, id: ProductId, active: bool) -> Result<(), ApiError> {
        let url = self.endpoint(&["products", &id.to_string()]);
        self.send(Method::PUT, url, &json!({ "isActive": active }))
            .await
    }

    #[instrument(skip(self), fields(product_id = %id))]
    async fn delete_product(&self, id: ProductId) -> Result<(), ApiError> {
        self.delete(self.endpoint(&["products", &id.to_string()]))
            .await
    }

    #[instrument(skip(self, input), fields(name = %input.name))]
    async fn create_category(&self, input: &CategoryInput) -> Result<(), ApiError> {
        let body = serde_json::to_value(input)?;
        self.send(Method::POST, self.endpoint(&["categories"]), &body)
            .await
    }

    #[instrument(skip(self, input), fields(category_id = %id))]
    async fn update_category(&self, id: CategoryId, input: &CategoryInput) -> Result<(), ApiError> {
        let body = serde_json::to_value(input)?;
        let url = self.endpoint(&["categories", &id.to_string()]);
        self.send(Method::PUT, url, &body).await
    }

    #[instrument(skip(self), fields(category_id = %id))]
    async fn delete_category(&self, id: CategoryId) -> Result<(), ApiError> {
        self.delete(self.endpoint(&["categories", &id.to_string()]))
            .await
    }

    #[instrument(skip(self), fields(user_id = %id))]
    async fn set_user_active(&self, id: UserId, active: bool) -> Result<(), ApiError> {
        let url = self.endpoint(&["users", &id.to_string()]);
        self.send(Method::PUT, url, &json!({ "activo": active }))
            .await
    }

    #[instrument(skip(self), fields(user_id = %id))]
    async fn delete_user(&self, id: UserId) -> Result<(), ApiError> {
        self.delete(self.endpoint(&["users", &id.to_string()]))
            .await
    }

    #[instrument(skip(self), fields(order_id = %id, status = %status))]
    async fn set_order_status(&self, id: OrderId, status: &OrderStatus) -> Result<(), ApiError> {
        let url = self.endpoint(&["orders", &id.to_string()]);
        self.send(Method::PUT, url, &json!({ "estado": status.as_str() }))
            .await
    }
}
