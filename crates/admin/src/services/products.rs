//! Product mutations.

use tracing::instrument;

use tienda_core::ProductId;

use super::AdminClient;
use crate::api::{AdminApi, ProductInput};
use crate::error::AdminError;

impl<A: AdminApi> AdminClient<A> {
    /// Create a product.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::Validation` if the input is incomplete.
    /// Returns `AdminError::Api` if the backend rejects the request.
    #[instrument(skip(self, input))]
    pub async fn create_product(&mut self, input: ProductInput) -> Result<(), AdminError> {
        let input = input.validate()?;
        let result = self.catalog.api().create_product(&input).await;
        self.finish("create_product", result).await
    }

    /// Replace a product's fields.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::Validation` if the input is incomplete.
    /// Returns `AdminError::Api` if the backend rejects the request.
    #[instrument(skip(self, input))]
    pub async fn update_product(
        &mut self,
        id: ProductId,
        input: ProductInput,
    ) -> Result<(), AdminError> {
        let input = input.validate()?;
        let result = self.catalog.api().update_product(id, &input).await;
        self.finish("update_product", result).await
    }

    /// Flip a product between active and inactive. Returns the new state.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::NotFound` if the product is not cached.
    /// Returns `AdminError::Api` if the backend rejects the request.
    #[instrument(skip(self))]
    pub async fn toggle_product_active(&mut self, id: ProductId) -> Result<bool, AdminError> {
        let active = !self
            .catalog
            .find_product(id)
            .ok_or(AdminError::NotFound {
                entity: "product",
                id: id.as_i64(),
            })?
            .is_active;
        let result = self.catalog.api().set_product_active(id, active).await;
        self.finish("toggle_product_active", result).await?;
        Ok(active)
    }

    /// Delete a product.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::Api` if the backend rejects the request.
    #[instrument(skip(self))]
    pub async fn delete_product(&mut self, id: ProductId) -> Result<(), AdminError> {
        let result = self.catalog.api().delete_product(id).await;
        self.finish("delete_product", result).await
    }
}
