//! Category mutations.

use tracing::instrument;

use tienda_core::CategoryId;

use super::AdminClient;
use crate::api::{AdminApi, CategoryInput};
use crate::error::AdminError;

impl<A: AdminApi> AdminClient<A> {
    /// Create a category.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::Validation` if the name is empty.
    /// Returns `AdminError::Api` if the backend rejects the request.
    #[instrument(skip(self, input))]
    pub async fn create_category(&mut self, input: CategoryInput) -> Result<(), AdminError> {
        let input = input.validate()?;
        let result = self.catalog.api().create_category(&input).await;
        self.finish("create_category", result).await
    }

    /// Replace a category's fields.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::Validation` if the name is empty.
    /// Returns `AdminError::Api` if the backend rejects the request.
    #[instrument(skip(self, input))]
    pub async fn update_category(
        &mut self,
        id: CategoryId,
        input: CategoryInput,
    ) -> Result<(), AdminError> {
        let input = input.validate()?;
        let result = self.catalog.api().update_category(id, &input).await;
        self.finish("update_category", result).await
    }

    /// Delete a category.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::Api` if the backend rejects the request.
    #[instrument(skip(self))]
    pub async fn delete_category(&mut self, id: CategoryId) -> Result<(), AdminError> {
        let result = self.catalog.api().delete_category(id).await;
        self.finish("delete_category", result).await
    }
}
