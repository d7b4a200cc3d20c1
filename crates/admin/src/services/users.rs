//! User mutations.

use tracing::instrument;

use tienda_core::UserId;
use tienda_storefront::api::types::Order;

use super::AdminClient;
use crate::api::AdminApi;
use crate::dashboard;
use crate::error::AdminError;

impl<A: AdminApi> AdminClient<A> {
    /// Flip a user between active and blocked. Returns the new state.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::NotFound` if the user is not cached.
    /// Returns `AdminError::Api` if the backend rejects the request.
    #[instrument(skip(self))]
    pub async fn toggle_user_active(&mut self, id: UserId) -> Result<bool, AdminError> {
        let active = !self
            .catalog
            .users()
            .iter()
            .find(|u| u.id == id)
            .ok_or(AdminError::NotFound {
                entity: "user",
                id: id.as_i64(),
            })?
            .active;
        let result = self.catalog.api().set_user_active(id, active).await;
        self.finish("toggle_user_active", result).await?;
        Ok(active)
    }

    /// Delete a user.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::Api` if the backend rejects the request.
    #[instrument(skip(self))]
    pub async fn delete_user(&mut self, id: UserId) -> Result<(), AdminError> {
        let result = self.catalog.api().delete_user(id).await;
        self.finish("delete_user", result).await
    }

    /// Cached orders placed by the user with `id`, matched on their name.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::NotFound` if the user is not cached.
    pub fn orders_for_user(&self, id: UserId) -> Result<Vec<&Order>, AdminError> {
        let user = self
            .catalog
            .users()
            .iter()
            .find(|u| u.id == id)
            .ok_or(AdminError::NotFound {
                entity: "user",
                id: id.as_i64(),
            })?;
        Ok(dashboard::orders_for_customer(
            self.catalog.orders(),
            &user.name,
        ))
    }
}
