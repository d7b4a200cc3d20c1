//! Order mutations.

use tracing::instrument;

use tienda_core::{OrderId, OrderStatus};

use super::AdminClient;
use crate::api::AdminApi;
use crate::error::AdminError;

impl<A: AdminApi> AdminClient<A> {
    /// Cancel an order.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::NotFound` if the order is not cached.
    /// Returns `AdminError::InvalidTransition` if it is already cancelled.
    /// Returns `AdminError::Api` if the backend rejects the request.
    #[instrument(skip(self))]
    pub async fn cancel_order(&mut self, id: OrderId) -> Result<(), AdminError> {
        let order = self
            .catalog
            .orders()
            .iter()
            .find(|o| o.id == id)
            .ok_or(AdminError::NotFound {
                entity: "order",
                id: id.as_i64(),
            })?;
        if order.status.is_cancelled() {
            return Err(AdminError::InvalidTransition(format!(
                "order {id} is already cancelled"
            )));
        }

        let result = self
            .catalog
            .api()
            .set_order_status(id, &OrderStatus::Cancelled)
            .await;
        self.finish("cancel_order", result).await
    }
}
