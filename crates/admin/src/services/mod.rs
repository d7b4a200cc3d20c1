//! Back-office client.
//!
//! [`AdminClient`] owns a [`CatalogClient`] over an [`AdminApi`]. Each
//! mutation validates its input, issues one request and, only if the backend
//! answered with a success status, re-fetches all four collections. There is
//! no optimistic update and no partial refresh.
//!
//! Entity operations live in one module per resource.

mod categories;
mod orders;
mod products;
mod users;

use tracing::{info, warn};

use tienda_storefront::api::ApiError;
use tienda_storefront::services::CatalogClient;

use crate::api::AdminApi;
use crate::dashboard::{self, DashboardSummary, DateRange};
use crate::error::AdminError;

/// Back-office client over an [`AdminApi`].
pub struct AdminClient<A> {
    catalog: CatalogClient<A>,
}

impl<A: AdminApi> AdminClient<A> {
    /// Create a client with empty collections. Call [`refresh`](Self::refresh)
    /// to populate them.
    #[must_use]
    pub fn new(api: A) -> Self {
        Self {
            catalog: CatalogClient::new(api),
        }
    }

    /// The cached collections.
    #[must_use]
    pub const fn catalog(&self) -> &CatalogClient<A> {
        &self.catalog
    }

    /// Re-fetch products, categories, users and orders.
    pub async fn refresh(&mut self) {
        self.catalog.refresh().await;
    }

    /// Summarize orders in `range`, or today's orders without one.
    #[must_use]
    pub fn dashboard(&self, range: Option<DateRange>) -> DashboardSummary {
        let today = chrono::Local::now().date_naive();
        dashboard::summarize(self.catalog.orders(), self.catalog.users(), range, today)
    }

    /// Refresh everything after a successful mutation.
    async fn finish(
        &mut self,
        action: &'static str,
        result: Result<(), ApiError>,
    ) -> Result<(), AdminError> {
        if let Err(e) = result {
            warn!(action, error = %e, "Admin mutation failed");
            return Err(e.into());
        }
        info!(action, "Admin mutation applied, refreshing");
        self.catalog.refresh().await;
        Ok(())
    }
}
