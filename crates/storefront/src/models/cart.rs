//! Cart line domain type.

use serde::{Deserialize, Serialize};

use tienda_core::{Email, Price, ProductId};

use crate::api::types::Product;

/// One product + quantity entry in the signed-in user's cart.
///
/// `quantity` is always at least 1 while the line exists; the reconciler
/// removes a line instead of zeroing it. `product` is a denormalized snapshot
/// for display and may be `None` when the product could not be resolved
/// against the catalog; such lines are skipped when rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    /// Owner of the line (the identity email).
    #[serde(rename = "userId")]
    pub user_key: Email,
    /// Product in the line.
    pub product_id: ProductId,
    /// Units of the product, at least 1.
    pub quantity: u32,
    /// Product snapshot taken when the line was added or loaded.
    pub product: Option<Product>,
}

impl CartLine {
    /// Unit price of the snapshot, if resolved.
    #[must_use]
    pub fn unit_price(&self) -> Option<Price> {
        self.product.as_ref().map(|p| p.price)
    }

    /// Line total (`unit price × quantity`); zero without a snapshot.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.unit_price()
            .map_or(Price::ZERO, |price| price.times(self.quantity))
    }
}
