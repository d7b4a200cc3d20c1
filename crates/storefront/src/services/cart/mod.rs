//! Cart reconciler.
//!
//! Mirrors the signed-in user's server cart locally. The cart is either
//! [`CartState::Unloaded`] (nobody signed in, or not fetched yet) or
//! [`CartState::Loaded`] for one user key, the identity email.
//!
//! Mutations are optimistic: the local lines change first, then the backend
//! call is awaited. A failed backend call does not roll the local change
//! back; it returns [`CartError::Sync`] so the caller can tell the user the
//! cart is out of step. Local lines stay the source of truth for rendering
//! until the next [`CartReconciler::load`].

mod error;

pub use error::{CartError, CartOperation};

use tracing::{debug, instrument, warn};

use tienda_core::{Email, Price, ProductId};

use crate::api::types::{CartDelta, CartRemoval, Product, ProductQuery};
use crate::api::{ApiError, StoreApi};
use crate::error::add_breadcrumb;
use crate::models::{CartLine, Identity};

/// Cart lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CartState {
    /// No cart for anyone.
    #[default]
    Unloaded,
    /// Lines for `user_key` after the initial fetch resolved.
    Loaded {
        user_key: Email,
        lines: Vec<CartLine>,
    },
}

/// Optimistic local mirror of a server cart.
pub struct CartReconciler<A> {
    api: A,
    state: CartState,
}

impl<A: StoreApi> CartReconciler<A> {
    /// Create an unloaded cart.
    #[must_use]
    pub const fn new(api: A) -> Self {
        Self {
            api,
            state: CartState::Unloaded,
        }
    }

    #[must_use]
    pub const fn state(&self) -> &CartState {
        &self.state
    }

    #[must_use]
    pub const fn is_loaded(&self) -> bool {
        matches!(self.state, CartState::Loaded { .. })
    }

    /// The user key the cart is loaded for.
    #[must_use]
    pub const fn user_key(&self) -> Option<&Email> {
        match &self.state {
            CartState::Loaded { user_key, .. } => Some(user_key),
            CartState::Unloaded => None,
        }
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Fetch the server cart for `identity` and resolve its products.
    ///
    /// The cart is loaded afterwards even if the fetch failed (empty), and
    /// lines whose product is not in the catalog keep no snapshot.
    #[instrument(skip(self, identity), fields(user_key = %identity.email))]
    pub async fn load(&mut self, identity: &Identity) {
        let user_key = identity.email.clone();
        let all = ProductQuery::all();
        let (remote, catalog) = tokio::join!(
            self.api.fetch_cart(&user_key),
            self.api.list_products(&all),
        );

        let remote = remote.unwrap_or_else(|e| {
            warn!(error = %e, "Cart fetch failed, starting with an empty cart");
            Vec::new()
        });
        let catalog = catalog.unwrap_or_else(|e| {
            warn!(error = %e, "Catalog fetch failed, cart lines load without products");
            Vec::new()
        });

        let mut lines: Vec<CartLine> = Vec::with_capacity(remote.len());
        for line in remote {
            let Ok(quantity) = u32::try_from(line.quantity) else {
                debug!(product_id = %line.product_id, quantity = line.quantity, "Dropping remote line");
                continue;
            };
            if quantity == 0 {
                debug!(product_id = %line.product_id, "Dropping empty remote line");
                continue;
            }
            // The backend may hold several rows for one product.
            if let Some(existing) = lines.iter_mut().find(|l| l.product_id == line.product_id) {
                existing.quantity = existing.quantity.saturating_add(quantity);
                continue;
            }
            lines.push(CartLine {
                user_key: user_key.clone(),
                product_id: line.product_id,
                quantity,
                product: catalog.iter().find(|p| p.id == line.product_id).cloned(),
            });
        }

        debug!(lines = lines.len(), "Cart loaded");
        self.state = CartState::Loaded { user_key, lines };
    }

    /// Forget the cart (sign-out). No network call.
    pub fn unload(&mut self) {
        self.state = CartState::Unloaded;
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Add `quantity` units of `product`, merging with an existing line.
    ///
    /// # Errors
    ///
    /// Returns `CartError::NotAuthenticated` if the cart is not loaded.
    /// Returns `CartError::Validation` if `quantity` is zero.
    /// Returns `CartError::Sync` if the backend did not confirm the change.
    #[instrument(skip(self, product), fields(product_id = %product.id))]
    pub async fn add_item(&mut self, product: &Product, quantity: u32) -> Result<(), CartError> {
        let (user_key, lines) = self.loaded_mut()?;
        if quantity == 0 {
            return Err(CartError::Validation(
                "quantity must be at least 1".to_string(),
            ));
        }

        if let Some(line) = lines.iter_mut().find(|l| l.product_id == product.id) {
            line.quantity = line.quantity.saturating_add(quantity);
        } else {
            lines.push(CartLine {
                user_key: user_key.clone(),
                product_id: product.id,
                quantity,
                product: Some(product.clone()),
            });
        }
        let user_key = user_key.clone();

        record("Added to cart", product.id);
        self.push_delta(user_key, product.id, i64::from(quantity), CartOperation::Add)
            .await
    }

    /// Add one unit to an existing line.
    ///
    /// # Errors
    ///
    /// Returns `CartError::NotAuthenticated` if the cart is not loaded.
    /// Returns `CartError::LineNotFound` if there is no line for the product.
    /// Returns `CartError::Sync` if the backend did not confirm the change.
    #[instrument(skip(self))]
    pub async fn increase(&mut self, product_id: ProductId) -> Result<(), CartError> {
        let (user_key, lines) = self.loaded_mut()?;
        let line = lines
            .iter_mut()
            .find(|l| l.product_id == product_id)
            .ok_or(CartError::LineNotFound(product_id))?;
        line.quantity = line.quantity.saturating_add(1);
        let user_key = user_key.clone();

        record("Increased cart line", product_id);
        self.push_delta(user_key, product_id, 1, CartOperation::Add)
            .await
    }

    /// Remove one unit; a line at one unit is removed entirely.
    ///
    /// The backend always receives a `-1` delta.
    ///
    /// # Errors
    ///
    /// Returns `CartError::NotAuthenticated` if the cart is not loaded.
    /// Returns `CartError::LineNotFound` if there is no line for the product.
    /// Returns `CartError::Sync` if the backend did not confirm the change.
    #[instrument(skip(self))]
    pub async fn decrease(&mut self, product_id: ProductId) -> Result<(), CartError> {
        let (user_key, lines) = self.loaded_mut()?;
        let index = lines
            .iter()
            .position(|l| l.product_id == product_id)
            .ok_or(CartError::LineNotFound(product_id))?;

        let remove = lines.get(index).is_some_and(|l| l.quantity <= 1);
        if remove {
            lines.remove(index);
        } else if let Some(line) = lines.get_mut(index) {
            line.quantity -= 1;
        }
        let user_key = user_key.clone();

        record("Decreased cart line", product_id);
        self.push_delta(user_key, product_id, -1, CartOperation::Decrease)
            .await
    }

    /// Remove the line for a product.
    ///
    /// # Errors
    ///
    /// Returns `CartError::NotAuthenticated` if the cart is not loaded.
    /// Returns `CartError::LineNotFound` if there is no line for the product.
    /// Returns `CartError::Sync` if the backend did not confirm the change.
    #[instrument(skip(self))]
    pub async fn remove_item(&mut self, product_id: ProductId) -> Result<(), CartError> {
        let (user_key, lines) = self.loaded_mut()?;
        let before = lines.len();
        lines.retain(|l| l.product_id != product_id);
        if lines.len() == before {
            return Err(CartError::LineNotFound(product_id));
        }
        let removal = CartRemoval {
            user_id: user_key.clone(),
            product_id,
        };

        record("Removed from cart", product_id);
        self.api
            .remove_from_cart(&removal)
            .await
            .map_err(|e| sync_failed(CartOperation::Remove, e))
    }

    /// Empty the cart. The local lines are always cleared.
    ///
    /// # Errors
    ///
    /// Returns `CartError::NotAuthenticated` if the cart is not loaded.
    /// Returns `CartError::Sync` if the backend did not confirm the change.
    #[instrument(skip(self))]
    pub async fn clear(&mut self) -> Result<(), CartError> {
        let (user_key, lines) = self.loaded_mut()?;
        lines.clear();
        let user_key = user_key.clone();

        add_breadcrumb("cart", "Cleared cart", None);
        self.api
            .clear_cart(&user_key)
            .await
            .map_err(|e| sync_failed(CartOperation::Clear, e))
    }

    // =========================================================================
    // Views
    // =========================================================================

    /// Current lines; empty while unloaded.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        match &self.state {
            CartState::Loaded { lines, .. } => lines,
            CartState::Unloaded => &[],
        }
    }

    /// Quantity of one product in the cart.
    #[must_use]
    pub fn quantity_of(&self, product_id: ProductId) -> u32 {
        self.lines()
            .iter()
            .find(|l| l.product_id == product_id)
            .map_or(0, |l| l.quantity)
    }

    /// Total units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.lines()
            .iter()
            .fold(0_u32, |acc, l| acc.saturating_add(l.quantity))
    }

    /// Sum of line totals; lines without a product count as zero.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.lines().iter().map(CartLine::line_total).sum()
    }

    /// Lines that have a product snapshot to show.
    pub fn renderable_lines(&self) -> impl Iterator<Item = (&CartLine, &Product)> {
        self.lines()
            .iter()
            .filter_map(|line| line.product.as_ref().map(|product| (line, product)))
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    fn loaded_mut(&mut self) -> Result<(&Email, &mut Vec<CartLine>), CartError> {
        match &mut self.state {
            CartState::Loaded { user_key, lines } => Ok((&*user_key, lines)),
            CartState::Unloaded => Err(CartError::NotAuthenticated),
        }
    }

    async fn push_delta(
        &self,
        user_key: Email,
        product_id: ProductId,
        quantity: i64,
        operation: CartOperation,
    ) -> Result<(), CartError> {
        let delta = CartDelta {
            user_id: user_key,
            product_id,
            quantity,
        };
        self.api
            .add_to_cart(&delta)
            .await
            .map_err(|e| sync_failed(operation, e))
    }
}

fn record(message: &str, product_id: ProductId) {
    let id = product_id.to_string();
    add_breadcrumb("cart", message, Some(&[("product_id", id.as_str())]));
}

fn sync_failed(operation: CartOperation, source: ApiError) -> CartError {
    warn!(%operation, error = %source, "Cart change not saved remotely");
    CartError::Sync { operation, source }
}
