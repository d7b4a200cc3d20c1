//! Checkout orchestrator.
//!
//! Turns the loaded cart into an order: re-resolves every line against the
//! current catalog, computes totals, submits the order and clears the cart
//! once the backend confirms it.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, instrument, warn};

use tienda_core::{OrderId, PaymentMethod, Price};

use crate::api::types::{CreateOrderRequest, ProductQuery};
use crate::api::{ApiError, StoreApi};
use crate::models::{CartLine, Identity};
use crate::services::cart::CartReconciler;
use crate::services::catalog::CatalogClient;

/// Flat shipping charge for a non-empty order, in soles.
pub const SHIPPING_COST: u32 = 15;

/// Errors that can occur during checkout.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Nobody is signed in, or the cart belongs to someone else.
    #[error("must log in to check out")]
    NotAuthenticated,

    /// The cart has no lines.
    #[error("the cart is empty")]
    EmptyCart,

    /// A shipping field is missing.
    #[error("{0} is required")]
    Validation(&'static str),

    /// The backend did not confirm the order.
    #[error("order was not created: {0}")]
    OrderCreationFailed(String),

    /// The backend could not be reached.
    #[error("network error: {0}")]
    Network(#[source] ApiError),
}

/// Where to ship the order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingInfo {
    pub full_name: String,
    pub address: String,
    pub city: String,
    pub postal_code: String,
    pub country: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl ShippingInfo {
    /// Check that every required field has content.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::Validation` naming the first empty field.
    pub fn validate(&self) -> Result<(), CheckoutError> {
        let fields = [
            (&self.full_name, "full name"),
            (&self.address, "address"),
            (&self.city, "city"),
            (&self.postal_code, "postal code"),
            (&self.country, "country"),
        ];
        for (value, name) in fields {
            if value.trim().is_empty() {
                return Err(CheckoutError::Validation(name));
            }
        }
        Ok(())
    }
}

/// Order money amounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OrderTotals {
    pub subtotal: Price,
    pub shipping: Price,
    pub total: Price,
}

impl OrderTotals {
    /// Totals for `lines`; a line without a product counts as zero.
    #[must_use]
    pub fn for_lines(lines: &[CartLine]) -> Self {
        let subtotal: Price = lines.iter().map(CartLine::line_total).sum();
        let shipping = if lines.is_empty() {
            Price::ZERO
        } else {
            Price::from_soles(SHIPPING_COST)
        };
        Self {
            subtotal,
            shipping,
            total: subtotal + shipping,
        }
    }
}

/// A placed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderConfirmation {
    pub order_id: OrderId,
    /// Lines as submitted, with re-resolved products.
    pub items: Vec<CartLine>,
    pub totals: OrderTotals,
    pub shipping: ShippingInfo,
    pub payment_method: PaymentMethod,
}

/// Places orders through a [`StoreApi`].
pub struct CheckoutOrchestrator<A> {
    api: A,
}

impl<A: StoreApi> CheckoutOrchestrator<A> {
    #[must_use]
    pub const fn new(api: A) -> Self {
        Self { api }
    }

    /// Submit the cart as an order.
    ///
    /// Checks run in order: identity, non-empty cart, shipping fields. The
    /// order endpoint is only called once all pass. On success the cart is
    /// cleared; a failed remote clear is logged and does not fail the
    /// checkout. On failure the cart is left untouched.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::NotAuthenticated` without an identity, or when
    /// the cart is not loaded for it.
    /// Returns `CheckoutError::EmptyCart` if the cart has no lines.
    /// Returns `CheckoutError::Validation` if a shipping field is empty.
    /// Returns `CheckoutError::OrderCreationFailed` if the backend rejects or
    /// does not confirm the order.
    /// Returns `CheckoutError::Network` if the backend cannot be reached.
    #[instrument(skip_all, fields(payment_method = %payment_method))]
    pub async fn submit<C, K>(
        &self,
        identity: Option<&Identity>,
        cart: &mut CartReconciler<C>,
        catalog: &mut CatalogClient<K>,
        shipping: ShippingInfo,
        payment_method: PaymentMethod,
    ) -> Result<OrderConfirmation, CheckoutError>
    where
        C: StoreApi,
        K: StoreApi,
    {
        let identity = identity.ok_or(CheckoutError::NotAuthenticated)?;
        if cart.user_key() != Some(&identity.email) {
            return Err(CheckoutError::NotAuthenticated);
        }
        if cart.lines().is_empty() {
            return Err(CheckoutError::EmptyCart);
        }
        shipping.validate()?;

        let products = catalog.list_products(&ProductQuery::all()).await;
        let items: Vec<CartLine> = cart
            .lines()
            .iter()
            .map(|line| {
                let product = products
                    .iter()
                    .find(|p| p.id == line.product_id)
                    .cloned()
                    .or_else(|| line.product.clone());
                CartLine {
                    product,
                    ..line.clone()
                }
            })
            .collect();
        let totals = OrderTotals::for_lines(&items);

        let request = CreateOrderRequest {
            user_id: identity.id,
            items,
            total: totals.total,
            shipping: totals.shipping,
            payment_method,
        };

        let response = match self.api.create_order(&request).await {
            Ok(response) => response,
            Err(e) if e.is_transport() => return Err(CheckoutError::Network(e)),
            Err(e) => {
                warn!(error = %e, "Order creation rejected");
                return Err(CheckoutError::OrderCreationFailed(e.to_string()));
            }
        };

        let order_id = match (response.success, response.order_id) {
            (true, Some(order_id)) => order_id,
            _ => {
                let reason = response
                    .message
                    .unwrap_or_else(|| "the backend did not confirm the order".to_string());
                warn!(reason = %reason, "Order not confirmed");
                return Err(CheckoutError::OrderCreationFailed(reason));
            }
        };

        info!(order_id = %order_id, total = %totals.total, "Order placed");

        if let Err(e) = cart.clear().await {
            warn!(error = %e, order_id = %order_id, "Cart not cleared remotely after order");
        }

        Ok(OrderConfirmation {
            order_id,
            items: request.items,
            totals,
            shipping,
            payment_method,
        })
    }
}
