//! Storefront services.
//!
//! # Services
//!
//! - `session` - signed-in identity and local credential records
//! - `catalog` - cached products, categories, users and orders
//! - `cart` - optimistic mirror of the server cart
//! - `checkout` - order placement
//!
//! Services are constructed explicitly and passed by reference. Data flows
//! session → cart (the identity email is the cart key) → checkout, which
//! re-resolves prices through the catalog and clears the cart.

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod session;

pub use cart::{CartError, CartReconciler, CartState};
pub use catalog::{CatalogClient, CatalogError};
pub use checkout::{CheckoutError, CheckoutOrchestrator, OrderConfirmation, ShippingInfo};
pub use session::{AuthError, SessionStore};
