//! Domain models for the storefront client.
//!
//! These are the locally owned shapes: the signed-in identity, local
//! credential records and cart lines. Backend wire types live in
//! [`crate::api::types`].

pub mod cart;
pub mod identity;
pub mod session;

pub use cart::CartLine;
pub use identity::{Identity, StoredCredential};
