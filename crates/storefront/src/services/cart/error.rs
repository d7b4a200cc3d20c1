//! Cart error types.

use std::fmt;

use thiserror::Error;

use tienda_core::ProductId;

use crate::api::ApiError;

/// Remote cart mutation kinds, for error reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartOperation {
    Add,
    Decrease,
    Remove,
    Clear,
}

impl fmt::Display for CartOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Add => "add",
            Self::Decrease => "decrease",
            Self::Remove => "remove",
            Self::Clear => "clear",
        })
    }
}

/// Errors that can occur during cart operations.
#[derive(Debug, Error)]
pub enum CartError {
    /// The cart is not loaded for a signed-in identity.
    #[error("must log in to use the cart")]
    NotAuthenticated,

    /// Invalid input.
    #[error("invalid cart input: {0}")]
    Validation(String),

    /// The cart has no line for the product.
    #[error("product {0} is not in the cart")]
    LineNotFound(ProductId),

    /// The local change was applied but the backend did not confirm it.
    #[error("cart {operation} was not saved remotely: {source}")]
    Sync {
        operation: CartOperation,
        #[source]
        source: ApiError,
    },
}

impl CartError {
    /// Whether local state diverged from the backend.
    #[must_use]
    pub const fn is_sync(&self) -> bool {
        matches!(self, Self::Sync { .. })
    }
}
