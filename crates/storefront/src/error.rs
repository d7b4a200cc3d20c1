//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` over the component errors. Front ends call
//! [`AppError::report`] once per failure and show [`AppError::user_message`],
//! which never exposes transport or storage detail.

use thiserror::Error;

use crate::services::cart::CartError;
use crate::services::catalog::CatalogError;
use crate::services::checkout::CheckoutError;
use crate::services::session::AuthError;

/// Application-level error type for the storefront client.
#[derive(Debug, Error)]
pub enum AppError {
    /// Session operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Catalog lookup failed.
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Cart operation failed.
    #[error("Cart error: {0}")]
    Cart(#[from] CartError),

    /// Checkout failed.
    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutError),
}

impl AppError {
    /// Whether the failure is on our side rather than the user's.
    #[must_use]
    pub const fn is_internal(&self) -> bool {
        matches!(
            self,
            Self::Auth(AuthError::Storage(_) | AuthError::PasswordHash)
                | Self::Catalog(CatalogError::Api(_))
                | Self::Cart(CartError::Sync { .. })
                | Self::Checkout(CheckoutError::Network(_))
        )
    }

    /// Capture internal failures to Sentry and log them.
    pub fn report(&self) {
        if self.is_internal() {
            let event_id = sentry::capture_error(self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Operation failed"
            );
        } else {
            tracing::debug!(error = %self, "Operation rejected");
        }
    }

    /// A message safe to show the user.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Catalog(CatalogError::Api(_)) => {
                "The store is not reachable right now, please try again".to_string()
            }
            Self::Auth(err) => match err {
                AuthError::InvalidCredentials => "Invalid email or password".to_string(),
                AuthError::UserNotFound => "No account uses this email".to_string(),
                AuthError::DuplicateEmail => {
                    "An account with this email already exists".to_string()
                }
                AuthError::InvalidEmail(_) => "Invalid email address".to_string(),
                AuthError::NotAuthenticated => "Please log in first".to_string(),
                AuthError::Validation(_) | AuthError::WeakPassword { .. } => err.to_string(),
                AuthError::Storage(_) | AuthError::PasswordHash => {
                    "Authentication error".to_string()
                }
            },
            Self::Catalog(CatalogError::NotFound(id)) => format!("Product {id} does not exist"),
            Self::Cart(err) => match err {
                CartError::NotAuthenticated => "Please log in to use the cart".to_string(),
                CartError::Sync { .. } => {
                    "Your cart changed here but could not be saved to the store".to_string()
                }
                CartError::Validation(_) | CartError::LineNotFound(_) => err.to_string(),
            },
            Self::Checkout(err) => match err {
                CheckoutError::NotAuthenticated => "Please log in to check out".to_string(),
                CheckoutError::EmptyCart => "Your cart is empty".to_string(),
                CheckoutError::Validation(_) => err.to_string(),
                CheckoutError::OrderCreationFailed(_) => {
                    "The order could not be placed, please try again".to_string()
                }
                CheckoutError::Network(_) => {
                    "The store is not reachable right now, please try again".to_string()
                }
            },
        }
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of user actions
/// leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("cart", "Added to cart", Some(&[("product_id", "12")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiError;
    use tienda_core::ProductId;

    #[test]
    fn test_app_error_display() {
        let err = AppError::from(AuthError::NotAuthenticated);
        assert_eq!(err.to_string(), "Auth error: not authenticated");

        let err = AppError::from(CheckoutError::EmptyCart);
        assert_eq!(err.to_string(), "Checkout error: the cart is empty");
    }

    #[test]
    fn test_user_message_hides_internal_detail() {
        let err = AppError::from(CatalogError::Api(ApiError::Status {
            status: reqwest::StatusCode::INTERNAL_SERVER_ERROR,
            body: "stack trace at db.js:12".to_string(),
        }));
        assert!(err.is_internal());
        assert!(!err.user_message().contains("db.js"));

        let err = AppError::from(AuthError::InvalidCredentials);
        assert!(!err.is_internal());
        assert_eq!(err.user_message(), "Invalid email or password");
    }

    #[test]
    fn test_user_message_passes_validation_through() {
        let err = AppError::from(AuthError::WeakPassword { min: 6 });
        assert_eq!(
            err.user_message(),
            "password must be at least 6 characters"
        );

        let err = AppError::from(CartError::LineNotFound(ProductId::new(4)));
        assert_eq!(err.user_message(), "product 4 is not in the cart");
    }

    #[test]
    fn test_cart_sync_is_internal() {
        let err = AppError::from(CartError::Sync {
            operation: crate::services::cart::CartOperation::Clear,
            source: ApiError::NotFound("/cart/clear/x".to_string()),
        });
        assert!(err.is_internal());
        assert!(err.user_message().contains("could not be saved"));
    }
}
