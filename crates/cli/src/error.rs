//! CLI error type.

use thiserror::Error;

use tienda_admin::AdminError;
use tienda_storefront::error::AppError;

/// Errors from a storefront or back-office command.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    App(#[from] AppError),

    #[error(transparent)]
    Admin(#[from] AdminError),
}

impl CliError {
    /// Capture internal failures to Sentry and log them.
    pub fn report(&self) {
        match self {
            Self::App(err) => err.report(),
            Self::Admin(err @ AdminError::Api(api)) if !api.is_not_found() => {
                let event_id = sentry::capture_error(err);
                tracing::error!(
                    error = %err,
                    sentry_event_id = %event_id,
                    "Admin operation failed"
                );
            }
            Self::Admin(err) => tracing::debug!(error = %err, "Admin operation rejected"),
        }
    }

    /// A message safe to show the user.
    pub fn user_message(&self) -> String {
        match self {
            Self::App(err) => err.user_message(),
            Self::Admin(err) => err.user_message(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CliError>;
