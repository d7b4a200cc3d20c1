//! Admin error types.

use thiserror::Error;

use tienda_storefront::api::ApiError;

/// Errors that can occur during back-office operations.
#[derive(Debug, Error)]
pub enum AdminError {
    /// Invalid input, rejected before any request.
    #[error("{0}")]
    Validation(String),

    /// The entity is not in the cached collections.
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    /// The entity cannot move to the requested state.
    #[error("invalid transition: {0}")]
    InvalidTransition(String),

    /// The backend rejected the request or could not be reached.
    #[error("API error: {0}")]
    Api(#[from] ApiError),
}

impl AdminError {
    /// A message safe to show an operator.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Api(ApiError::Http(_)) => {
                "The store is not reachable right now, please try again".to_string()
            }
            Self::Api(ApiError::NotFound(_)) => "The store no longer has this record".to_string(),
            Self::Api(_) => "The store rejected the change".to_string(),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = AdminError::NotFound {
            entity: "order",
            id: 12,
        };
        assert_eq!(err.to_string(), "order 12 not found");

        let err = AdminError::Validation("name is required".to_string());
        assert_eq!(err.user_message(), "name is required");
    }

    #[test]
    fn test_user_message_hides_backend_body() {
        let err = AdminError::from(ApiError::Status {
            status: reqwest::StatusCode::BAD_REQUEST,
            body: "SQLITE_CONSTRAINT".to_string(),
        });
        assert_eq!(err.user_message(), "The store rejected the change");
    }
}
