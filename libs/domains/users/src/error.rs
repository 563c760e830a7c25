use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum UserError {
    #[error("User not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    /// Any other store failure; the message keeps the driver's cause
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Operation cancelled")]
    Cancelled,
}

pub type UserResult<T> = Result<T, UserError>;

impl UserError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, UserError::NotFound(_))
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, UserError::Cancelled)
    }

    /// Prefix a storage failure with the use-case that hit it.
    ///
    /// Other kinds pass through untouched so callers can still match on them.
    pub fn within(self, context: &str) -> Self {
        match self {
            UserError::Storage(cause) => UserError::Storage(format!("{context}: {cause}")),
            other => other,
        }
    }
}

impl From<mongodb::error::Error> for UserError {
    fn from(err: mongodb::error::Error) -> Self {
        UserError::Storage(err.to_string())
    }
}

impl From<validator::ValidationErrors> for UserError {
    fn from(err: validator::ValidationErrors) -> Self {
        UserError::Validation(err.to_string())
    }
}

impl IntoResponse for UserError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match &self {
            UserError::NotFound(id) => (
                StatusCode::NOT_FOUND,
                "not_found",
                format!("User {} not found", id),
            ),
            UserError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, "validation_error", msg.clone())
            }
            UserError::Storage(msg) => {
                tracing::error!(error = %msg, "Storage error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                )
            }
            UserError::Cancelled => (
                StatusCode::SERVICE_UNAVAILABLE,
                "cancelled",
                "The request was cancelled before it completed".to_string(),
            ),
        };

        (
            status,
            Json(json!({
                "error": {
                    "type": error_type,
                    "message": message
                }
            })),
        )
            .into_response()
    }
}
