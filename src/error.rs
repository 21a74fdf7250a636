//! Error types for the to-do list service
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Todo Error Enum ==
/// Unified error type for the to-do list service.
#[derive(Error, Debug)]
pub enum TodoError {
    /// List or item absent
    #[error("{0}")]
    NotFound(String),

    /// Missing or incorrect API key
    #[error("Invalid or missing API key")]
    Unauthorized,

    /// Request body failed to parse or is missing a required field
    #[error("Validation error: {0}")]
    Validation(String),

    /// A document with the same id already exists
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Document store unreachable, timed out, or out of connections
    #[error("Service unavailable: {0}")]
    Unavailable(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl TodoError {
    /// Status code the error maps to.
    pub fn status_code(&self) -> StatusCode {
        match self {
            TodoError::NotFound(_) => StatusCode::NOT_FOUND,
            TodoError::Unauthorized => StatusCode::UNAUTHORIZED,
            TodoError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            TodoError::Conflict(_) => StatusCode::CONFLICT,
            TodoError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            TodoError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub(crate) fn list_not_found() -> Self {
        TodoError::NotFound("List not found".to_string())
    }

    pub(crate) fn item_not_found() -> Self {
        TodoError::NotFound("Item not found".to_string())
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for TodoError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the to-do list service.
pub type Result<T> = std::result::Result<T, TodoError>;
