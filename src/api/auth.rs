//! API key gate
//!
//! Rejects a request with 401 before it reaches a handler unless the
//! `x-api-key` header equals the configured secret.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use tracing::debug;

use super::handlers::AppState;
use crate::error::{Result, TodoError};

/// Header carrying the shared secret.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Middleware that key-gates every route it is layered on.
pub async fn require_api_key(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response> {
    let matches = request
        .headers()
        .get(API_KEY_HEADER)
        .map(|value| keys_match(value.as_bytes(), state.api_key.as_bytes()));

    match matches {
        Some(true) => Ok(next.run(request).await),
        Some(false) => {
            debug!("Rejected request to {} with wrong API key", request.uri().path());
            Err(TodoError::Unauthorized)
        }
        None => {
            debug!("Rejected request to {} without API key", request.uri().path());
            Err(TodoError::Unauthorized)
        }
    }
}

/// Compares two keys without short-circuiting on the first differing byte.
fn keys_match(supplied: &[u8], expected: &[u8]) -> bool {
    if supplied.len() != expected.len() {
        return false;
    }
    supplied
        .iter()
        .zip(expected)
        .fold(0u8, |acc, (a, b)| acc | (a ^ b))
        == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_match() {
        assert!(keys_match(b"secret", b"secret"));
        assert!(!keys_match(b"secreT", b"secret"));
        assert!(!keys_match(b"secret ", b"secret"));
        assert!(!keys_match(b"", b"secret"));
    }
}
