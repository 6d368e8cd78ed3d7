//! Error types for the memoizing cache
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Cache Error Enum ==
/// Errors raised by the cache layer itself.
///
/// Failures of a wrapped computation are never converted into this type;
/// they travel back to the caller untouched.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Backing store unreachable or holding malformed data
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    /// Argument canonicalization or result encoding failed
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// No entry stored under the key
    #[error("Key not found: {0}")]
    NotFound(String),
}

impl From<redis::RedisError> for CacheError {
    fn from(err: redis::RedisError) -> Self {
        CacheError::StoreUnavailable(err.to_string())
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let status = match &self {
            CacheError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            CacheError::Serialization(_) => StatusCode::UNPROCESSABLE_ENTITY,
            CacheError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            CacheError::NotFound(_) => StatusCode::NOT_FOUND,
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the cache layer.
pub type Result<T> = std::result::Result<T, CacheError>;
