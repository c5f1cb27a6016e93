//! Error types for wildmap-mv

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Why a dataset load did not reach the map.
///
/// Whatever the variant, the map state is left exactly as it was.
#[derive(Debug, Error)]
pub enum LoadError {
    /// Feed name that would escape the feed root
    #[error("Invalid feed name: {0}")]
    InvalidName(String),

    /// Network failure fetching the feed
    #[error("Fetch failed: {0}")]
    Fetch(String),

    /// Feed server answered with a non-success status
    #[error("Feed {file} returned HTTP {status}")]
    Status { file: String, status: u16 },

    /// Reading a local feed failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Feed was not valid feed JSON
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// A newer load has already been applied
    #[error("Load {generation} superseded by load {applied}")]
    Superseded { generation: u64, applied: u64 },
}

/// API error type for the viewer service
#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed request (400)
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Request not valid in the current map state (409)
    #[error("Conflict: {0}")]
    Conflict(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg),
        };

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
