//! Error types for wildmap-xp
//!
//! Every failure is reported to the caller as `{"error": "<message>"}`.
//! Error responses carry no `Content-Type`; only a successful
//! passthrough is labelled `application/json`.

use axum::{
    body::Body,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::upstream::UpstreamError;

/// Proxy request error
#[derive(Debug, Error)]
pub enum ProxyError {
    /// `query` parameter absent or empty (400)
    #[error("Missing query parameter")]
    MissingQuery,

    /// Upstream call failed (500)
    #[error(transparent)]
    Upstream(#[from] UpstreamError),
}

impl ProxyError {
    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::MissingQuery => StatusCode::BAD_REQUEST,
            ProxyError::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = json!({ "error": self.to_string() }).to_string();
        (status, Body::from(body)).into_response()
    }
}

/// Result type for proxy handlers
pub type ProxyResult<T> = Result<T, ProxyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_query_maps_to_400() {
        let err = ProxyError::MissingQuery;
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "Missing query parameter");
    }

    #[test]
    fn test_upstream_message_passes_through() {
        let err = ProxyError::from(UpstreamError::Decode("expected value at line 1 column 1".into()));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_string(), "expected value at line 1 column 1");
    }

    #[test]
    fn test_error_response_has_no_content_type() {
        let response = ProxyError::MissingQuery.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(response.headers().get("content-type").is_none());
    }
}
