//! Recordings passthrough endpoint

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::header,
    routing::get,
    Router,
};
use serde::Deserialize;
use tracing::{error, warn};

use crate::{AppState, ProxyError, ProxyResult};

#[derive(Debug, Deserialize)]
pub struct RecordingsParams {
    pub query: Option<String>,
}

/// GET /api/xeno?query=<string>
///
/// 200 with the upstream JSON bytes, 400 when `query` is missing or
/// empty, 500 with the failure message when the upstream call fails.
pub async fn proxy_recordings(
    State(state): State<AppState>,
    Query(params): Query<RecordingsParams>,
) -> ProxyResult<([(header::HeaderName, &'static str); 1], Bytes)> {
    let query = params
        .query
        .filter(|q| !q.is_empty())
        .ok_or(ProxyError::MissingQuery)?;

    let key = state.credential.read().unwrap_or_else(|| {
        warn!(
            source = %state.credential.source(),
            "Upstream API key not set, forwarding without one"
        );
        String::new()
    });

    match state.upstream.search(&query, &key).await {
        Ok(body) => Ok(([(header::CONTENT_TYPE, "application/json")], body)),
        Err(e) => {
            error!(query = %query, "Upstream query failed: {}", e);
            Err(e.into())
        }
    }
}

/// Build recordings routes
pub fn recordings_routes() -> Router<AppState> {
    Router::new().route("/api/xeno", get(proxy_recordings))
}
