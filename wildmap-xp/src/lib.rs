//! wildmap-xp library - xeno-canto proxy
//!
//! Forwards a caller's recordings query to the xeno-canto API with the
//! server-held key attached and returns the upstream JSON as-is.

use axum::Router;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod credential;
pub mod error;
pub mod upstream;

pub use credential::Credential;
pub use error::{ProxyError, ProxyResult};
pub use upstream::{UpstreamError, XenoCantoClient};

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Upstream API client
    pub upstream: Arc<XenoCantoClient>,
    /// API key source
    pub credential: Credential,
    /// Service startup timestamp for uptime reporting
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(upstream: XenoCantoClient, credential: Credential) -> Self {
        Self {
            upstream: Arc::new(upstream),
            credential,
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::recordings_routes())
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        // The map page is served from another origin
        .layer(CorsLayer::permissive())
        .with_state(state)
}
