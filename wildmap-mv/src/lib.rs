//! wildmap-mv library - recording map viewer
//!
//! Turns static recording feeds into a GeoJSON point layer and keeps a map
//! widget showing exactly one dataset at a time. The service side records
//! widget operations as [`surface::MapCommand`]s; the bundled browser client
//! replays them against MapLibre. Each browser tab has its own view state.

use axum::Router;
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use wildmap_common::DatasetCatalog;

pub mod api;
pub mod bounds;
pub mod clients;
pub mod error;
pub mod feature;
pub mod loader;
pub mod popup;
pub mod record;
pub mod surface;
pub mod view;

pub use clients::ViewRegistry;
pub use error::{ApiError, ApiResult, LoadError};
pub use feature::{Feature, FeatureCollection};
pub use loader::{DirFeedSource, FeedLoader, FeedSource, HttpFeedSource};
pub use surface::{CommandBuffer, MapCommand, MapSurface};
pub use view::MapViewState;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub loader: Arc<FeedLoader>,
    /// One map view per browser client
    pub views: Arc<ViewRegistry>,
    /// Dataset the client loads once its map is ready
    pub default_dataset: String,
    /// Directory served under `/feeds`
    pub feed_dir: PathBuf,
    /// Service startup timestamp for uptime reporting
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(
        loader: FeedLoader,
        views: ViewRegistry,
        default_dataset: String,
        feed_dir: PathBuf,
    ) -> Self {
        Self {
            loader: Arc::new(loader),
            views: Arc::new(views),
            default_dataset,
            feed_dir,
            startup_time: Utc::now(),
        }
    }

    pub fn catalog(&self) -> &DatasetCatalog {
        self.loader.catalog()
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    let feeds = ServeDir::new(&state.feed_dir);

    Router::new()
        .merge(api::ui_routes())
        .merge(api::dataset_routes())
        .merge(api::view_routes())
        .merge(api::health_routes())
        .nest_service("/feeds", feeds)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
