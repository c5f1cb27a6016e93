//! HTTP API handlers for wildmap-mv

pub mod datasets;
pub mod health;
pub mod ui;
pub mod view;

use axum::{routing::get, Router};

use crate::AppState;

pub use datasets::dataset_routes;
pub use health::health_routes;
pub use view::view_routes;

/// Build UI routes
pub fn ui_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(ui::serve_index))
        .route("/static/app.js", get(ui::serve_app_js))
}
