//! Map view endpoints
//!
//! The browser owns the real map widget. It asks the service to load a
//! dataset, replays the returned commands, and forwards layer events to get
//! back the popup or cursor change to apply. Every call names the client
//! (`?client=<id>`) whose map it concerns; without one the shared
//! `default` client is used.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::debug;
use wildmap_common::ResolvedDataset;

use crate::clients::{validate_client_id, DEFAULT_CLIENT};
use crate::error::{ApiError, ApiResult, LoadError};
use crate::loader::log_load_failure;
use crate::popup::{LayerEvent, MapEffect};
use crate::surface::MapCommand;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ClientParams {
    pub client: Option<String>,
}

impl ClientParams {
    /// Validated client id, `default` when absent
    pub fn client_id(self) -> ApiResult<String> {
        let id = self.client.unwrap_or_else(|| DEFAULT_CLIENT.to_string());
        validate_client_id(&id)?;
        Ok(id)
    }
}

/// What became of a load request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadOutcome {
    /// Shown on the map
    Applied,
    /// A newer load was already shown; nothing changed
    Superseded,
    /// Fetch or parse failed; nothing changed
    Failed,
}

impl LoadOutcome {
    /// Outcome reported for a load that did not reach the map
    pub fn of(error: &LoadError) -> Self {
        match error {
            LoadError::Superseded { .. } => LoadOutcome::Superseded,
            _ => LoadOutcome::Failed,
        }
    }
}

/// Result of a load request
#[derive(Debug, Serialize)]
pub struct LoadResponse {
    pub dataset: ResolvedDataset,
    pub outcome: LoadOutcome,
    /// Failure message when `outcome` is not `applied`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub feature_count: usize,
    /// Widget operations to replay, oldest first
    pub commands: Vec<MapCommand>,
}

/// Snapshot of one client's map view
#[derive(Debug, Default, Serialize)]
pub struct ViewStateResponse {
    pub active_dataset: Option<ResolvedDataset>,
    pub feature_count: usize,
    pub layer_installed: bool,
    pub applied_generation: u64,
    pub pending_commands: usize,
}

/// POST /api/view/load/:dataset?client=<id>
///
/// Failures are logged and answered with an empty command list; the map
/// keeps showing whatever it showed before.
pub async fn load_dataset(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(params): Query<ClientParams>,
) -> ApiResult<Json<LoadResponse>> {
    let client = params.client_id()?;
    let view = state.views.get_or_create(&client).await;
    let loader = &state.loader;
    let ticket = loader.begin(&name);

    let result = match loader.fetch(&ticket).await {
        Ok(collection) => {
            // Apply and drain under one lock
            let mut view = view.lock().await;
            loader
                .apply(&ticket, &mut *view, &collection)
                .map(|()| (collection.len(), view.surface_mut().drain()))
        }
        Err(e) => Err(e),
    };

    let response = match result {
        Ok((feature_count, commands)) => LoadResponse {
            dataset: ticket.dataset,
            outcome: LoadOutcome::Applied,
            error: None,
            feature_count,
            commands,
        },
        Err(e) => {
            log_load_failure(&name, &e);
            LoadResponse {
                dataset: ticket.dataset,
                outcome: LoadOutcome::of(&e),
                error: Some(e.to_string()),
                feature_count: 0,
                commands: Vec::new(),
            }
        }
    };

    Ok(Json(response))
}

/// POST /api/view/event?client=<id>
pub async fn handle_event(
    State(state): State<AppState>,
    Query(params): Query<ClientParams>,
    Json(event): Json<LayerEvent>,
) -> ApiResult<Json<MapEffect>> {
    let client = params.client_id()?;
    let no_layer = || ApiError::Conflict("No recordings layer on the map yet".to_string());

    let view = state.views.get(&client).await.ok_or_else(no_layer)?;
    let effect = view.lock().await.handle_event(&event);
    effect.map(Json).ok_or_else(no_layer)
}

/// POST /api/view/reset?client=<id>
///
/// Called by a client that has just built a fresh map widget.
pub async fn reset_view(
    State(state): State<AppState>,
    Query(params): Query<ClientParams>,
) -> ApiResult<StatusCode> {
    let client = params.client_id()?;
    state.views.reset(&client).await;
    debug!(client = %client, "Map view reset");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/view/state?client=<id>
pub async fn view_state(
    State(state): State<AppState>,
    Query(params): Query<ClientParams>,
) -> ApiResult<Json<ViewStateResponse>> {
    let client = params.client_id()?;
    let Some(view) = state.views.get(&client).await else {
        return Ok(Json(ViewStateResponse::default()));
    };

    let view = view.lock().await;
    Ok(Json(ViewStateResponse {
        active_dataset: view.active_dataset().cloned(),
        feature_count: view.feature_count(),
        layer_installed: view.is_layer_installed(),
        applied_generation: view.applied_generation(),
        pending_commands: view.surface().commands().len(),
    }))
}

pub fn view_routes() -> Router<AppState> {
    Router::new()
        .route("/api/view/load/:dataset", post(load_dataset))
        .route("/api/view/event", post(handle_event))
        .route("/api/view/reset", post(reset_view))
        .route("/api/view/state", get(view_state))
}
