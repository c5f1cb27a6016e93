//! Dataset catalog endpoint

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use crate::AppState;

/// One selectable dataset
#[derive(Debug, Serialize)]
pub struct DatasetInfo {
    pub id: String,
    pub file: String,
    pub color: String,
}

#[derive(Debug, Serialize)]
pub struct DatasetsResponse {
    pub default_dataset: String,
    pub datasets: Vec<DatasetInfo>,
}

/// GET /api/datasets
pub async fn list_datasets(State(state): State<AppState>) -> Json<DatasetsResponse> {
    let datasets = state
        .catalog()
        .iter()
        .map(|(id, entry)| DatasetInfo {
            id: id.clone(),
            file: entry.file.clone(),
            color: entry.color.clone(),
        })
        .collect();

    Json(DatasetsResponse {
        default_dataset: state.default_dataset.clone(),
        datasets,
    })
}

pub fn dataset_routes() -> Router<AppState> {
    Router::new().route("/api/datasets", get(list_datasets))
}
