use std::sync::Arc;

use axum::{extract::State, Json};

use crate::dto::{ReferenceStatusResponse, ReloadResponse};
use crate::error::ApiError;
use crate::services::ReferenceService;
use crate::state::AppState;

/// GET /api/v1/reference - Counts and CRS of the indexed reference data
pub async fn reference_status(State(state): State<Arc<AppState>>) -> Json<ReferenceStatusResponse> {
    Json(ReferenceService::status(&state))
}

/// POST /api/v1/reference/reload - Re-read the datasets and swap the snapshot
pub async fn reload_reference(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ReloadResponse>, ApiError> {
    tracing::info!("Reloading reference data");

    let response = ReferenceService::reload(state).await?;

    Ok(Json(response))
}
