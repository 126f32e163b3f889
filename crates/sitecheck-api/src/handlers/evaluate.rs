use std::sync::Arc;

use axum::{extract::State, Json};

use crate::dto::{EvaluateRequest, EvaluateResponse};
use crate::error::ApiError;
use crate::services::EvaluationService;
use crate::state::AppState;

pub async fn evaluate_site(
    State(state): State<Arc<AppState>>,
    Json(request): Json<EvaluateRequest>,
) -> Result<Json<EvaluateResponse>, ApiError> {
    tracing::info!("Processing evaluate request");

    let response = EvaluationService::evaluate(state, request.site_geojson).await?;

    Ok(Json(response))
}
