use std::sync::Arc;

use crate::dto::{DatasetStatus, ReferenceStatusResponse, ReloadResponse};
use crate::error::ApiError;
use crate::state::AppState;

/// Service for inspecting and reloading reference datasets
pub struct ReferenceService;

impl ReferenceService {
    pub fn status(state: &AppState) -> ReferenceStatusResponse {
        let snapshot = state.engine.snapshot();
        let config = state.engine.config();
        let path_of = |p: &Option<std::path::PathBuf>| p.as_ref().map(|p| p.display().to_string());

        ReferenceStatusResponse {
            metric_crs: config.metric_crs.to_string(),
            display_crs: config.display_crs.to_string(),
            settlements: DatasetStatus::from_index(
                path_of(&state.datasets.settlements),
                &snapshot.settlements,
            ),
            protected_areas: DatasetStatus::from_index(
                path_of(&state.datasets.protected_areas),
                &snapshot.protected_areas,
            ),
        }
    }

    /// Reload the datasets; a failure leaves the current data in service
    pub async fn reload(state: Arc<AppState>) -> Result<ReloadResponse, ApiError> {
        let task_state = Arc::clone(&state);
        tokio::task::spawn_blocking(move || task_state.reload())
            .await
            .map_err(|e| ApiError::internal("Reload task failed").with_details(e.to_string()))?
            .map_err(|e| {
                tracing::error!(error = %e, "Reference reload failed");
                ApiError::internal("Reference reload failed").with_details(e.to_string())
            })?;

        let reference = Self::status(&state);
        Ok(ReloadResponse {
            success: true,
            message: format!(
                "Reloaded {} settlements and {} protected areas",
                reference.settlements.feature_count, reference.protected_areas.feature_count
            ),
            reference,
        })
    }
}
