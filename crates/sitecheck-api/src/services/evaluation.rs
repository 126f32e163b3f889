use std::sync::Arc;

use serde_json::Value as JsonValue;
use sitecheck_core::formats::GeoJsonReader;
use sitecheck_core::models::AnalysisOutcome;
use sitecheck_core::rules;

use crate::dto::EvaluateResponse;
use crate::error::ApiError;
use crate::state::AppState;

/// Service for evaluating candidate sites
pub struct EvaluationService;

impl EvaluationService {
    /// Analyze a site against the current reference data and apply the rules
    pub async fn evaluate(
        state: Arc<AppState>,
        site_geojson: JsonValue,
    ) -> Result<EvaluateResponse, ApiError> {
        // Reprojection and geometry work is CPU-bound
        tokio::task::spawn_blocking(move || Self::evaluate_blocking(&state, site_geojson))
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Evaluation task failed");
                ApiError::internal("Evaluation task failed").with_details(e.to_string())
            })?
    }

    fn evaluate_blocking(
        state: &AppState,
        site_geojson: JsonValue,
    ) -> Result<EvaluateResponse, ApiError> {
        let site = GeoJsonReader.from_value(site_geojson)?;

        let result = match state.engine.analyze(&site)? {
            AnalysisOutcome::EmptySite => {
                return Err(ApiError::unprocessable("Site contains no features"));
            }
            AnalysisOutcome::Complete(result) => result,
        };

        let rule_results = rules::evaluate(&result.metrics, &state.rules);

        tracing::info!(
            distance_m = ?result.metrics.distance_to_settlements_m,
            overlaps = result.metrics.overlaps_protected_area,
            compliant = rule_results.is_compliant,
            "Site evaluated"
        );

        Ok(EvaluateResponse { geo_metrics: result.metrics, map_data: result.map_data, rule_results })
    }
}
