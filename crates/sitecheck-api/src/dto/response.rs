use serde::Serialize;
use sitecheck_core::models::{MapData, SiteMetrics};
use sitecheck_core::rules::RuleEvaluation;
use sitecheck_core::geo::SpatialIndex;

/// Site evaluation response
#[derive(Debug, Serialize)]
pub struct EvaluateResponse {
    pub geo_metrics: SiteMetrics,
    pub map_data: MapData,
    pub rule_results: RuleEvaluation,
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self { status: "ok", service: "sitecheck-api" }
    }
}

/// One reference dataset as currently indexed
#[derive(Debug, Serialize)]
pub struct DatasetStatus {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    pub feature_count: usize,
    pub indexed_count: usize,
}

impl DatasetStatus {
    pub fn from_index(path: Option<String>, index: &SpatialIndex) -> Self {
        Self { path, feature_count: index.len(), indexed_count: index.indexed_len() }
    }
}

/// Reference data status response
#[derive(Debug, Serialize)]
pub struct ReferenceStatusResponse {
    pub metric_crs: String,
    pub display_crs: String,
    pub settlements: DatasetStatus,
    pub protected_areas: DatasetStatus,
}

/// Reference reload response
#[derive(Debug, Serialize)]
pub struct ReloadResponse {
    pub success: bool,
    pub message: String,
    pub reference: ReferenceStatusResponse,
}
