//! Output records produced by a site analysis.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SitecheckError};

/// Proximity and overlap metrics for one site.
///
/// `distance_to_settlements_m` is `None` when no settlement data is loaded,
/// which is not the same as "far away".
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SiteMetrics {
    pub distance_to_settlements_m: Option<f64>,
    pub overlaps_protected_area: bool,
    pub nearest_settlement_name: Option<String>,
    pub nearest_settlement_type: Option<String>,
    pub protected_area_name: Option<String>,
    pub protected_area_type: Option<String>,
}

/// Map-ready geometries in the display CRS.
///
/// A field is `None` when its source was absent; it is never an empty
/// collection.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MapData {
    pub site: Option<geojson::FeatureCollection>,
    pub nearest_settlement: Option<geojson::FeatureCollection>,
    pub distance_line: Option<geojson::FeatureCollection>,
    pub protected_areas: Option<geojson::FeatureCollection>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub metrics: SiteMetrics,
    pub map_data: MapData,
}

/// Result of analysing a site collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AnalysisOutcome {
    /// The site collection had no features; nothing was measured
    EmptySite,
    Complete(AnalysisResult),
}

impl AnalysisOutcome {
    pub fn is_empty_site(&self) -> bool {
        matches!(self, AnalysisOutcome::EmptySite)
    }

    pub fn metrics(&self) -> Option<&SiteMetrics> {
        match self {
            AnalysisOutcome::EmptySite => None,
            AnalysisOutcome::Complete(result) => Some(&result.metrics),
        }
    }

    /// Convert to a result for callers that require a site
    pub fn into_result(self) -> Result<AnalysisResult> {
        match self {
            AnalysisOutcome::EmptySite => Err(SitecheckError::EmptySiteInput),
            AnalysisOutcome::Complete(result) => Ok(result),
        }
    }
}
