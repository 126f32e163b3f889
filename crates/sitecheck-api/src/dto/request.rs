use serde::Deserialize;
use serde_json::Value as JsonValue;

/// Evaluate request body
#[derive(Debug, Deserialize)]
pub struct EvaluateRequest {
    /// FeatureCollection, Feature or bare Geometry
    pub site_geojson: JsonValue,
}
