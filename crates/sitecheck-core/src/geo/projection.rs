//! Reprojection of analysis results into map-ready GeoJSON.

use serde_json::{Map, Value as JsonValue};

use crate::config::EngineConfig;
use crate::error::Result;
use crate::formats::to_geojson_geometry;
use crate::geo::analysis::ProximityAnalysis;
use crate::geo::convert::flatten_geo_geometry;
use crate::geo::transform::CrsTransformer;
use crate::models::{AttributeKeys, Crs, Feature, Geometry, MapData};

/// Turns metric-CRS analysis output into display-CRS feature collections
#[derive(Debug, Clone)]
pub struct ResultProjector {
    metric_crs: Crs,
    display_crs: Crs,
    attributes: AttributeKeys,
}

impl ResultProjector {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            metric_crs: config.metric_crs.clone(),
            display_crs: config.display_crs.clone(),
            attributes: config.attributes.clone(),
        }
    }

    /// Build the map payload for an analysis. Metrics are not touched.
    pub fn project(&self, analysis: &ProximityAnalysis<'_>) -> Result<MapData> {
        let transformer = CrsTransformer::new(&self.metric_crs, &self.display_crs)?;

        let site_parts = flatten_geo_geometry(&analysis.site);
        let site = self.collection(
            &transformer,
            site_parts.iter().map(|g| (g, Self::role("site"))),
        )?;

        let nearest_settlement = self.collection(
            &transformer,
            analysis
                .nearest_settlement
                .iter()
                .map(|f| (&f.geometry, self.labels(f, "nearest_settlement"))),
        )?;

        let distance_line = self.collection(
            &transformer,
            analysis.distance_line.iter().map(|line| {
                let mut properties = Self::role("distance_line");
                if let Some(distance) = analysis.metrics.distance_to_settlements_m {
                    properties.insert("distance_m".to_string(), JsonValue::from(distance));
                }
                (line, properties)
            }),
        )?;

        let protected_areas = self.collection(
            &transformer,
            analysis
                .protected_areas
                .iter()
                .map(|f| (&f.geometry, self.labels(f, "protected_area"))),
        )?;

        Ok(MapData { site, nearest_settlement, distance_line, protected_areas })
    }

    fn role(role: &str) -> Map<String, JsonValue> {
        let mut properties = Map::new();
        properties.insert("role".to_string(), JsonValue::from(role));
        properties
    }

    fn labels(&self, feature: &Feature, role: &str) -> Map<String, JsonValue> {
        let mut properties = Self::role(role);
        if let Some(name) = feature.name(&self.attributes) {
            properties.insert("name".to_string(), JsonValue::from(name));
        }
        if let Some(kind) = feature.kind(&self.attributes) {
            properties.insert("type".to_string(), JsonValue::from(kind));
        }
        properties
    }

    /// Reproject and serialize; `None` when there is nothing to show
    fn collection<'g>(
        &self,
        transformer: &CrsTransformer,
        items: impl IntoIterator<Item = (&'g Geometry, Map<String, JsonValue>)>,
    ) -> Result<Option<geojson::FeatureCollection>> {
        let features = items
            .into_iter()
            .map(|(geometry, properties)| {
                let projected = transformer.transform_geometry(geometry)?;
                Ok(geojson::Feature {
                    bbox: None,
                    geometry: Some(to_geojson_geometry(&projected)),
                    id: None,
                    properties: Some(properties),
                    foreign_members: None,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        if features.is_empty() {
            return Ok(None);
        }

        Ok(Some(geojson::FeatureCollection { bbox: None, features, foreign_members: None }))
    }
}
