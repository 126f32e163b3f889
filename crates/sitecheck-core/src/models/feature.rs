//! Features and feature collections consumed by the engine.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::geometry::{Crs, Geometry};

/// Ordered candidate attribute keys used to read a feature's name and type.
///
/// Reference datasets come from several sources with different column names,
/// so the first key holding a non-empty value wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeKeys {
    pub name: Vec<String>,
    pub kind: Vec<String>,
}

impl Default for AttributeKeys {
    fn default() -> Self {
        Self {
            name: ["name", "NAME", "gebietsname", "bezeichner"]
                .into_iter()
                .map(String::from)
                .collect(),
            kind: [
                "type",
                "typ",
                "TYP",
                "gebietstyp",
                "SCHUTZKAT",
                "schutzkategorie",
                "source_layer",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
        }
    }
}

/// A geometry plus its attributes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub geometry: Geometry,
    #[serde(default)]
    pub properties: Map<String, Value>,
}

impl Feature {
    pub fn new(geometry: Geometry) -> Self {
        Self { id: None, geometry, properties: Map::new() }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// Read the first non-empty attribute among `keys` as a string
    pub fn attribute(&self, keys: &[String]) -> Option<String> {
        keys.iter().find_map(|key| match self.properties.get(key)? {
            Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        })
    }

    pub fn name(&self, keys: &AttributeKeys) -> Option<String> {
        self.attribute(&keys.name)
    }

    pub fn kind(&self, keys: &AttributeKeys) -> Option<String> {
        self.attribute(&keys.kind)
    }

    /// Same attributes and id, different geometry
    pub fn with_geometry(&self, geometry: Geometry) -> Self {
        Self { id: self.id.clone(), geometry, properties: self.properties.clone() }
    }
}

/// An ordered set of features sharing one CRS.
///
/// `crs` is `None` when the source did not declare one; the normalizer
/// assigns the configured default before reprojecting.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FeatureCollection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crs: Option<Crs>,
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    pub fn new(crs: Crs, features: Vec<Feature>) -> Self {
        Self { crs: Some(crs), features }
    }

    /// A collection whose CRS was not declared by its source
    pub fn undeclared(features: Vec<Feature>) -> Self {
        Self { crs: None, features }
    }

    pub fn empty(crs: Crs) -> Self {
        Self::new(crs, Vec::new())
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Feature> {
        self.features.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_attribute_lookup_order() {
        let keys = AttributeKeys::default();
        let feature = Feature::new(Geometry::point(0.0, 0.0))
            .with_property("NAME", "Upper")
            .with_property("gebietsname", "Lower");

        assert_eq!(feature.name(&keys).as_deref(), Some("Upper"));
        assert_eq!(feature.kind(&keys), None);
    }

    #[test]
    fn test_attribute_skips_blank_and_null() {
        let keys = AttributeKeys::default();
        let feature = Feature::new(Geometry::point(0.0, 0.0))
            .with_property("name", "  ")
            .with_property("NAME", Value::Null)
            .with_property("bezeichner", "Ortslage Nord")
            .with_property("SCHUTZKAT", "NSG");

        assert_eq!(feature.name(&keys).as_deref(), Some("Ortslage Nord"));
        assert_eq!(feature.kind(&keys).as_deref(), Some("NSG"));
    }

    #[test]
    fn test_numeric_attribute_stringified() {
        let feature = Feature::new(Geometry::point(0.0, 0.0)).with_property("code", json!(42));
        assert_eq!(feature.attribute(&["code".to_string()]).as_deref(), Some("42"));
    }

    #[test]
    fn test_with_geometry_keeps_attributes() {
        let feature = Feature::new(Geometry::point(0.0, 0.0))
            .with_id("a-1")
            .with_property("name", "Dorf");
        let moved = feature.with_geometry(Geometry::point(5.0, 5.0));

        assert_eq!(moved.id.as_deref(), Some("a-1"));
        assert_eq!(moved.properties, feature.properties);
        assert_eq!(moved.geometry, Geometry::point(5.0, 5.0));
    }

    #[test]
    fn test_collection_serde_omits_missing_crs() {
        let collection = FeatureCollection::undeclared(vec![Feature::new(Geometry::point(1.0, 2.0))]);
        let value = serde_json::to_value(&collection).unwrap();
        assert!(value.get("crs").is_none());
        assert_eq!(collection.len(), 1);
    }
}
