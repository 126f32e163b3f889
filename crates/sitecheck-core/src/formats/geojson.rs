//! GeoJSON reader and geometry conversion

use std::fs;
use std::path::Path;

use geojson::GeoJson;
use serde_json::{Map, Value as JsonValue};

use crate::error::{Result, SitecheckError};
use crate::models::{Coordinate, Crs, Feature, FeatureCollection, Geometry};

/// GeoJSON format reader
pub struct GeoJsonReader;

impl GeoJsonReader {
    /// Read a feature collection from a GeoJSON file
    pub fn read(&self, path: &Path) -> Result<FeatureCollection> {
        let content = fs::read_to_string(path)?;
        let collection = self.parse(&content)?;

        tracing::debug!(
            path = %path.display(),
            features = collection.len(),
            crs = ?collection.crs.as_ref().map(|c| c.epsg),
            "Loaded GeoJSON"
        );

        Ok(collection)
    }

    /// Parse GeoJSON text
    pub fn parse(&self, content: &str) -> Result<FeatureCollection> {
        let geojson: GeoJson = content.parse().map_err(|e| SitecheckError::InvalidGeoJson {
            reason: format!("Failed to parse GeoJSON: {}", e),
        })?;

        self.convert(geojson)
    }

    /// Convert an already-decoded JSON value, e.g. a request body
    pub fn from_value(&self, value: JsonValue) -> Result<FeatureCollection> {
        let geojson = GeoJson::from_json_value(value).map_err(|e| {
            SitecheckError::InvalidGeoJson { reason: format!("Failed to parse GeoJSON: {}", e) }
        })?;

        self.convert(geojson)
    }

    fn convert(&self, geojson: GeoJson) -> Result<FeatureCollection> {
        match geojson {
            GeoJson::FeatureCollection(fc) => {
                let crs = declared_crs(fc.foreign_members.as_ref())?;

                let mut features = Vec::with_capacity(fc.features.len());
                for (idx, feature) in fc.features.iter().enumerate() {
                    if let Some(converted) = convert_feature(feature, idx)? {
                        features.push(converted);
                    }
                }

                Ok(FeatureCollection { crs, features })
            }
            GeoJson::Feature(feature) => {
                let crs = declared_crs(feature.foreign_members.as_ref())?;
                let features = convert_feature(&feature, 0)?.into_iter().collect();
                Ok(FeatureCollection { crs, features })
            }
            GeoJson::Geometry(geom) => {
                let crs = declared_crs(geom.foreign_members.as_ref())?;
                // Bare geometry - wrap in a feature with no properties
                let features = convert_geometry(&geom)?
                    .map(Feature::new)
                    .into_iter()
                    .collect();
                Ok(FeatureCollection { crs, features })
            }
        }
    }
}

/// Convert a GeoJSON feature, skipping features without a usable geometry
fn convert_feature(feature: &geojson::Feature, idx: usize) -> Result<Option<Feature>> {
    let Some(geometry) = feature.geometry.as_ref() else {
        tracing::warn!(feature = idx, "Skipping feature without geometry");
        return Ok(None);
    };

    let Some(geometry) = convert_geometry(geometry)? else {
        tracing::warn!(feature = idx, "Skipping feature with unsupported geometry type");
        return Ok(None);
    };

    let id = feature.id.as_ref().map(|id| match id {
        geojson::feature::Id::String(s) => s.clone(),
        geojson::feature::Id::Number(n) => n.to_string(),
    });

    let properties: Map<String, JsonValue> = feature.properties.clone().unwrap_or_default();

    Ok(Some(Feature { id, geometry, properties }))
}

/// Convert a GeoJSON geometry; `None` for geometry collections
fn convert_geometry(geometry: &geojson::Geometry) -> Result<Option<Geometry>> {
    use geojson::Value;

    let converted = match &geometry.value {
        Value::Point(p) => Geometry::Point { coordinates: position(p)? },
        Value::MultiPoint(points) => Geometry::MultiPoint { coordinates: positions(points)? },
        Value::LineString(line) => Geometry::LineString { coordinates: positions(line)? },
        Value::MultiLineString(lines) => Geometry::MultiLineString {
            coordinates: lines.iter().map(|l| positions(l)).collect::<Result<_>>()?,
        },
        Value::Polygon(rings) => Geometry::Polygon {
            coordinates: rings.iter().map(|r| positions(r)).collect::<Result<_>>()?,
        },
        Value::MultiPolygon(polygons) => Geometry::MultiPolygon {
            coordinates: polygons
                .iter()
                .map(|rings| rings.iter().map(|r| positions(r)).collect::<Result<_>>())
                .collect::<Result<_>>()?,
        },
        Value::GeometryCollection(_) => return Ok(None),
    };

    Ok(Some(converted))
}

/// Keep x/y of a position, dropping any elevation
fn position(pos: &[f64]) -> Result<Coordinate> {
    match pos {
        [x, y, ..] if x.is_finite() && y.is_finite() => Ok([*x, *y]),
        _ => Err(SitecheckError::InvalidGeoJson {
            reason: format!("Invalid position {:?}: expected two finite numbers", pos),
        }),
    }
}

fn positions(list: &[Vec<f64>]) -> Result<Vec<Coordinate>> {
    list.iter().map(|p| position(p)).collect()
}

/// Convert a canonical geometry into a `geojson` geometry for output
pub fn to_geojson_geometry(geometry: &Geometry) -> geojson::Geometry {
    use geojson::Value;

    fn pos(c: &Coordinate) -> Vec<f64> {
        vec![c[0], c[1]]
    }
    fn ring(r: &[Coordinate]) -> Vec<Vec<f64>> {
        r.iter().map(pos).collect()
    }

    let value = match geometry {
        Geometry::Point { coordinates } => Value::Point(pos(coordinates)),
        Geometry::MultiPoint { coordinates } => Value::MultiPoint(ring(coordinates)),
        Geometry::LineString { coordinates } => Value::LineString(ring(coordinates)),
        Geometry::MultiLineString { coordinates } => {
            Value::MultiLineString(coordinates.iter().map(|l| ring(l)).collect())
        }
        Geometry::Polygon { coordinates } => {
            Value::Polygon(coordinates.iter().map(|r| ring(r)).collect())
        }
        Geometry::MultiPolygon { coordinates } => Value::MultiPolygon(
            coordinates.iter().map(|p| p.iter().map(|r| ring(r)).collect()).collect(),
        ),
    };

    geojson::Geometry::new(value)
}

/// The CRS named by a legacy `crs` foreign member, if any
fn declared_crs(foreign_members: Option<&Map<String, JsonValue>>) -> Result<Option<Crs>> {
    foreign_members.and_then(|fm| fm.get("crs")).map(extract_crs).transpose()
}

/// Extract the CRS from a legacy GeoJSON `crs` member
fn extract_crs(crs: &JsonValue) -> Result<Crs> {
    let name = crs
        .get("properties")
        .and_then(|props| props.get("name"))
        .and_then(|name| name.as_str())
        .ok_or_else(|| SitecheckError::UnsupportedCrs {
            crs: crs.to_string(),
            reason: "only named CRS members are supported".to_string(),
        })?;

    Crs::parse(name)
}
