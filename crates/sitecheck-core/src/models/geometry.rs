//! Canonical geometry types used across all sitecheck crates.
//!
//! These types are the engine's data contract: GeoJSON-shaped coordinate
//! arrays that carry no dependency on the computational `geo` types.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SitecheckError};

/// A single `[x, y]` position
pub type Coordinate = [f64; 2];

/// Coordinate Reference System identified by EPSG code
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Crs {
    pub epsg: u32,
    pub name: String,
}

impl Default for Crs {
    fn default() -> Self {
        Self::wgs84()
    }
}

impl fmt::Display for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EPSG:{}", self.epsg)
    }
}

impl Crs {
    /// Build a CRS from a bare EPSG code, naming it when the code is well known
    pub fn from_epsg(epsg: u32) -> Self {
        let name = match epsg {
            4326 => "WGS 84".to_string(),
            4258 => "ETRS89".to_string(),
            3857 => "Web Mercator".to_string(),
            25832 => "ETRS89 / UTM zone 32N".to_string(),
            25833 => "ETRS89 / UTM zone 33N".to_string(),
            31467 => "DHDN / 3-degree Gauss-Kruger zone 3".to_string(),
            code => format!("EPSG:{}", code),
        };
        Self { epsg, name }
    }

    /// WGS 84 (EPSG:4326)
    pub fn wgs84() -> Self {
        Self::from_epsg(4326)
    }

    /// ETRS89 / UTM zone 32N (EPSG:25832)
    pub fn etrs89_utm32n() -> Self {
        Self::from_epsg(25832)
    }

    /// Parse a CRS identifier.
    ///
    /// Accepts `EPSG:25832`, a bare `25832`, OGC URNs such as
    /// `urn:ogc:def:crs:EPSG::25832`, OGC HTTP URIs and the `CRS84` alias.
    pub fn parse(identifier: &str) -> Result<Self> {
        let trimmed = identifier.trim();
        let unsupported = |reason: &str| SitecheckError::UnsupportedCrs {
            crs: trimmed.to_string(),
            reason: reason.to_string(),
        };

        if trimmed.is_empty() {
            return Err(unsupported("empty identifier"));
        }

        let upper = trimmed.to_ascii_uppercase();
        if upper.ends_with("CRS84") {
            return Ok(Self::wgs84());
        }

        // The EPSG code is the last numeric segment after the authority marker
        let code = if let Some(idx) = upper.rfind("EPSG") {
            upper[idx + 4..]
                .rsplit(|c: char| c == ':' || c == '/')
                .next()
                .unwrap_or_default()
                .to_string()
        } else {
            upper.clone()
        };

        let epsg = code
            .parse::<u32>()
            .map_err(|_| unsupported("expected an EPSG code"))?;

        if epsg == 0 {
            return Err(unsupported("EPSG code must be positive"));
        }

        Ok(Self::from_epsg(epsg))
    }

    /// Whether this CRS measures in degrees of longitude/latitude
    pub fn is_geographic(&self) -> bool {
        matches!(self.epsg, 4326 | 4258 | 4269 | 4937 | 4979)
    }
}

/// GeoJSON-compatible geometry representation
///
/// Maps directly to GeoJSON geometry types with coordinate arrays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Geometry {
    Point {
        coordinates: Coordinate,
    },
    LineString {
        coordinates: Vec<Coordinate>,
    },
    Polygon {
        coordinates: Vec<Vec<Coordinate>>,
    },
    MultiPoint {
        coordinates: Vec<Coordinate>,
    },
    MultiLineString {
        coordinates: Vec<Vec<Coordinate>>,
    },
    MultiPolygon {
        coordinates: Vec<Vec<Vec<Coordinate>>>,
    },
}

impl Geometry {
    /// Create a Point geometry
    pub fn point(x: f64, y: f64) -> Self {
        Geometry::Point { coordinates: [x, y] }
    }

    /// Create a LineString geometry
    pub fn line_string(coords: Vec<Coordinate>) -> Self {
        Geometry::LineString { coordinates: coords }
    }

    /// Create a Polygon geometry
    pub fn polygon(rings: Vec<Vec<Coordinate>>) -> Self {
        Geometry::Polygon { coordinates: rings }
    }

    /// Create a MultiPolygon geometry
    pub fn multi_polygon(polygons: Vec<Vec<Vec<Coordinate>>>) -> Self {
        Geometry::MultiPolygon { coordinates: polygons }
    }

    /// Axis-aligned rectangle as a closed polygon
    pub fn rect(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self::polygon(vec![vec![
            [min_x, min_y],
            [max_x, min_y],
            [max_x, max_y],
            [min_x, max_y],
            [min_x, min_y],
        ]])
    }

    /// Whether the geometry is a polygon or multi-polygon
    pub fn is_polygonal(&self) -> bool {
        matches!(self, Geometry::Polygon { .. } | Geometry::MultiPolygon { .. })
    }

    /// Iterate over every coordinate in the geometry
    pub fn coords(&self) -> Box<dyn Iterator<Item = &Coordinate> + '_> {
        match self {
            Geometry::Point { coordinates } => Box::new(std::iter::once(coordinates)),
            Geometry::LineString { coordinates } | Geometry::MultiPoint { coordinates } => {
                Box::new(coordinates.iter())
            }
            Geometry::Polygon { coordinates } | Geometry::MultiLineString { coordinates } => {
                Box::new(coordinates.iter().flatten())
            }
            Geometry::MultiPolygon { coordinates } => {
                Box::new(coordinates.iter().flatten().flatten())
            }
        }
    }

    /// Whether the geometry has no coordinates at all
    pub fn is_empty(&self) -> bool {
        self.coords().next().is_none()
    }

    /// Apply a fallible function to every coordinate, producing a new geometry
    pub fn try_map_coords<F>(&self, mut f: F) -> Result<Geometry>
    where
        F: FnMut(Coordinate) -> Result<Coordinate>,
    {
        fn map_ring<F>(ring: &[Coordinate], f: &mut F) -> Result<Vec<Coordinate>>
        where
            F: FnMut(Coordinate) -> Result<Coordinate>,
        {
            ring.iter().map(|c| f(*c)).collect()
        }

        fn map_rings<F>(rings: &[Vec<Coordinate>], f: &mut F) -> Result<Vec<Vec<Coordinate>>>
        where
            F: FnMut(Coordinate) -> Result<Coordinate>,
        {
            rings.iter().map(|ring| map_ring(ring, f)).collect()
        }

        let mapped = match self {
            Geometry::Point { coordinates } => Geometry::Point { coordinates: f(*coordinates)? },
            Geometry::LineString { coordinates } => {
                Geometry::LineString { coordinates: map_ring(coordinates, &mut f)? }
            }
            Geometry::Polygon { coordinates } => {
                Geometry::Polygon { coordinates: map_rings(coordinates, &mut f)? }
            }
            Geometry::MultiPoint { coordinates } => {
                Geometry::MultiPoint { coordinates: map_ring(coordinates, &mut f)? }
            }
            Geometry::MultiLineString { coordinates } => {
                Geometry::MultiLineString { coordinates: map_rings(coordinates, &mut f)? }
            }
            Geometry::MultiPolygon { coordinates } => Geometry::MultiPolygon {
                coordinates: coordinates
                    .iter()
                    .map(|polygon| map_rings(polygon, &mut f))
                    .collect::<Result<_>>()?,
            },
        };

        Ok(mapped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geometry_serialization() {
        let point = Geometry::point(9.99, 53.55);
        let json = serde_json::to_string(&point).unwrap();
        assert!(json.contains("Point"));
        assert!(json.contains("9.99"));

        let parsed: Geometry = serde_json::from_str(&json).unwrap();
        assert_eq!(point, parsed);
    }

    #[test]
    fn test_rect_is_closed_polygon() {
        let rect = Geometry::rect(0.0, 0.0, 100.0, 50.0);
        let Geometry::Polygon { coordinates } = &rect else {
            panic!("Expected Polygon geometry");
        };
        assert_eq!(coordinates[0].first(), coordinates[0].last());
        assert!(rect.is_polygonal());
        assert_eq!(rect.coords().count(), 5);
    }

    #[test]
    fn test_empty_geometry() {
        assert!(Geometry::polygon(vec![]).is_empty());
        assert!(Geometry::multi_polygon(vec![vec![vec![]]]).is_empty());
        assert!(!Geometry::point(0.0, 0.0).is_empty());
    }

    #[test]
    fn test_try_map_coords_preserves_shape() {
        let polygon = Geometry::polygon(vec![
            vec![[0.0, 0.0], [10.0, 0.0], [10.0, 10.0], [0.0, 0.0]],
            vec![[2.0, 2.0], [3.0, 2.0], [3.0, 3.0], [2.0, 2.0]],
        ]);
        let shifted = polygon.try_map_coords(|[x, y]| Ok([x + 1.0, y * 2.0])).unwrap();

        let Geometry::Polygon { coordinates } = shifted else {
            panic!("Expected Polygon geometry");
        };
        assert_eq!(coordinates.len(), 2);
        assert_eq!(coordinates[0][1], [11.0, 0.0]);
        assert_eq!(coordinates[1][2], [4.0, 6.0]);
    }

    #[test]
    fn test_try_map_coords_propagates_errors() {
        let line = Geometry::line_string(vec![[0.0, 0.0], [1.0, 1.0]]);
        let result = line.try_map_coords(|_| {
            Err(SitecheckError::Reprojection { reason: "out of domain".to_string() })
        });
        assert!(matches!(result, Err(SitecheckError::Reprojection { .. })));
    }

    #[test]
    fn test_parse_crs_identifiers() {
        assert_eq!(Crs::parse("EPSG:25832").unwrap().epsg, 25832);
        assert_eq!(Crs::parse("epsg:4326").unwrap().epsg, 4326);
        assert_eq!(Crs::parse("25833").unwrap().epsg, 25833);
        assert_eq!(Crs::parse("urn:ogc:def:crs:EPSG::25832").unwrap().epsg, 25832);
        assert_eq!(Crs::parse("urn:ogc:def:crs:OGC:1.3:CRS84").unwrap().epsg, 4326);
        assert_eq!(Crs::parse("http://www.opengis.net/def/crs/EPSG/0/3857").unwrap().epsg, 3857);
    }

    #[test]
    fn test_parse_crs_rejects_garbage() {
        assert!(matches!(Crs::parse(""), Err(SitecheckError::UnsupportedCrs { .. })));
        assert!(matches!(Crs::parse("ESRI:102100"), Err(SitecheckError::UnsupportedCrs { .. })));
        assert!(matches!(Crs::parse("EPSG:abc"), Err(SitecheckError::UnsupportedCrs { .. })));
        assert!(matches!(Crs::parse("EPSG:0"), Err(SitecheckError::UnsupportedCrs { .. })));
    }

    #[test]
    fn test_crs_display_and_names() {
        let crs = Crs::etrs89_utm32n();
        assert_eq!(crs.to_string(), "EPSG:25832");
        assert_eq!(crs.name, "ETRS89 / UTM zone 32N");
        assert!(Crs::wgs84().is_geographic());
        assert!(!crs.is_geographic());
        assert_eq!(Crs::from_epsg(2056).name, "EPSG:2056");
    }
}
