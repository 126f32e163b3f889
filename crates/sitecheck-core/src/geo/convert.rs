//! Conversions between the canonical geometry model and the `geo` crate.

use geo::Geometry as GeoGeometry;

use crate::models::{Coordinate, Geometry};

fn to_line_string(ring: &[Coordinate]) -> geo::LineString {
    geo::LineString::new(ring.iter().map(|c| geo::Coord { x: c[0], y: c[1] }).collect())
}

fn to_polygon(rings: &[Vec<Coordinate>]) -> geo::Polygon {
    match rings.split_first() {
        Some((exterior, interiors)) => geo::Polygon::new(
            to_line_string(exterior),
            interiors.iter().map(|r| to_line_string(r)).collect(),
        ),
        None => geo::Polygon::new(geo::LineString::new(vec![]), vec![]),
    }
}

fn ring_coords(ls: &geo::LineString) -> Vec<Coordinate> {
    ls.coords().map(|c| [c.x, c.y]).collect()
}

fn polygon_rings(p: &geo::Polygon) -> Vec<Vec<Coordinate>> {
    std::iter::once(p.exterior()).chain(p.interiors()).map(ring_coords).collect()
}

/// Convert a canonical Geometry to a geo::Geometry
pub fn to_geo_geometry(geom: &Geometry) -> GeoGeometry {
    match geom {
        Geometry::Point { coordinates } => {
            GeoGeometry::Point(geo::Point::new(coordinates[0], coordinates[1]))
        }
        Geometry::LineString { coordinates } => GeoGeometry::LineString(to_line_string(coordinates)),
        Geometry::Polygon { coordinates } => GeoGeometry::Polygon(to_polygon(coordinates)),
        Geometry::MultiPoint { coordinates } => GeoGeometry::MultiPoint(geo::MultiPoint::new(
            coordinates.iter().map(|c| geo::Point::new(c[0], c[1])).collect(),
        )),
        Geometry::MultiLineString { coordinates } => GeoGeometry::MultiLineString(
            geo::MultiLineString::new(coordinates.iter().map(|l| to_line_string(l)).collect()),
        ),
        Geometry::MultiPolygon { coordinates } => GeoGeometry::MultiPolygon(
            geo::MultiPolygon::new(coordinates.iter().map(|p| to_polygon(p)).collect()),
        ),
    }
}

/// Convert a geo::Geometry to a canonical Geometry.
///
/// Returns `None` for geometry collections, which have no canonical
/// counterpart; use [`flatten_geo_geometry`] for those.
pub fn from_geo_geometry(geom: &GeoGeometry) -> Option<Geometry> {
    let converted = match geom {
        GeoGeometry::Point(p) => Geometry::Point { coordinates: [p.x(), p.y()] },
        GeoGeometry::Line(l) => Geometry::LineString {
            coordinates: vec![[l.start.x, l.start.y], [l.end.x, l.end.y]],
        },
        GeoGeometry::LineString(ls) => Geometry::LineString { coordinates: ring_coords(ls) },
        GeoGeometry::Polygon(p) => Geometry::Polygon { coordinates: polygon_rings(p) },
        GeoGeometry::MultiPoint(mp) => Geometry::MultiPoint {
            coordinates: mp.iter().map(|p| [p.x(), p.y()]).collect(),
        },
        GeoGeometry::MultiLineString(mls) => Geometry::MultiLineString {
            coordinates: mls.iter().map(ring_coords).collect(),
        },
        GeoGeometry::MultiPolygon(mp) => Geometry::MultiPolygon {
            coordinates: mp.iter().map(polygon_rings).collect(),
        },
        GeoGeometry::Rect(r) => Geometry::Polygon { coordinates: polygon_rings(&r.to_polygon()) },
        GeoGeometry::Triangle(t) => {
            Geometry::Polygon { coordinates: polygon_rings(&t.to_polygon()) }
        }
        GeoGeometry::GeometryCollection(_) => return None,
    };

    Some(converted)
}

/// Convert a geo::Geometry into canonical parts, expanding collections
pub fn flatten_geo_geometry(geom: &GeoGeometry) -> Vec<Geometry> {
    match geom {
        GeoGeometry::GeometryCollection(gc) => gc.iter().flat_map(flatten_geo_geometry).collect(),
        other => from_geo_geometry(other).into_iter().collect(),
    }
}
