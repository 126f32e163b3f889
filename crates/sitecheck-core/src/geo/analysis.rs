//! Proximity and overlap analysis in the metric CRS.
//!
//! Empty-input policy, in one place:
//!
//! | input                    | result                                           |
//! |--------------------------|--------------------------------------------------|
//! | empty site               | `None` (nothing to analyze)                      |
//! | empty settlements        | distance `None`, no settlement name/type/line    |
//! | empty protected areas    | overlap `false`, no relevant protected area      |

use geo::algorithm::bounding_rect::BoundingRect;
use geo::algorithm::line_intersection::{line_intersection, LineIntersection};
use geo::{
    BooleanOps, Closest, ClosestPoint, Coord, CoordsIter, Distance, Euclidean,
    Geometry as GeoGeometry, GeometryCollection, Intersects, Line, MultiPolygon, Point,
};

use crate::error::{Result, SitecheckError};
use crate::geo::convert::to_geo_geometry;
use crate::geo::index::{IndexMatch, SpatialIndex};
use crate::models::{AttributeKeys, Feature, FeatureCollection, Geometry, SiteMetrics};

/// Everything the analysis selected, still in the metric CRS
#[derive(Debug, Clone)]
pub struct ProximityAnalysis<'a> {
    pub metrics: SiteMetrics,
    /// Union of all site features
    pub site: GeoGeometry,
    pub nearest_settlement: Option<&'a Feature>,
    /// Shortest segment between the site and the nearest settlement
    pub distance_line: Option<Geometry>,
    /// Intersecting protected areas, or the single nearest one
    pub protected_areas: Vec<&'a Feature>,
}

/// Merge all site features into one geometry.
///
/// Polygonal sites are unioned into a single MultiPolygon. Sites that mix
/// in points or lines are kept as a geometry collection of their parts.
/// Returns `Ok(None)` for an empty collection.
pub fn union_site(site: &FeatureCollection) -> Result<Option<GeoGeometry>> {
    if site.is_empty() {
        return Ok(None);
    }

    let parts: Vec<GeoGeometry> = site.iter().map(|f| to_geo_geometry(&f.geometry)).collect();

    let union = if site.iter().all(|f| f.geometry.is_polygonal()) {
        let merged = parts
            .into_iter()
            .filter_map(|part| match part {
                GeoGeometry::Polygon(p) => Some(MultiPolygon::new(vec![p])),
                GeoGeometry::MultiPolygon(mp) => Some(mp),
                _ => None,
            })
            .reduce(|a, b| a.union(&b))
            .unwrap_or_else(|| MultiPolygon::new(vec![]));
        GeoGeometry::MultiPolygon(merged)
    } else {
        GeoGeometry::GeometryCollection(GeometryCollection::new_from(parts))
    };

    if union.bounding_rect().is_none() {
        return Err(SitecheckError::GeometryComputation {
            reason: "site geometry has no extent".to_string(),
        });
    }

    Ok(Some(union))
}

/// Straight segments making up a geometry's boundary or body
fn segments(geometry: &GeoGeometry) -> Vec<Line> {
    match geometry {
        GeoGeometry::Point(_) | GeoGeometry::MultiPoint(_) => Vec::new(),
        GeoGeometry::Line(l) => vec![*l],
        GeoGeometry::LineString(ls) => ls.lines().collect(),
        GeoGeometry::MultiLineString(mls) => mls.iter().flat_map(|ls| ls.lines()).collect(),
        GeoGeometry::Polygon(p) => {
            std::iter::once(p.exterior()).chain(p.interiors()).flat_map(|r| r.lines()).collect()
        }
        GeoGeometry::MultiPolygon(mp) => mp
            .iter()
            .flat_map(|p| segments(&GeoGeometry::Polygon(p.clone())))
            .collect(),
        GeoGeometry::Rect(r) => segments(&GeoGeometry::Polygon(r.to_polygon())),
        GeoGeometry::Triangle(t) => segments(&GeoGeometry::Polygon(t.to_polygon())),
        GeoGeometry::GeometryCollection(gc) => gc.iter().flat_map(segments).collect(),
    }
}

/// A point shared by two intersecting geometries
fn shared_point(a: &GeoGeometry, b: &GeoGeometry) -> Option<Coord> {
    if let Some(c) = a.coords_iter().find(|c| b.intersects(&Point::from(*c))) {
        return Some(c);
    }
    if let Some(c) = b.coords_iter().find(|c| a.intersects(&Point::from(*c))) {
        return Some(c);
    }

    // No vertex lies in the other geometry, so two edges must cross
    let b_segments = segments(b);
    segments(a).iter().find_map(|la| {
        b_segments.iter().find_map(|lb| match line_intersection(*la, *lb)? {
            LineIntersection::SinglePoint { intersection, .. } => Some(intersection),
            LineIntersection::Collinear { intersection } => Some(intersection.start),
        })
    })
}

/// Closest point on `target` to each vertex of `source`, as (on_source, on_target) pairs
fn vertex_candidates(source: &GeoGeometry, target: &GeoGeometry) -> Vec<(Coord, Coord)> {
    source
        .coords_iter()
        .filter_map(|c| match target.closest_point(&Point::from(c)) {
            Closest::Intersection(p) | Closest::SinglePoint(p) => Some((c, p.0)),
            Closest::Indeterminate => None,
        })
        .collect()
}

/// The two closest points between `a` and `b`, one on each.
///
/// Equal points when the geometries share a point. The minimum distance
/// between two sets of segments is always reached at a vertex of one of
/// them, so projecting every vertex onto the other geometry suffices.
pub fn closest_points(a: &GeoGeometry, b: &GeoGeometry) -> Option<(Coord, Coord)> {
    if a.intersects(b) {
        return shared_point(a, b).map(|c| (c, c));
    }

    let forward = vertex_candidates(a, b);
    let backward = vertex_candidates(b, a).into_iter().map(|(on_b, on_a)| (on_a, on_b));

    forward.into_iter().chain(backward).min_by(|(a1, b1), (a2, b2)| {
        let d1 = Euclidean.distance(Point::from(*a1), Point::from(*b1));
        let d2 = Euclidean.distance(Point::from(*a2), Point::from(*b2));
        d1.total_cmp(&d2)
    })
}

/// Join distinct values in first-seen order
fn join_unique(values: impl IntoIterator<Item = String>) -> Option<String> {
    let mut seen: Vec<String> = Vec::new();
    for value in values {
        if !seen.contains(&value) {
            seen.push(value);
        }
    }

    if seen.is_empty() {
        None
    } else {
        Some(seen.join(", "))
    }
}

/// Measure a site against both reference indexes.
///
/// `site` must already be in the indexes' metric CRS. Returns `Ok(None)`
/// when the site collection is empty.
pub fn analyze_proximity<'a>(
    site: &FeatureCollection,
    settlements: &'a SpatialIndex,
    protected_areas: &'a SpatialIndex,
    attributes: &AttributeKeys,
) -> Result<Option<ProximityAnalysis<'a>>> {
    let Some(site_geometry) = union_site(site)? else {
        return Ok(None);
    };

    let mut metrics = SiteMetrics::default();

    let nearest_settlement: Option<IndexMatch<'a>> = settlements.nearest(&site_geometry);
    let mut distance_line = None;

    if let Some(hit) = &nearest_settlement {
        if !hit.distance.is_finite() {
            return Err(SitecheckError::GeometryComputation {
                reason: format!("distance to settlement {} is not finite", hit.ordinal),
            });
        }

        metrics.distance_to_settlements_m = Some(hit.distance);
        metrics.nearest_settlement_name = hit.feature.name(attributes);
        metrics.nearest_settlement_type = hit.feature.kind(attributes);

        distance_line = closest_points(&site_geometry, hit.geometry).map(|(from, to)| {
            Geometry::line_string(vec![[from.x, from.y], [to.x, to.y]])
        });
    }

    let overlapping = protected_areas.intersecting(&site_geometry);
    metrics.overlaps_protected_area = !overlapping.is_empty();

    let relevant: Vec<&'a Feature> = if overlapping.is_empty() {
        protected_areas.nearest(&site_geometry).map(|hit| hit.feature).into_iter().collect()
    } else {
        overlapping.iter().map(|hit| hit.feature).collect()
    };

    metrics.protected_area_name = join_unique(relevant.iter().filter_map(|f| f.name(attributes)));
    metrics.protected_area_type = join_unique(relevant.iter().filter_map(|f| f.kind(attributes)));

    tracing::debug!(
        distance_m = ?metrics.distance_to_settlements_m,
        overlaps = metrics.overlaps_protected_area,
        relevant_protected_areas = relevant.len(),
        "Computed site proximity"
    );

    Ok(Some(ProximityAnalysis {
        metrics,
        site: site_geometry,
        nearest_settlement: nearest_settlement.map(|hit| hit.feature),
        distance_line,
        protected_areas: relevant,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Crs;

    fn square(name: &str, min_x: f64, min_y: f64, size: f64) -> Feature {
        Feature::new(Geometry::rect(min_x, min_y, min_x + size, min_y + size))
            .with_property("name", name)
    }

    fn collection(features: Vec<Feature>) -> FeatureCollection {
        FeatureCollection::new(Crs::etrs89_utm32n(), features)
    }

    fn index(features: Vec<Feature>) -> SpatialIndex {
        SpatialIndex::build(collection(features))
    }

    #[test]
    fn test_union_of_overlapping_polygons() {
        let site = collection(vec![
            Feature::new(Geometry::rect(0.0, 0.0, 10.0, 10.0)),
            Feature::new(Geometry::rect(5.0, 0.0, 15.0, 10.0)),
        ]);

        let union = union_site(&site).unwrap().unwrap();
        let GeoGeometry::MultiPolygon(mp) = &union else {
            panic!("Expected MultiPolygon, got {:?}", union);
        };

        use geo::Area;
        assert_eq!(mp.0.len(), 1);
        assert!((mp.unsigned_area() - 150.0).abs() < 1e-9);
    }

    #[test]
    fn test_union_keeps_disjoint_parts() {
        let site = collection(vec![
            Feature::new(Geometry::rect(0.0, 0.0, 10.0, 10.0)),
            Feature::new(Geometry::rect(100.0, 0.0, 110.0, 10.0)),
        ]);

        let union = union_site(&site).unwrap().unwrap();
        assert!(matches!(&union, GeoGeometry::MultiPolygon(mp) if mp.0.len() == 2));
    }

    #[test]
    fn test_union_of_mixed_site_is_collection() {
        let site = collection(vec![
            Feature::new(Geometry::rect(0.0, 0.0, 10.0, 10.0)),
            Feature::new(Geometry::point(50.0, 50.0)),
        ]);

        let union = union_site(&site).unwrap().unwrap();
        assert!(matches!(&union, GeoGeometry::GeometryCollection(gc) if gc.0.len() == 2));
    }

    #[test]
    fn test_union_empty_and_degenerate() {
        assert!(union_site(&collection(vec![])).unwrap().is_none());

        let degenerate = collection(vec![Feature::new(Geometry::polygon(vec![]))]);
        assert!(matches!(
            union_site(&degenerate),
            Err(SitecheckError::GeometryComputation { .. })
        ));
    }

    #[test]
    fn test_closest_points_between_squares() {
        let a = to_geo_geometry(&Geometry::rect(0.0, 0.0, 10.0, 10.0));
        let b = to_geo_geometry(&Geometry::rect(40.0, 2.0, 50.0, 8.0));

        let (on_a, on_b) = closest_points(&a, &b).unwrap();
        assert!((on_a.x - 10.0).abs() < 1e-9);
        assert!((on_b.x - 40.0).abs() < 1e-9);
        assert!((on_a.y - on_b.y).abs() < 1e-9);
        assert!(on_b.y >= 2.0 && on_b.y <= 8.0);
    }

    #[test]
    fn test_closest_points_crossing_edges() {
        // A plus sign: neither rectangle has a vertex inside the other
        let a = to_geo_geometry(&Geometry::rect(0.0, 4.0, 10.0, 6.0));
        let b = to_geo_geometry(&Geometry::rect(4.0, 0.0, 6.0, 10.0));

        let (p, q) = closest_points(&a, &b).unwrap();
        assert_eq!(p, q);
        assert!(a.intersects(&Point::from(p)));
        assert!(b.intersects(&Point::from(p)));
    }

    #[test]
    fn test_join_unique_preserves_first_seen_order() {
        let joined = join_unique(
            ["NSG Moor", "FFH Heide", "NSG Moor", "LSG Tal"].into_iter().map(String::from),
        );
        assert_eq!(joined.as_deref(), Some("NSG Moor, FFH Heide, LSG Tal"));
        assert_eq!(join_unique(Vec::new()), None);
    }

    #[test]
    fn test_empty_reference_policy() {
        let site = collection(vec![square("site", 0.0, 0.0, 100.0)]);
        let settlements = index(vec![]);
        let protected = index(vec![]);

        let analysis = analyze_proximity(&site, &settlements, &protected, &AttributeKeys::default())
            .unwrap()
            .unwrap();

        assert_eq!(analysis.metrics.distance_to_settlements_m, None);
        assert_eq!(analysis.metrics.nearest_settlement_name, None);
        assert_eq!(analysis.metrics.nearest_settlement_type, None);
        assert!(!analysis.metrics.overlaps_protected_area);
        assert_eq!(analysis.metrics.protected_area_name, None);
        assert!(analysis.distance_line.is_none());
        assert!(analysis.protected_areas.is_empty());
    }

    #[test]
    fn test_overlapping_protected_areas_are_all_reported() {
        let site = collection(vec![square("site", 0.0, 0.0, 100.0)]);
        let settlements = index(vec![square("Dorf", 500.0, 0.0, 100.0)]);
        let protected = index(vec![
            square("Heide", 50.0, 50.0, 100.0).with_property("type", "FFH"),
            square("Far", 5000.0, 0.0, 100.0),
            square("Moor", -50.0, -50.0, 80.0).with_property("type", "NSG"),
            square("Heide", 90.0, -10.0, 20.0).with_property("type", "FFH"),
        ]);

        let analysis = analyze_proximity(&site, &settlements, &protected, &AttributeKeys::default())
            .unwrap()
            .unwrap();

        assert!(analysis.metrics.overlaps_protected_area);
        assert_eq!(analysis.metrics.protected_area_name.as_deref(), Some("Heide, Moor"));
        assert_eq!(analysis.metrics.protected_area_type.as_deref(), Some("FFH, NSG"));
        assert_eq!(analysis.protected_areas.len(), 3);
    }

    #[test]
    fn test_touching_settlement_has_zero_distance() {
        let site = collection(vec![square("site", 0.0, 0.0, 100.0)]);
        let settlements = index(vec![square("Nachbar", 100.0, 0.0, 100.0)]);
        let protected = index(vec![]);

        let analysis = analyze_proximity(&site, &settlements, &protected, &AttributeKeys::default())
            .unwrap()
            .unwrap();

        assert_eq!(analysis.metrics.distance_to_settlements_m, Some(0.0));
        let Some(Geometry::LineString { coordinates }) = &analysis.distance_line else {
            panic!("Expected a distance line");
        };
        assert_eq!(coordinates[0], coordinates[1]);
    }
}
