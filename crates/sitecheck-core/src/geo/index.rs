//! R*-tree index over a feature collection for nearest and intersecting queries

use geo::algorithm::bounding_rect::BoundingRect;
use geo::{Distance, Euclidean, Geometry as GeoGeometry, Intersects, Point};
use rstar::{PointDistance, RTree, RTreeObject, AABB};

use crate::geo::convert::to_geo_geometry;
use crate::models::{Crs, Feature, FeatureCollection};

/// Relative slack added to the nearest-neighbour search window so that
/// candidates lying exactly on its edge survive float rounding
const SEARCH_SLACK: f64 = 1e-9;

/// Indexed feature geometry with its position in the source collection
#[derive(Debug, Clone)]
struct IndexedGeometry {
    /// Position of the feature in the original collection
    ordinal: usize,

    geometry: GeoGeometry,

    envelope: AABB<[f64; 2]>,
}

impl RTreeObject for IndexedGeometry {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

impl PointDistance for IndexedGeometry {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let point = GeoGeometry::Point(Point::new(point[0], point[1]));
        let distance = Euclidean.distance(&self.geometry, &point);
        distance * distance
    }
}

/// A feature returned by an index query
#[derive(Debug, Clone, Copy)]
pub struct IndexMatch<'a> {
    /// Position of the feature in the original collection
    pub ordinal: usize,
    pub feature: &'a Feature,
    /// The feature's geometry in the index's CRS
    pub geometry: &'a GeoGeometry,
    /// Planar distance to the query, in CRS units (0 for intersections)
    pub distance: f64,
}

/// Read-only spatial index over one feature collection.
///
/// Features without extent (empty coordinate arrays) are kept for ordinal
/// bookkeeping but never returned by a query.
#[derive(Debug)]
pub struct SpatialIndex {
    crs: Option<Crs>,
    features: Vec<Feature>,
    tree: RTree<IndexedGeometry>,
}

impl SpatialIndex {
    /// Build an index over a collection (expected to be in a metric CRS)
    pub fn build(collection: FeatureCollection) -> Self {
        let indexed: Vec<IndexedGeometry> = collection
            .features
            .iter()
            .enumerate()
            .filter_map(|(ordinal, feature)| {
                let geometry = to_geo_geometry(&feature.geometry);
                let rect = geometry.bounding_rect()?;
                let envelope = AABB::from_corners(
                    [rect.min().x, rect.min().y],
                    [rect.max().x, rect.max().y],
                );
                Some(IndexedGeometry { ordinal, geometry, envelope })
            })
            .collect();

        let skipped = collection.features.len() - indexed.len();
        if skipped > 0 {
            tracing::warn!(skipped, "Features without extent were left out of the index");
        }

        tracing::debug!(
            features = collection.features.len(),
            indexed = indexed.len(),
            "Built spatial index"
        );

        Self { crs: collection.crs, features: collection.features, tree: RTree::bulk_load(indexed) }
    }

    /// Create an index with nothing in it
    pub fn empty(crs: Crs) -> Self {
        Self::build(FeatureCollection::empty(crs))
    }

    pub fn crs(&self) -> Option<&Crs> {
        self.crs.as_ref()
    }

    /// Number of features in the source collection
    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Number of features that can be returned by queries
    pub fn indexed_len(&self) -> usize {
        self.tree.size()
    }

    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    fn to_match<'a>(&'a self, entry: &'a IndexedGeometry, distance: f64) -> IndexMatch<'a> {
        IndexMatch {
            ordinal: entry.ordinal,
            feature: &self.features[entry.ordinal],
            geometry: &entry.geometry,
            distance,
        }
    }

    /// The single closest feature to `query`.
    ///
    /// Equidistant features resolve to the one that came first in the
    /// source collection. Returns `None` when nothing is indexed or the
    /// query has no extent.
    pub fn nearest(&self, query: &GeoGeometry) -> Option<IndexMatch<'_>> {
        let rect = query.bounding_rect()?;
        let center = rect.center();

        // Any feature at least as close as the seed has an envelope within
        // `bound` of the query's envelope
        let seed = self.tree.nearest_neighbor(&[center.x, center.y])?;
        let bound = Euclidean.distance(query, &seed.geometry);
        let reach = bound + bound.abs() * SEARCH_SLACK + SEARCH_SLACK;

        let window = AABB::from_corners(
            [rect.min().x - reach, rect.min().y - reach],
            [rect.max().x + reach, rect.max().y + reach],
        );

        self.tree
            .locate_in_envelope_intersecting(&window)
            .map(|entry| (entry, Euclidean.distance(query, &entry.geometry)))
            .min_by(|(a, da), (b, db)| da.total_cmp(db).then(a.ordinal.cmp(&b.ordinal)))
            .map(|(entry, distance)| self.to_match(entry, distance))
    }

    /// All features sharing at least one point with `query`, in source order
    pub fn intersecting(&self, query: &GeoGeometry) -> Vec<IndexMatch<'_>> {
        let Some(rect) = query.bounding_rect() else {
            return Vec::new();
        };

        let window = AABB::from_corners([rect.min().x, rect.min().y], [rect.max().x, rect.max().y]);

        let mut hits: Vec<&IndexedGeometry> = self
            .tree
            .locate_in_envelope_intersecting(&window)
            .filter(|entry| entry.geometry.intersects(query))
            .collect();

        hits.sort_by_key(|entry| entry.ordinal);

        hits.into_iter().map(|entry| self.to_match(entry, 0.0)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Geometry;

    fn square(name: &str, min_x: f64, min_y: f64, size: f64) -> Feature {
        Feature::new(Geometry::rect(min_x, min_y, min_x + size, min_y + size))
            .with_property("name", name)
    }

    fn index_of(features: Vec<Feature>) -> SpatialIndex {
        SpatialIndex::build(FeatureCollection::new(Crs::etrs89_utm32n(), features))
    }

    fn query_square(min_x: f64, min_y: f64, size: f64) -> GeoGeometry {
        to_geo_geometry(&Geometry::rect(min_x, min_y, min_x + size, min_y + size))
    }

    fn name_of(m: &IndexMatch<'_>) -> String {
        m.feature.properties["name"].as_str().unwrap_or_default().to_string()
    }

    #[test]
    fn test_empty_index() {
        let index = SpatialIndex::empty(Crs::etrs89_utm32n());
        let query = query_square(0.0, 0.0, 10.0);

        assert!(index.is_empty());
        assert_eq!(index.len(), 0);
        assert!(index.nearest(&query).is_none());
        assert!(index.intersecting(&query).is_empty());
    }

    #[test]
    fn test_nearest_by_geometry_not_centroid() {
        // The large square's centroid is far away but its edge is close
        let index = index_of(vec![
            square("small", 200.0, 0.0, 10.0),
            square("large", -1100.0, -500.0, 1000.0),
        ]);

        let hit = index.nearest(&query_square(0.0, 0.0, 10.0)).unwrap();
        assert_eq!(name_of(&hit), "large");
        assert!((hit.distance - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_nearest_touching_is_zero() {
        let index = index_of(vec![square("neighbour", 10.0, 0.0, 10.0)]);
        let hit = index.nearest(&query_square(0.0, 0.0, 10.0)).unwrap();
        assert_eq!(hit.distance, 0.0);
    }

    #[test]
    fn test_nearest_tie_prefers_first_in_collection() {
        let index = index_of(vec![
            square("east", 110.0, 0.0, 10.0),
            square("west", -110.0, 0.0, 10.0),
        ]);

        for _ in 0..5 {
            let hit = index.nearest(&query_square(0.0, 0.0, 10.0)).unwrap();
            assert_eq!(name_of(&hit), "east");
            assert_eq!(hit.ordinal, 0);
        }

        let reversed = index_of(vec![
            square("west", -110.0, 0.0, 10.0),
            square("east", 110.0, 0.0, 10.0),
        ]);
        let hit = reversed.nearest(&query_square(0.0, 0.0, 10.0)).unwrap();
        assert_eq!(name_of(&hit), "west");
    }

    #[test]
    fn test_intersecting_preserves_source_order() {
        let index = index_of(vec![
            square("c", 5.0, 5.0, 10.0),
            square("far", 500.0, 500.0, 10.0),
            square("a", -5.0, -5.0, 10.0),
            square("b", 9.0, -20.0, 30.0),
        ]);

        let hits = index.intersecting(&query_square(0.0, 0.0, 10.0));
        let names: Vec<String> = hits.iter().map(name_of).collect();
        assert_eq!(names, vec!["c", "a", "b"]);
        assert!(hits.iter().all(|h| h.distance == 0.0));
    }

    #[test]
    fn test_envelope_overlap_is_not_intersection() {
        // An L-shaped polygon whose bounding box covers the query but whose
        // body does not
        let l_shape = Feature::new(Geometry::polygon(vec![vec![
            [0.0, 0.0],
            [100.0, 0.0],
            [100.0, 10.0],
            [10.0, 10.0],
            [10.0, 100.0],
            [0.0, 100.0],
            [0.0, 0.0],
        ]]))
        .with_property("name", "l");
        let index = index_of(vec![l_shape]);

        let query = query_square(50.0, 50.0, 10.0);
        assert!(index.intersecting(&query).is_empty());

        let hit = index.nearest(&query).unwrap();
        assert!((hit.distance - 40.0).abs() < 1e-9);
    }

    #[test]
    fn test_features_without_extent_are_skipped() {
        let index = index_of(vec![
            Feature::new(Geometry::polygon(vec![])).with_property("name", "empty"),
            square("real", 50.0, 0.0, 10.0),
        ]);

        assert_eq!(index.len(), 2);
        assert_eq!(index.indexed_len(), 1);

        let hit = index.nearest(&query_square(0.0, 0.0, 10.0)).unwrap();
        assert_eq!(name_of(&hit), "real");
        assert_eq!(hit.ordinal, 1);
    }

    #[test]
    fn test_point_features() {
        let index = index_of(vec![
            Feature::new(Geometry::point(30.0, 5.0)).with_property("name", "p1"),
            Feature::new(Geometry::point(5.0, 5.0)).with_property("name", "inside"),
        ]);

        let query = query_square(0.0, 0.0, 10.0);
        let hits = index.intersecting(&query);
        assert_eq!(hits.len(), 1);
        assert_eq!(name_of(&hits[0]), "inside");
        assert_eq!(index.nearest(&query).unwrap().distance, 0.0);
    }
}
