//! Geo module for spatial operations
//!
//! This module provides CRS normalization, the feature index, the
//! proximity/overlap analysis and projection of results for display.

pub mod analysis;
pub mod convert;
pub mod index;
pub mod projection;
pub mod transform;

// Re-export key types for convenience
pub use analysis::{analyze_proximity, closest_points, union_site, ProximityAnalysis};
pub use convert::{flatten_geo_geometry, from_geo_geometry, to_geo_geometry};
pub use index::{IndexMatch, SpatialIndex};
pub use projection::ResultProjector;
pub use transform::{crs_match, CoordinateNormalizer, CrsTransformer};
