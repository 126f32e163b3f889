//! Readers and writers for the interchange formats sitecheck accepts
//!
//! Reference datasets and request bodies arrive as GeoJSON; map output is
//! written back as GeoJSON feature collections.

pub mod geojson;

pub use self::geojson::{to_geojson_geometry, GeoJsonReader};
