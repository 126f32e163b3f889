pub mod analysis;
pub mod feature;
pub mod geometry;

pub use analysis::{AnalysisOutcome, AnalysisResult, MapData, SiteMetrics};
pub use feature::{AttributeKeys, Feature, FeatureCollection};
pub use geometry::{Coordinate, Crs, Geometry};
