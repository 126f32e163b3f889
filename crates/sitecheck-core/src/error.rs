//! Error types for Sitecheck

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SitecheckError {
    // Input errors
    #[error("Site input contains no features")]
    EmptySiteInput,

    #[error("Invalid GeoJSON: {reason}")]
    InvalidGeoJson { reason: String },

    // CRS errors
    #[error("Unsupported CRS {crs}: {reason}")]
    UnsupportedCrs { crs: String, reason: String },

    #[error("Reprojection failed: {reason}")]
    Reprojection { reason: String },

    // Geometry errors
    #[error("Geometry computation failed: {reason}")]
    GeometryComputation { reason: String },

    // Configuration errors
    #[error("Invalid configuration value for {key}: {reason}")]
    ConfigInvalid { key: String, reason: String },

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SitecheckError>;
