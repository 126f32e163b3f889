//! Sitecheck Core - Site suitability analysis engine
//!
//! This crate contains the domain models, configuration and the geospatial
//! engine that measures a candidate site against settlement and
//! protected-area reference data.

pub mod config;
pub mod engine;
pub mod error;
pub mod formats;
pub mod geo;
pub mod models;
pub mod rules;

pub use engine::{analyze_site, ReferenceSnapshot, SiteEngine};
pub use error::{Result, SitecheckError};
