use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Sitecheck - Geospatial site suitability checks
#[derive(Parser, Debug)]
#[command(name = "sitecheck")]
#[command(about = "Check candidate sites against settlements and protected areas", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Output results in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// TOML configuration file
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Projected CRS for distance and overlap math (e.g. 25832 or EPSG:25832)
    #[arg(long, global = true, value_name = "CRS")]
    pub metric_crs: Option<String>,

    /// Geographic CRS for map output
    #[arg(long, global = true, value_name = "CRS")]
    pub display_crs: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Evaluate a site against reference datasets
    Evaluate(EvaluateArgs),

    /// Show the effective configuration and where each value came from
    Config,
}

#[derive(Parser, Debug)]
pub struct EvaluateArgs {
    /// Site boundary (GeoJSON FeatureCollection, Feature or Geometry)
    #[arg(long, value_name = "FILE")]
    pub site: PathBuf,

    /// Settlement areas (GeoJSON)
    #[arg(long, value_name = "FILE")]
    pub settlements: Option<PathBuf>,

    /// Protected areas (GeoJSON)
    #[arg(long, value_name = "FILE")]
    pub protected_areas: Option<PathBuf>,

    /// Rule thresholds (TOML)
    #[arg(long, value_name = "FILE")]
    pub rules: Option<PathBuf>,

    /// Write the map-ready GeoJSON payload to this file
    #[arg(long, value_name = "FILE")]
    pub map_data: Option<PathBuf>,
}
