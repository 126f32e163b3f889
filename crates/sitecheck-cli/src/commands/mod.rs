//! Command implementations

mod config;
mod evaluate;

use crate::cli::{Cli, Commands};
use crate::output::OutputWriter;
use anyhow::{Context, Result};
use sitecheck_core::config::{parse_epsg, CliConfigOverrides, LayeredConfig};

/// Execute a CLI command
pub fn execute(cli: Cli) -> Result<()> {
    let output = OutputWriter::new(cli.json);
    let layered = load_config(&cli)?;

    match cli.command {
        Commands::Evaluate(args) => evaluate::execute(args, &layered, &output),
        Commands::Config => config::execute(&layered, &output),
    }
}

/// Build the layered configuration: defaults, file, environment, flags
fn load_config(cli: &Cli) -> Result<LayeredConfig> {
    let mut layered = LayeredConfig::with_defaults();

    if let Some(path) = &cli.config {
        layered = layered
            .load_from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?;
    }

    let mut layered = layered.load_from_env();

    let parse = |flag: &str, value: &Option<String>| -> Result<Option<u32>> {
        value
            .as_deref()
            .map(|v| parse_epsg(v).with_context(|| format!("Invalid --{} value '{}'", flag, v)))
            .transpose()
    };

    layered.update_from_cli(CliConfigOverrides {
        metric_crs: parse("metric-crs", &cli.metric_crs)?,
        display_crs: parse("display-crs", &cli.display_crs)?,
        default_source_crs: None,
    });

    Ok(layered)
}
