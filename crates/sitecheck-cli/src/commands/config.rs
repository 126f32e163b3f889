//! Config command implementation

use crate::output::OutputWriter;
use crate::output_types::{ConfigEntry, InspectConfigOutput};
use anyhow::Result;
use sitecheck_core::config::LayeredConfig;

pub fn execute(layered: &LayeredConfig, output: &OutputWriter) -> Result<()> {
    let mut values: Vec<ConfigEntry> = layered
        .to_inspection_map()
        .into_iter()
        .map(|(key, (value, source))| ConfigEntry::new(key, value, source))
        .collect();

    // Sort by key for consistent output
    values.sort_by(|a, b| a.key.cmp(&b.key));

    if output.is_json() {
        output.result(InspectConfigOutput { values })?;
    } else {
        output.section("Configuration Values");
        output.table(values);

        output.section("Configuration Precedence");
        output.info("CLI arguments > Environment variables > Config file > Defaults");
    }

    Ok(())
}
