//! Evaluate command implementation

use crate::cli::EvaluateArgs;
use crate::output::OutputWriter;
use crate::output_types::{EmptySiteOutput, EvaluateOutput, MetricRow};
use anyhow::{Context, Result};
use sitecheck_core::config::LayeredConfig;
use sitecheck_core::formats::GeoJsonReader;
use sitecheck_core::models::{AnalysisOutcome, FeatureCollection};
use sitecheck_core::rules::{self, RuleSet};
use sitecheck_core::SiteEngine;
use std::fs;
use std::path::Path;

fn read_collection(label: &str, path: Option<&Path>) -> Result<FeatureCollection> {
    match path {
        Some(path) => GeoJsonReader
            .read(path)
            .with_context(|| format!("Failed to read {} from {}", label, path.display())),
        None => {
            tracing::warn!(dataset = label, "No file given, using an empty dataset");
            Ok(FeatureCollection::default())
        }
    }
}

pub fn execute(args: EvaluateArgs, layered: &LayeredConfig, output: &OutputWriter) -> Result<()> {
    let config = layered.engine_config();

    let rule_set = match &args.rules {
        Some(path) => RuleSet::load_from_file(path)
            .with_context(|| format!("Failed to load rules from {}", path.display()))?,
        None => RuleSet::default(),
    };

    let site = read_collection("site", Some(args.site.as_path()))?;
    let settlements = read_collection("settlements", args.settlements.as_deref())?;
    let protected_areas = read_collection("protected areas", args.protected_areas.as_deref())?;

    let engine = SiteEngine::new(config, &settlements, &protected_areas)
        .context("Failed to prepare reference data")?;

    let site_label = args.site.display().to_string();

    let result = match engine.analyze(&site).context("Site analysis failed")? {
        AnalysisOutcome::EmptySite => {
            output.warning(format!("{} contains no features, nothing to analyze", site_label));
            if output.is_json() {
                output.result(EmptySiteOutput { site: site_label, analyzed: false })?;
            }
            return Ok(());
        }
        AnalysisOutcome::Complete(result) => result,
    };

    let evaluation = rules::evaluate(&result.metrics, &rule_set);

    let map_data_path = match &args.map_data {
        Some(path) => {
            let payload = serde_json::to_string_pretty(&result.map_data)?;
            fs::write(path, payload)
                .with_context(|| format!("Failed to write map data to {}", path.display()))?;
            Some(path.display().to_string())
        }
        None => None,
    };

    if output.is_json() {
        output.result(EvaluateOutput {
            site: site_label,
            site_features: site.len(),
            metrics: result.metrics,
            rules: evaluation,
            map_data_path,
        })?;
        return Ok(());
    }

    output.section("Site");
    output.kv("File", &site_label);
    output.kv("Features", site.len());
    output.kv("Settlements loaded", settlements.len());
    output.kv("Protected areas loaded", protected_areas.len());

    output.section("Site Metrics");
    output.table(MetricRow::from_metrics(&result.metrics));

    output.section("Rule Evaluation");
    if evaluation.is_compliant {
        output.success("All rules satisfied");
    } else {
        for finding in &evaluation.findings {
            output.error(finding);
        }
    }

    if let Some(path) = map_data_path {
        output.info(format!("Map data written to {}", path));
    }

    Ok(())
}
