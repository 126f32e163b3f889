use std::path::Path;

use sitecheck_core::config::EngineConfig;
use sitecheck_core::formats::GeoJsonReader;
use sitecheck_core::models::FeatureCollection;
use sitecheck_core::rules::RuleSet;
use sitecheck_core::{Result, SiteEngine};

use crate::config::DatasetPaths;

/// Read a reference dataset; an unconfigured path means no data
pub fn load_dataset(label: &str, path: Option<&Path>) -> Result<FeatureCollection> {
    match path {
        Some(path) => {
            let collection = GeoJsonReader.read(path)?;
            tracing::info!(
                dataset = label,
                path = %path.display(),
                features = collection.len(),
                "Loaded reference dataset"
            );
            Ok(collection)
        }
        None => {
            tracing::warn!(dataset = label, "No path configured, using an empty dataset");
            Ok(FeatureCollection::default())
        }
    }
}

pub struct AppState {
    pub engine: SiteEngine,
    pub rules: RuleSet,
    pub datasets: DatasetPaths,
}

impl AppState {
    pub fn new(engine: SiteEngine, rules: RuleSet, datasets: DatasetPaths) -> Self {
        Self { engine, rules, datasets }
    }

    /// Read the configured datasets and index them
    pub fn load(config: EngineConfig, rules: RuleSet, datasets: DatasetPaths) -> Result<Self> {
        let (settlements, protected_areas) = Self::read_datasets(&datasets)?;
        let engine = SiteEngine::new(config, &settlements, &protected_areas)?;
        Ok(Self::new(engine, rules, datasets))
    }

    /// Re-read the configured datasets and swap the engine's snapshot
    pub fn reload(&self) -> Result<()> {
        let (settlements, protected_areas) = Self::read_datasets(&self.datasets)?;
        self.engine.reload(&settlements, &protected_areas)
    }

    fn read_datasets(datasets: &DatasetPaths) -> Result<(FeatureCollection, FeatureCollection)> {
        Ok((
            load_dataset("settlements", datasets.settlements.as_deref())?,
            load_dataset("protected_areas", datasets.protected_areas.as_deref())?,
        ))
    }
}
