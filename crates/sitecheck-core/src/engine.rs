//! Site analysis engine
//!
//! The engine owns the configuration and a snapshot of the indexed
//! reference data. Each analysis clones the current snapshot handle, so a
//! reload never touches an index that a running analysis is querying.

use std::sync::{Arc, PoisonError, RwLock};

use crate::config::EngineConfig;
use crate::error::Result;
use crate::geo::{analyze_proximity, CoordinateNormalizer, ResultProjector, SpatialIndex};
use crate::models::{AnalysisOutcome, AnalysisResult, FeatureCollection};

/// Indexed reference datasets in the metric CRS
#[derive(Debug)]
pub struct ReferenceSnapshot {
    pub settlements: SpatialIndex,
    pub protected_areas: SpatialIndex,
}

impl ReferenceSnapshot {
    /// Normalize and index both reference collections
    pub fn build(
        config: &EngineConfig,
        settlements: &FeatureCollection,
        protected_areas: &FeatureCollection,
    ) -> Result<Self> {
        let normalizer = CoordinateNormalizer::new(config);

        Ok(Self {
            settlements: SpatialIndex::build(normalizer.normalize(settlements)?),
            protected_areas: SpatialIndex::build(normalizer.normalize(protected_areas)?),
        })
    }

    /// A snapshot with no reference data at all
    pub fn empty(config: &EngineConfig) -> Self {
        Self {
            settlements: SpatialIndex::empty(config.metric_crs.clone()),
            protected_areas: SpatialIndex::empty(config.metric_crs.clone()),
        }
    }
}

pub struct SiteEngine {
    config: EngineConfig,
    normalizer: CoordinateNormalizer,
    projector: ResultProjector,
    snapshot: RwLock<Arc<ReferenceSnapshot>>,
}

impl SiteEngine {
    /// Create an engine and index the given reference data
    pub fn new(
        config: EngineConfig,
        settlements: &FeatureCollection,
        protected_areas: &FeatureCollection,
    ) -> Result<Self> {
        let snapshot = ReferenceSnapshot::build(&config, settlements, protected_areas)?;

        tracing::info!(
            metric_crs = %config.metric_crs,
            settlements = snapshot.settlements.len(),
            protected_areas = snapshot.protected_areas.len(),
            "Site engine ready"
        );

        Ok(Self::with_snapshot(config, snapshot))
    }

    pub fn with_snapshot(config: EngineConfig, snapshot: ReferenceSnapshot) -> Self {
        Self {
            normalizer: CoordinateNormalizer::new(&config),
            projector: ResultProjector::new(&config),
            snapshot: RwLock::new(Arc::new(snapshot)),
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The reference data analyses currently run against
    pub fn snapshot(&self) -> Arc<ReferenceSnapshot> {
        self.snapshot.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Replace the reference data.
    ///
    /// The new indexes are built before the swap; on error the previous
    /// snapshot stays in place.
    pub fn reload(
        &self,
        settlements: &FeatureCollection,
        protected_areas: &FeatureCollection,
    ) -> Result<()> {
        let snapshot = Arc::new(ReferenceSnapshot::build(&self.config, settlements, protected_areas)?);

        tracing::info!(
            settlements = snapshot.settlements.len(),
            protected_areas = snapshot.protected_areas.len(),
            "Reloaded reference data"
        );

        *self.snapshot.write().unwrap_or_else(PoisonError::into_inner) = snapshot;
        Ok(())
    }

    /// Analyze a site against the current reference snapshot
    pub fn analyze(&self, site: &FeatureCollection) -> Result<AnalysisOutcome> {
        if site.is_empty() {
            tracing::debug!("Site collection is empty, nothing to analyze");
            return Ok(AnalysisOutcome::EmptySite);
        }

        let site = self.normalizer.normalize(site)?;
        let snapshot = self.snapshot();

        let Some(analysis) = analyze_proximity(
            &site,
            &snapshot.settlements,
            &snapshot.protected_areas,
            &self.config.attributes,
        )?
        else {
            return Ok(AnalysisOutcome::EmptySite);
        };

        let map_data = self.projector.project(&analysis)?;

        Ok(AnalysisOutcome::Complete(AnalysisResult { metrics: analysis.metrics, map_data }))
    }
}

/// One-shot analysis that indexes the reference data for this call only
pub fn analyze_site(
    config: &EngineConfig,
    site: &FeatureCollection,
    settlements: &FeatureCollection,
    protected_areas: &FeatureCollection,
) -> Result<AnalysisOutcome> {
    SiteEngine::new(config.clone(), settlements, protected_areas)?.analyze(site)
}
