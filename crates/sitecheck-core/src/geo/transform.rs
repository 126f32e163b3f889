//! CRS transformation and normalization

use proj::Proj;

use crate::config::EngineConfig;
use crate::error::{Result, SitecheckError};
use crate::models::{Coordinate, Crs, FeatureCollection, Geometry};

/// Check if two CRS are the same
pub fn crs_match(crs1: &Crs, crs2: &Crs) -> bool {
    crs1.epsg == crs2.epsg
}

/// A coordinate transformation between two EPSG coordinate systems.
///
/// Built once per source/target pair and applied to every coordinate of a
/// collection. Matching systems produce an identity transformer that never
/// touches PROJ.
pub struct CrsTransformer {
    from: Crs,
    to: Crs,
    proj: Option<Proj>,
}

impl CrsTransformer {
    pub fn new(from: &Crs, to: &Crs) -> Result<Self> {
        if crs_match(from, to) {
            return Ok(Self { from: from.clone(), to: to.clone(), proj: None });
        }

        let from_proj = format!("EPSG:{}", from.epsg);
        let to_proj = format!("EPSG:{}", to.epsg);

        // new_known_crs normalizes axis order to x=easting/longitude, y=northing/latitude
        let proj = Proj::new_known_crs(&from_proj, &to_proj, None).map_err(|e| {
            SitecheckError::UnsupportedCrs {
                crs: format!("{} -> {}", from_proj, to_proj),
                reason: format!("Failed to create projection: {}", e),
            }
        })?;

        Ok(Self { from: from.clone(), to: to.clone(), proj: Some(proj) })
    }

    pub fn is_identity(&self) -> bool {
        self.proj.is_none()
    }

    /// Transform a single coordinate
    pub fn convert(&self, coord: Coordinate) -> Result<Coordinate> {
        let Some(proj) = &self.proj else {
            return Ok(coord);
        };

        let (x, y) = proj.convert((coord[0], coord[1])).map_err(|e| {
            SitecheckError::Reprojection {
                reason: format!(
                    "({}, {}) from {} to {}: {}",
                    coord[0], coord[1], self.from, self.to, e
                ),
            }
        })?;

        if !x.is_finite() || !y.is_finite() {
            return Err(SitecheckError::Reprojection {
                reason: format!(
                    "({}, {}) is outside the domain of {} -> {}",
                    coord[0], coord[1], self.from, self.to
                ),
            });
        }

        Ok([x, y])
    }

    pub fn transform_geometry(&self, geometry: &Geometry) -> Result<Geometry> {
        if self.is_identity() {
            return Ok(geometry.clone());
        }
        geometry.try_map_coords(|c| self.convert(c))
    }

    /// Transform every feature, keeping ids and attributes
    pub fn transform_collection(&self, collection: &FeatureCollection) -> Result<FeatureCollection> {
        let features = collection
            .iter()
            .map(|feature| Ok(feature.with_geometry(self.transform_geometry(&feature.geometry)?)))
            .collect::<Result<Vec<_>>>()?;

        Ok(FeatureCollection::new(self.to.clone(), features))
    }
}

/// Brings every input collection into the engine's metric CRS
#[derive(Debug, Clone)]
pub struct CoordinateNormalizer {
    metric_crs: Crs,
    default_source_crs: Crs,
}

impl CoordinateNormalizer {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            metric_crs: config.metric_crs.clone(),
            default_source_crs: config.default_source_crs.clone(),
        }
    }

    /// The CRS a collection is interpreted in.
    ///
    /// Undeclared collections get the default geographic CRS, never the
    /// metric one: raw degrees must not be read as meters.
    pub fn source_crs<'a>(&'a self, collection: &'a FeatureCollection) -> &'a Crs {
        collection.crs.as_ref().unwrap_or(&self.default_source_crs)
    }

    /// Reproject a collection into the metric CRS
    pub fn normalize(&self, collection: &FeatureCollection) -> Result<FeatureCollection> {
        let source = self.source_crs(collection);

        if collection.crs.is_none() {
            tracing::debug!(
                assumed = %source,
                features = collection.len(),
                "Collection has no CRS, assuming default"
            );
        }

        CrsTransformer::new(source, &self.metric_crs)?.transform_collection(collection)
    }

    /// Normalize the site and both reference collections together
    pub fn normalize_all(
        &self,
        site: &FeatureCollection,
        settlements: &FeatureCollection,
        protected_areas: &FeatureCollection,
    ) -> Result<(FeatureCollection, FeatureCollection, FeatureCollection)> {
        Ok((
            self.normalize(site)?,
            self.normalize(settlements)?,
            self.normalize(protected_areas)?,
        ))
    }
}
