//! Rule thresholds and their evaluation against site metrics

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SitecheckError};
use crate::models::SiteMetrics;

fn default_min_distance() -> f64 {
    1000.0
}

fn default_no_build_in_protected_area() -> bool {
    true
}

/// Site suitability thresholds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleSet {
    #[serde(default = "default_min_distance")]
    pub min_distance_to_settlements_m: f64,

    #[serde(default = "default_no_build_in_protected_area")]
    pub no_build_in_protected_area: bool,
}

impl Default for RuleSet {
    fn default() -> Self {
        Self {
            min_distance_to_settlements_m: default_min_distance(),
            no_build_in_protected_area: default_no_build_in_protected_area(),
        }
    }
}

impl RuleSet {
    /// Load thresholds from a TOML file; missing keys keep their defaults
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content =
            fs::read_to_string(path.as_ref()).map_err(|e| SitecheckError::ConfigInvalid {
                key: "rules".to_string(),
                reason: format!("Failed to read rules file: {}", e),
            })?;

        let rules = Self::from_toml(&content)?;

        tracing::debug!(
            path = %path.as_ref().display(),
            min_distance_m = rules.min_distance_to_settlements_m,
            no_build_in_protected_area = rules.no_build_in_protected_area,
            "Loaded rule set"
        );

        Ok(rules)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let rules: RuleSet = toml::from_str(content).map_err(|e| SitecheckError::ConfigInvalid {
            key: "rules".to_string(),
            reason: format!("Failed to parse TOML: {}", e),
        })?;

        if !rules.min_distance_to_settlements_m.is_finite()
            || rules.min_distance_to_settlements_m < 0.0
        {
            return Err(SitecheckError::ConfigInvalid {
                key: "min_distance_to_settlements_m".to_string(),
                reason: format!(
                    "must be a non-negative number, got {}",
                    rules.min_distance_to_settlements_m
                ),
            });
        }

        Ok(rules)
    }
}

/// Outcome of checking one site against a rule set
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RuleEvaluation {
    pub findings: Vec<String>,
    pub is_compliant: bool,
}

/// Check site metrics against the rule thresholds.
///
/// An undefined settlement distance (no settlement data) is never a
/// violation.
pub fn evaluate(metrics: &SiteMetrics, rules: &RuleSet) -> RuleEvaluation {
    let mut findings = Vec::new();

    if let Some(distance) = metrics.distance_to_settlements_m {
        if distance < rules.min_distance_to_settlements_m {
            findings.push(format!(
                "Minimum distance to settlements ({} m) not met (actual {:.1} m).",
                rules.min_distance_to_settlements_m, distance
            ));
        }
    }

    if rules.no_build_in_protected_area && metrics.overlaps_protected_area {
        let names = metrics.protected_area_name.as_deref().unwrap_or("unnamed");
        findings.push(format!("Site lies within a protected area ({}).", names));
    }

    RuleEvaluation { is_compliant: findings.is_empty(), findings }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn metrics(distance: Option<f64>, overlaps: bool) -> SiteMetrics {
        SiteMetrics {
            distance_to_settlements_m: distance,
            overlaps_protected_area: overlaps,
            protected_area_name: overlaps.then(|| "Heide, Moor".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_compliant_site() {
        let result = evaluate(&metrics(Some(1500.0), false), &RuleSet::default());
        assert!(result.is_compliant);
        assert!(result.findings.is_empty());
    }

    #[test]
    fn test_distance_violation() {
        let result = evaluate(&metrics(Some(400.4), false), &RuleSet::default());
        assert!(!result.is_compliant);
        assert_eq!(
            result.findings,
            vec!["Minimum distance to settlements (1000 m) not met (actual 400.4 m).".to_string()]
        );
    }

    #[test]
    fn test_near_miss_reports_actual_distance() {
        let result = evaluate(&metrics(Some(999.6), false), &RuleSet::default());
        assert!(!result.is_compliant);
        assert_eq!(
            result.findings,
            vec!["Minimum distance to settlements (1000 m) not met (actual 999.6 m).".to_string()]
        );
    }

    #[test]
    fn test_undefined_distance_is_not_a_violation() {
        let result = evaluate(&metrics(None, false), &RuleSet::default());
        assert!(result.is_compliant);
    }

    #[test]
    fn test_protected_area_violation() {
        let result = evaluate(&metrics(Some(2000.0), true), &RuleSet::default());
        assert!(!result.is_compliant);
        assert_eq!(result.findings, vec!["Site lies within a protected area (Heide, Moor).".to_string()]);

        let lenient = RuleSet { no_build_in_protected_area: false, ..Default::default() };
        assert!(evaluate(&metrics(Some(2000.0), true), &lenient).is_compliant);
    }

    #[test]
    fn test_load_partial_rules_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "min_distance_to_settlements_m = 800.0").unwrap();

        let rules = RuleSet::load_from_file(file.path()).unwrap();
        assert_eq!(rules.min_distance_to_settlements_m, 800.0);
        assert!(rules.no_build_in_protected_area);
    }

    #[test]
    fn test_negative_distance_rejected() {
        let result = RuleSet::from_toml("min_distance_to_settlements_m = -5.0");
        assert!(matches!(result, Err(SitecheckError::ConfigInvalid { .. })));
    }
}
