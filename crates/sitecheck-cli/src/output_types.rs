use serde::Serialize;
use sitecheck_core::config::ConfigSource;
use sitecheck_core::models::SiteMetrics;
use sitecheck_core::rules::RuleEvaluation;
use tabled::Tabled;

/// Output for evaluate command
#[derive(Debug, Serialize)]
pub struct EvaluateOutput {
    pub site: String,
    pub site_features: usize,
    pub metrics: SiteMetrics,
    pub rules: RuleEvaluation,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub map_data_path: Option<String>,
}

/// Output for evaluate command when the site had no features
#[derive(Debug, Serialize)]
pub struct EmptySiteOutput {
    pub site: String,
    pub analyzed: bool,
}

/// One metric as a table row
#[derive(Debug, Tabled)]
pub struct MetricRow {
    #[tabled(rename = "Metric")]
    pub metric: &'static str,
    #[tabled(rename = "Value")]
    pub value: String,
}

fn or_dash(value: &Option<String>) -> String {
    value.clone().unwrap_or_else(|| "-".to_string())
}

impl MetricRow {
    pub fn from_metrics(metrics: &SiteMetrics) -> Vec<MetricRow> {
        let distance = match metrics.distance_to_settlements_m {
            Some(d) => format!("{:.1} m", d),
            None => "undefined (no settlement data)".to_string(),
        };

        vec![
            MetricRow { metric: "Distance to settlements", value: distance },
            MetricRow { metric: "Nearest settlement", value: or_dash(&metrics.nearest_settlement_name) },
            MetricRow { metric: "Settlement type", value: or_dash(&metrics.nearest_settlement_type) },
            MetricRow {
                metric: "Overlaps protected area",
                value: if metrics.overlaps_protected_area { "yes" } else { "no" }.to_string(),
            },
            MetricRow { metric: "Protected area", value: or_dash(&metrics.protected_area_name) },
            MetricRow { metric: "Protection type", value: or_dash(&metrics.protected_area_type) },
        ]
    }
}

/// Output for config command
#[derive(Debug, Serialize)]
pub struct InspectConfigOutput {
    pub values: Vec<ConfigEntry>,
}

#[derive(Debug, Serialize, Tabled)]
pub struct ConfigEntry {
    #[tabled(rename = "Key")]
    pub key: String,
    #[tabled(rename = "Value")]
    pub value: String,
    #[tabled(rename = "Source")]
    pub source: String,
}

impl ConfigEntry {
    pub fn new(key: String, value: String, source: ConfigSource) -> Self {
        Self { key, value, source: format!("{:?}", source) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_rows_show_undefined_distance() {
        let rows = MetricRow::from_metrics(&SiteMetrics::default());
        assert_eq!(rows.len(), 6);
        assert!(rows[0].value.starts_with("undefined"));
        assert_eq!(rows[1].value, "-");
        assert_eq!(rows[3].value, "no");
    }

    #[test]
    fn test_metric_rows_format_distance() {
        let metrics = SiteMetrics {
            distance_to_settlements_m: Some(400.04),
            nearest_settlement_name: Some("Dorf".to_string()),
            ..Default::default()
        };
        let rows = MetricRow::from_metrics(&metrics);
        assert_eq!(rows[0].value, "400.0 m");
        assert_eq!(rows[1].value, "Dorf");
    }
}
