use crate::error::{Result, SitecheckError};
use crate::models::{AttributeKeys, Crs};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::Path;

/// Configuration source for tracking where values come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Default value
    Default,
    /// Loaded from config file
    File,
    /// Loaded from environment variable
    Environment,
    /// Provided via CLI argument
    Cli,
}

impl ConfigSource {
    /// Returns the precedence level (higher = higher priority)
    pub fn precedence(&self) -> u8 {
        match self {
            ConfigSource::Default => 0,
            ConfigSource::File => 1,
            ConfigSource::Environment => 2,
            ConfigSource::Cli => 3,
        }
    }
}

/// A configuration value with its source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigValue<T> {
    pub value: T,
    pub source: ConfigSource,
}

impl<T> ConfigValue<T> {
    pub fn new(value: T, source: ConfigSource) -> Self {
        Self { value, source }
    }

    /// Update the value if the new source has higher precedence
    pub fn update(&mut self, value: T, source: ConfigSource) {
        if source.precedence() > self.source.precedence() {
            self.value = value;
            self.source = source;
        }
    }
}

/// Settings the engine is constructed with.
///
/// Passed explicitly so engines for different regions can coexist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Projected CRS all distance and overlap math runs in
    pub metric_crs: Crs,
    /// Geographic CRS used for map output
    pub display_crs: Crs,
    /// CRS assumed for collections that do not declare one
    pub default_source_crs: Crs,
    /// Attribute keys used to read feature names and types
    pub attributes: AttributeKeys,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            metric_crs: Crs::etrs89_utm32n(),
            display_crs: Crs::wgs84(),
            default_source_crs: Crs::wgs84(),
            attributes: AttributeKeys::default(),
        }
    }
}

/// Layered configuration for Sitecheck
#[derive(Debug, Clone)]
pub struct LayeredConfig {
    pub metric_crs: ConfigValue<u32>,
    pub display_crs: ConfigValue<u32>,
    pub default_source_crs: ConfigValue<u32>,
    pub name_keys: ConfigValue<Vec<String>>,
    pub type_keys: ConfigValue<Vec<String>>,
}

impl LayeredConfig {
    /// Create a new configuration with default values
    pub fn with_defaults() -> Self {
        let defaults = EngineConfig::default();
        Self {
            metric_crs: ConfigValue::new(defaults.metric_crs.epsg, ConfigSource::Default),
            display_crs: ConfigValue::new(defaults.display_crs.epsg, ConfigSource::Default),
            default_source_crs: ConfigValue::new(
                defaults.default_source_crs.epsg,
                ConfigSource::Default,
            ),
            name_keys: ConfigValue::new(defaults.attributes.name, ConfigSource::Default),
            type_keys: ConfigValue::new(defaults.attributes.kind, ConfigSource::Default),
        }
    }

    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self> {
        let content =
            fs::read_to_string(path.as_ref()).map_err(|e| SitecheckError::ConfigInvalid {
                key: "file".to_string(),
                reason: format!("Failed to read config file: {}", e),
            })?;

        let file_config: FileConfig =
            toml::from_str(&content).map_err(|e| SitecheckError::ConfigInvalid {
                key: "file".to_string(),
                reason: format!("Failed to parse TOML: {}", e),
            })?;

        if let Some(crs) = file_config.metric_crs {
            self.metric_crs.update(crs, ConfigSource::File);
        }

        if let Some(crs) = file_config.display_crs {
            self.display_crs.update(crs, ConfigSource::File);
        }

        if let Some(crs) = file_config.default_source_crs {
            self.default_source_crs.update(crs, ConfigSource::File);
        }

        if let Some(keys) = file_config.name_keys {
            self.name_keys.update(keys, ConfigSource::File);
        }

        if let Some(keys) = file_config.type_keys {
            self.type_keys.update(keys, ConfigSource::File);
        }

        Ok(self)
    }

    /// Load configuration from environment variables
    pub fn load_from_env(mut self) -> Self {
        for (var, target) in [
            ("SITECHECK_METRIC_CRS", &mut self.metric_crs),
            ("SITECHECK_DISPLAY_CRS", &mut self.display_crs),
            ("SITECHECK_DEFAULT_SOURCE_CRS", &mut self.default_source_crs),
        ] {
            if let Ok(raw) = env::var(var) {
                match parse_epsg(&raw) {
                    Ok(epsg) => target.update(epsg, ConfigSource::Environment),
                    Err(_) => tracing::warn!(
                        "Invalid {} value '{}': expected an EPSG code such as 25832",
                        var,
                        raw
                    ),
                }
            }
        }

        if let Ok(raw) = env::var("SITECHECK_NAME_KEYS") {
            match parse_key_list(&raw) {
                Some(keys) => self.name_keys.update(keys, ConfigSource::Environment),
                None => tracing::warn!("Ignoring empty SITECHECK_NAME_KEYS"),
            }
        }

        if let Ok(raw) = env::var("SITECHECK_TYPE_KEYS") {
            match parse_key_list(&raw) {
                Some(keys) => self.type_keys.update(keys, ConfigSource::Environment),
                None => tracing::warn!("Ignoring empty SITECHECK_TYPE_KEYS"),
            }
        }

        self
    }

    /// Update configuration from CLI arguments
    pub fn update_from_cli(&mut self, overrides: CliConfigOverrides) {
        if let Some(crs) = overrides.metric_crs {
            self.metric_crs.update(crs, ConfigSource::Cli);
        }

        if let Some(crs) = overrides.display_crs {
            self.display_crs.update(crs, ConfigSource::Cli);
        }

        if let Some(crs) = overrides.default_source_crs {
            self.default_source_crs.update(crs, ConfigSource::Cli);
        }
    }

    /// Resolve the layered values into the engine's settings
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            metric_crs: Crs::from_epsg(self.metric_crs.value),
            display_crs: Crs::from_epsg(self.display_crs.value),
            default_source_crs: Crs::from_epsg(self.default_source_crs.value),
            attributes: AttributeKeys {
                name: self.name_keys.value.clone(),
                kind: self.type_keys.value.clone(),
            },
        }
    }

    /// Get all configuration values as a map for inspection
    pub fn to_inspection_map(&self) -> HashMap<String, (String, ConfigSource)> {
        let mut map = HashMap::new();

        map.insert(
            "metric_crs".to_string(),
            (format!("EPSG:{}", self.metric_crs.value), self.metric_crs.source),
        );

        map.insert(
            "display_crs".to_string(),
            (format!("EPSG:{}", self.display_crs.value), self.display_crs.source),
        );

        map.insert(
            "default_source_crs".to_string(),
            (format!("EPSG:{}", self.default_source_crs.value), self.default_source_crs.source),
        );

        map.insert(
            "name_keys".to_string(),
            (self.name_keys.value.join(", "), self.name_keys.source),
        );

        map.insert(
            "type_keys".to_string(),
            (self.type_keys.value.join(", "), self.type_keys.source),
        );

        map
    }
}

/// Configuration loaded from TOML file
#[derive(Debug, Deserialize, Serialize)]
struct FileConfig {
    metric_crs: Option<u32>,
    display_crs: Option<u32>,
    default_source_crs: Option<u32>,
    name_keys: Option<Vec<String>>,
    type_keys: Option<Vec<String>>,
}

/// CLI configuration overrides
#[derive(Debug, Default)]
pub struct CliConfigOverrides {
    pub metric_crs: Option<u32>,
    pub display_crs: Option<u32>,
    pub default_source_crs: Option<u32>,
}

/// Parse an EPSG code, with or without the `EPSG:` prefix
pub fn parse_epsg(s: &str) -> Result<u32> {
    Crs::parse(s).map(|crs| crs.epsg).map_err(|e| SitecheckError::ConfigInvalid {
        key: "crs".to_string(),
        reason: e.to_string(),
    })
}

/// Parse a comma separated key list, dropping blanks
fn parse_key_list(s: &str) -> Option<Vec<String>> {
    let keys: Vec<String> = s
        .split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(String::from)
        .collect();

    if keys.is_empty() {
        None
    } else {
        Some(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = LayeredConfig::with_defaults();
        assert_eq!(config.metric_crs.value, 25832);
        assert_eq!(config.metric_crs.source, ConfigSource::Default);
        assert_eq!(config.display_crs.value, 4326);
        assert_eq!(config.default_source_crs.value, 4326);
        assert_eq!(config.name_keys.value[0], "name");
    }

    #[test]
    fn test_config_precedence() {
        let mut value = ConfigValue::new(100, ConfigSource::Default);

        value.update(200, ConfigSource::File);
        assert_eq!(value.value, 200);
        assert_eq!(value.source, ConfigSource::File);

        value.update(300, ConfigSource::Environment);
        assert_eq!(value.value, 300);
        assert_eq!(value.source, ConfigSource::Environment);

        value.update(400, ConfigSource::Cli);
        assert_eq!(value.value, 400);
        assert_eq!(value.source, ConfigSource::Cli);

        // Lower precedence should not override
        value.update(500, ConfigSource::File);
        assert_eq!(value.value, 400);
        assert_eq!(value.source, ConfigSource::Cli);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
metric_crs = 25833
display_crs = 4326
name_keys = ["label"]
"#
        )
        .unwrap();

        let config = LayeredConfig::with_defaults().load_from_file(file.path()).unwrap();

        assert_eq!(config.metric_crs.value, 25833);
        assert_eq!(config.metric_crs.source, ConfigSource::File);
        assert_eq!(config.display_crs.source, ConfigSource::File);
        assert_eq!(config.default_source_crs.source, ConfigSource::Default);
        assert_eq!(config.name_keys.value, vec!["label".to_string()]);
        assert_eq!(config.type_keys.source, ConfigSource::Default);
    }

    #[test]
    fn test_load_from_missing_file() {
        let result = LayeredConfig::with_defaults().load_from_file("/nonexistent/sitecheck.toml");
        assert!(matches!(result, Err(SitecheckError::ConfigInvalid { .. })));
    }

    #[test]
    #[serial]
    fn test_load_from_env() {
        env::set_var("SITECHECK_METRIC_CRS", "EPSG:25833");
        env::set_var("SITECHECK_DISPLAY_CRS", "not-a-code");
        env::set_var("SITECHECK_TYPE_KEYS", "kategorie, ,layer");

        let config = LayeredConfig::with_defaults().load_from_env();

        env::remove_var("SITECHECK_METRIC_CRS");
        env::remove_var("SITECHECK_DISPLAY_CRS");
        env::remove_var("SITECHECK_TYPE_KEYS");

        assert_eq!(config.metric_crs.value, 25833);
        assert_eq!(config.metric_crs.source, ConfigSource::Environment);
        // Invalid values are ignored
        assert_eq!(config.display_crs.value, 4326);
        assert_eq!(config.display_crs.source, ConfigSource::Default);
        assert_eq!(config.type_keys.value, vec!["kategorie".to_string(), "layer".to_string()]);
    }

    #[test]
    fn test_cli_overrides() {
        let mut config = LayeredConfig::with_defaults();

        config.update_from_cli(CliConfigOverrides {
            metric_crs: Some(3857),
            display_crs: None,
            default_source_crs: Some(4258),
        });

        assert_eq!(config.metric_crs.value, 3857);
        assert_eq!(config.metric_crs.source, ConfigSource::Cli);
        assert_eq!(config.display_crs.source, ConfigSource::Default);

        let engine = config.engine_config();
        assert_eq!(engine.metric_crs.epsg, 3857);
        assert_eq!(engine.default_source_crs.name, "ETRS89");
    }

    #[test]
    fn test_parse_epsg() {
        assert_eq!(parse_epsg("25832").unwrap(), 25832);
        assert_eq!(parse_epsg("EPSG:4326").unwrap(), 4326);
        assert!(parse_epsg("utm32").is_err());
    }

    #[test]
    fn test_inspection_map() {
        let config = LayeredConfig::with_defaults();
        let map = config.to_inspection_map();

        assert_eq!(map.len(), 5);
        let (crs_value, crs_source) = &map["metric_crs"];
        assert_eq!(crs_value, "EPSG:25832");
        assert_eq!(*crs_source, ConfigSource::Default);
    }
}
