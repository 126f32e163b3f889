use std::env;
use std::path::PathBuf;

/// API server configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub port: u16,
    pub cors_origin: String,
    /// TOML file for the layered engine configuration
    pub config_path: Option<PathBuf>,
    pub datasets: DatasetPaths,
    pub rules_path: Option<PathBuf>,
}

/// Where the reference datasets are read from on startup and reload
#[derive(Debug, Clone, Default)]
pub struct DatasetPaths {
    pub settlements: Option<PathBuf>,
    pub protected_areas: Option<PathBuf>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            port: 3001,
            cors_origin: "http://localhost:3000".to_string(),
            config_path: None,
            datasets: DatasetPaths::default(),
            rules_path: None,
        }
    }
}

fn env_path(var: &str) -> Option<PathBuf> {
    env::var(var).ok().filter(|v| !v.trim().is_empty()).map(PathBuf::from)
}

impl ApiConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let port = env::var("SITECHECK_PORT").ok().and_then(|p| p.parse().ok()).unwrap_or(3001);

        let cors_origin = env::var("SITECHECK_CORS_ORIGIN")
            .unwrap_or_else(|_| "http://localhost:3000".to_string());

        Self {
            port,
            cors_origin,
            config_path: env_path("SITECHECK_CONFIG"),
            datasets: DatasetPaths {
                settlements: env_path("SITECHECK_SETTLEMENTS_PATH"),
                protected_areas: env_path("SITECHECK_PROTECTED_AREAS_PATH"),
            },
            rules_path: env_path("SITECHECK_RULES_PATH"),
        }
    }

    /// Get the server bind address
    pub fn bind_address(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }
}
