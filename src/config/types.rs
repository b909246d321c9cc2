use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_PUBLIC_URL: &str = "http://localhost:5000";
pub const DEFAULT_CORS_ORIGIN: &str = "http://localhost:5173";
pub const DEFAULT_STATIC_DIR: &str = "./static";
pub const DEFAULT_REPORTS_DIR: &str = "./data/reports";
pub const DEFAULT_MODEL_URL: &str = "http://localhost:8501";
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_MAX_RETRIES: u32 = 2;

/// On-disk YAML configuration. Every field is optional; gaps are filled
/// by [`Settings::from_config`].
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct XaiConfig {
    pub server: Option<ServerConfig>,
    pub storage: Option<StorageConfig>,
    pub model: Option<ModelConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct ServerConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    /// Base used to build the absolute artifact URLs handed to clients.
    pub public_url: Option<String>,
    pub cors_origins: Option<Vec<String>>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct StorageConfig {
    /// Served under `/static`; holds `uploads/` and `explanations/`.
    pub static_dir: Option<String>,
    pub reports_dir: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct ModelConfig {
    pub classifier_url: Option<String>,
    pub explainer_url: Option<String>,
    pub timeout_secs: Option<u64>,
    pub max_retries: Option<u32>,
}

/// Fully resolved runtime settings.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub host: String,
    pub port: u16,
    pub public_url: String,
    pub cors_origins: Vec<String>,
    pub static_dir: PathBuf,
    pub reports_dir: PathBuf,
    pub classifier_url: String,
    pub explainer_url: String,
    pub timeout_secs: u64,
    pub max_retries: u32,
}

impl Settings {
    pub fn from_config(config: &XaiConfig) -> Self {
        let server = config.server.clone().unwrap_or_default();
        let storage = config.storage.clone().unwrap_or_default();
        let model = config.model.clone().unwrap_or_default();

        Self {
            host: server.host.unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: server.port.unwrap_or(DEFAULT_PORT),
            public_url: server
                .public_url
                .unwrap_or_else(|| DEFAULT_PUBLIC_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            cors_origins: server
                .cors_origins
                .unwrap_or_else(|| vec![DEFAULT_CORS_ORIGIN.to_string()]),
            static_dir: PathBuf::from(storage.static_dir.unwrap_or_else(|| DEFAULT_STATIC_DIR.to_string())),
            reports_dir: PathBuf::from(storage.reports_dir.unwrap_or_else(|| DEFAULT_REPORTS_DIR.to_string())),
            classifier_url: model.classifier_url.unwrap_or_else(|| DEFAULT_MODEL_URL.to_string()),
            explainer_url: model.explainer_url.unwrap_or_else(|| DEFAULT_MODEL_URL.to_string()),
            timeout_secs: model.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS),
            max_retries: model.max_retries.unwrap_or(DEFAULT_MAX_RETRIES),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::from_config(&XaiConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.port, 5000);
        assert_eq!(settings.cors_origins, vec!["http://localhost:5173".to_string()]);
        assert_eq!(settings.static_dir, PathBuf::from("./static"));
        assert_eq!(settings.reports_dir, PathBuf::from("./data/reports"));
    }

    #[test]
    fn test_partial_config_keeps_other_defaults() {
        let config: XaiConfig = serde_yaml::from_str(
            "server:\n  port: 9000\n  public_url: https://xray.example.org/\nmodel:\n  max_retries: 0\n",
        )
        .unwrap();
        let settings = Settings::from_config(&config);
        assert_eq!(settings.port, 9000);
        assert_eq!(settings.public_url, "https://xray.example.org");
        assert_eq!(settings.max_retries, 0);
        assert_eq!(settings.host, "0.0.0.0");
        assert_eq!(settings.timeout_secs, 120);
    }

    #[test]
    fn test_empty_config_default() {
        let config = XaiConfig::default();
        assert!(config.server.is_none());
        assert!(config.storage.is_none());
        assert!(config.model.is_none());
    }
}
