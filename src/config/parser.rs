use std::path::Path;
use crate::errors::XaiError;
use super::types::{Settings, XaiConfig};
use super::security::validate_security_patterns;
use super::schema::CONFIG_SCHEMA;
use tracing::warn;

const MAX_CONFIG_BYTES: u64 = 1_048_576;

pub async fn parse_config(path: &Path) -> Result<XaiConfig, XaiError> {
    if !path.exists() {
        return Err(XaiError::Config(format!("Config file not found: {}", path.display())));
    }

    let metadata = tokio::fs::metadata(path).await?;
    if metadata.len() > MAX_CONFIG_BYTES {
        return Err(XaiError::Config("Config file exceeds 1MB limit".into()));
    }

    let content = tokio::fs::read_to_string(path).await?;
    parse_config_str(&content)
}

pub fn parse_config_str(content: &str) -> Result<XaiConfig, XaiError> {
    let yaml: serde_yaml::Value = serde_yaml::from_str(content)?;

    // An empty file deserializes to null; treat it as all-defaults.
    if yaml.is_null() {
        return Ok(XaiConfig::default());
    }

    validate_security_patterns(&yaml)?;
    validate_schema(&yaml)?;

    let config: XaiConfig = serde_yaml::from_value(yaml)?;
    validate_settings(&Settings::from_config(&config))?;

    Ok(config)
}

/// Load settings from an optional config file, falling back to defaults.
pub async fn load_settings(path: Option<&Path>) -> Result<Settings, XaiError> {
    match path {
        Some(path) => Ok(Settings::from_config(&parse_config(path).await?)),
        None => Ok(Settings::default()),
    }
}

/// Validate config against the JSON schema. Advisory only: violations are
/// logged, the typed parse that follows is authoritative.
fn validate_schema(yaml: &serde_yaml::Value) -> Result<(), XaiError> {
    let json_value = serde_json::to_value(yaml)
        .map_err(|e| XaiError::Config(format!("Config conversion error: {}", e)))?;

    let compiled = jsonschema::JSONSchema::compile(&CONFIG_SCHEMA)
        .map_err(|e| XaiError::Config(format!("Schema compilation error: {}", e)))?;

    if let Err(errors) = compiled.validate(&json_value) {
        for e in errors {
            warn!(validation_error = %format!("{} at {}", e, e.instance_path), "Config schema warning");
        }
    }

    Ok(())
}

/// Semantic checks on the resolved settings.
pub fn validate_settings(settings: &Settings) -> Result<(), XaiError> {
    if settings.port == 0 {
        return Err(XaiError::Config("server.port must be non-zero".into()));
    }
    if settings.public_url.is_empty() {
        return Err(XaiError::Config("server.public_url must not be empty".into()));
    }
    if !settings.public_url.starts_with("http://") && !settings.public_url.starts_with("https://") {
        return Err(XaiError::Config(format!(
            "server.public_url must be an http(s) URL, got '{}'",
            settings.public_url
        )));
    }
    if settings.timeout_secs == 0 {
        return Err(XaiError::Config("model.timeout_secs must be greater than zero".into()));
    }
    if settings.static_dir == settings.reports_dir {
        return Err(XaiError::Config(
            "storage.reports_dir must differ from storage.static_dir".into(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_is_default() {
        let config = parse_config_str("").unwrap();
        assert!(config.server.is_none());
    }

    #[test]
    fn test_full_document_parses() {
        let config = parse_config_str(
            r#"
server:
  host: 127.0.0.1
  port: 8080
  public_url: https://xray.example.org
  cors_origins: ["https://ui.example.org"]
storage:
  static_dir: /srv/xai/static
  reports_dir: /srv/xai/reports
model:
  classifier_url: http://inference:8501
  explainer_url: http://inference:8502
  timeout_secs: 30
  max_retries: 1
"#,
        )
        .unwrap();
        let settings = Settings::from_config(&config);
        assert_eq!(settings.host, "127.0.0.1");
        assert_eq!(settings.explainer_url, "http://inference:8502");
        assert_eq!(settings.cors_origins, vec!["https://ui.example.org".to_string()]);
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let err = parse_config_str("model:\n  timeout_secs: 0\n").unwrap_err();
        assert!(matches!(err, XaiError::Config(_)));
    }

    #[test]
    fn test_non_http_public_url_rejected() {
        let err = parse_config_str("server:\n  public_url: ftp://example.org\n").unwrap_err();
        assert!(err.to_string().contains("public_url"));
    }

    #[test]
    fn test_same_static_and_reports_dir_rejected() {
        let err = parse_config_str("storage:\n  static_dir: ./data\n  reports_dir: ./data\n").unwrap_err();
        assert!(err.to_string().contains("reports_dir"));
    }

    #[test]
    fn test_dangerous_pattern_rejected_before_typing() {
        let err = parse_config_str("server:\n  public_url: 'javascript:alert(1)'\n").unwrap_err();
        assert!(err.to_string().contains("Dangerous pattern"));
    }

    #[tokio::test]
    async fn test_missing_file_is_config_error() {
        let err = parse_config(Path::new("/nonexistent/pneumo-xai.yaml")).await.unwrap_err();
        assert!(matches!(err, XaiError::Config(_)));
    }
}
