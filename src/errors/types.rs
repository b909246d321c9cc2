use thiserror::Error;

#[derive(Debug, Error)]
pub enum XaiError {
    /// Missing or malformed request input. Always surfaced as a 400.
    #[error("{0}")]
    Validation(String),

    /// The classifier or explainer failed. `message` is the generic text
    /// returned to clients, `detail` carries the underlying cause.
    #[error("{message}: {detail}")]
    Upstream { message: String, detail: String },

    #[error("Upstream request failed: {0}")]
    Network(String),

    #[error("Upstream timed out: {0}")]
    Timeout(String),

    #[error("Invalid upstream output: {0}")]
    InvalidOutput(String),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Malformed record {path}: {reason}")]
    MalformedRecord { path: String, reason: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl XaiError {
    pub fn validation(message: impl Into<String>) -> Self {
        XaiError::Validation(message.into())
    }

    /// Wrap a compute failure under the client-facing `message`.
    pub fn upstream(message: impl Into<String>, cause: &XaiError) -> Self {
        let detail = match cause {
            XaiError::Upstream { detail, .. } => detail.clone(),
            other => other.to_string(),
        };
        XaiError::Upstream { message: message.into(), detail }
    }
}

impl From<reqwest::Error> for XaiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            XaiError::Timeout(e.to_string())
        } else if e.is_decode() {
            XaiError::InvalidOutput(e.to_string())
        } else {
            XaiError::Network(e.to_string())
        }
    }
}
