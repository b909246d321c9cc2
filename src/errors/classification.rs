use super::types::XaiError;

#[derive(Debug, Clone)]
pub struct ErrorClassification {
    pub error_type: &'static str,
    pub retryable: bool,
}

impl XaiError {
    /// Classify this error to determine its type and whether it can be retried.
    pub fn classify(&self) -> ErrorClassification {
        match self {
            // Transient upstream failures
            XaiError::Network(_) => ErrorClassification {
                error_type: "NetworkError",
                retryable: true,
            },
            XaiError::Timeout(_) => ErrorClassification {
                error_type: "TimeoutError",
                retryable: true,
            },

            // Everything else fails fast
            XaiError::Validation(_) => ErrorClassification {
                error_type: "ValidationError",
                retryable: false,
            },
            XaiError::Upstream { .. } => ErrorClassification {
                error_type: "UpstreamComputeError",
                retryable: false,
            },
            XaiError::InvalidOutput(_) => ErrorClassification {
                error_type: "InvalidOutputError",
                retryable: false,
            },
            XaiError::Persistence(_) => ErrorClassification {
                error_type: "PersistenceError",
                retryable: false,
            },
            XaiError::MalformedRecord { .. } => ErrorClassification {
                error_type: "MalformedRecordError",
                retryable: false,
            },
            XaiError::Config(_) => ErrorClassification {
                error_type: "ConfigError",
                retryable: false,
            },
            XaiError::Io(_) => ErrorClassification {
                error_type: "IoError",
                retryable: false,
            },
            XaiError::Json(_) => ErrorClassification {
                error_type: "JsonError",
                retryable: false,
            },
            XaiError::Yaml(_) => ErrorClassification {
                error_type: "YamlError",
                retryable: false,
            },
            XaiError::Internal(_) => ErrorClassification {
                error_type: "InternalError",
                retryable: false,
            },
        }
    }
}
