use std::path::Path;
use std::time::Duration;
use async_trait::async_trait;
use data_encoding::BASE64;
use reqwest::header::CONTENT_TYPE;
use serde::Deserialize;
use tracing::debug;
use crate::errors::{with_retry, RetryConfig, XaiError};
use crate::storage::ArtifactKind;
use super::{Classifier, Explainer, Explanation};

#[derive(Debug, Deserialize)]
struct PredictResponse {
    probability: f64,
}

#[derive(Debug, Deserialize)]
struct ExplainResponse {
    probability: Option<f64>,
    gradcam: String,
    lime: String,
    occlusion: String,
}

impl ExplainResponse {
    fn payload(&self, kind: ArtifactKind) -> &str {
        match kind {
            ArtifactKind::GradCam => &self.gradcam,
            ArtifactKind::Lime => &self.lime,
            ArtifactKind::Occlusion => &self.occlusion,
        }
    }
}

/// Shared HTTP plumbing for the inference sidecar.
#[derive(Debug, Clone)]
struct SidecarClient {
    http: reqwest::Client,
    endpoint: String,
    retry: RetryConfig,
}

impl SidecarClient {
    fn new(base_url: &str, path: &str, timeout: Duration, retry: RetryConfig) -> Result<Self, XaiError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| XaiError::Config(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            http,
            endpoint: format!("{}/{}", base_url.trim_end_matches('/'), path),
            retry,
        })
    }

    /// POST the raw image bytes and decode the JSON reply, retrying
    /// transient failures.
    async fn post_image<T: serde::de::DeserializeOwned>(&self, image: &Path) -> Result<T, XaiError> {
        let bytes = tokio::fs::read(image).await?;

        with_retry(&self.endpoint, &self.retry, || {
            let body = bytes.clone();
            async move {
                let response = self
                    .http
                    .post(&self.endpoint)
                    .header(CONTENT_TYPE, "application/octet-stream")
                    .body(body)
                    .send()
                    .await?;

                let status = response.status();
                if status.is_server_error() {
                    return Err(XaiError::Network(format!("{} returned {}", self.endpoint, status)));
                }
                if !status.is_success() {
                    let text = response.text().await.unwrap_or_default();
                    return Err(XaiError::InvalidOutput(format!(
                        "{} returned {}: {}",
                        self.endpoint, status, text
                    )));
                }

                response
                    .json::<T>()
                    .await
                    .map_err(|e| XaiError::InvalidOutput(format!("Undecodable reply from {}: {}", self.endpoint, e)))
            }
        })
        .await
    }
}

/// Classifier served by the inference sidecar at `POST {base}/predict`.
#[derive(Debug, Clone)]
pub struct RemoteClassifier {
    client: SidecarClient,
}

impl RemoteClassifier {
    pub fn new(base_url: &str, timeout: Duration, retry: RetryConfig) -> Result<Self, XaiError> {
        Ok(Self { client: SidecarClient::new(base_url, "predict", timeout, retry)? })
    }
}

#[async_trait]
impl Classifier for RemoteClassifier {
    async fn predict(&self, image: &Path) -> Result<f64, XaiError> {
        let reply: PredictResponse = self.client.post_image(image).await?;
        debug!(endpoint = %self.client.endpoint, probability = reply.probability, "Classifier replied");
        Ok(reply.probability)
    }

    fn name(&self) -> &str {
        "remote-classifier"
    }
}

/// Explainer served by the inference sidecar at `POST {base}/explain`.
/// Overlays arrive as base64 PNGs and are written to the output directory.
#[derive(Debug, Clone)]
pub struct RemoteExplainer {
    client: SidecarClient,
}

impl RemoteExplainer {
    pub fn new(base_url: &str, timeout: Duration, retry: RetryConfig) -> Result<Self, XaiError> {
        Ok(Self { client: SidecarClient::new(base_url, "explain", timeout, retry)? })
    }
}

#[async_trait]
impl Explainer for RemoteExplainer {
    async fn explain(&self, image: &Path, output_dir: &Path) -> Result<Explanation, XaiError> {
        let reply: ExplainResponse = self.client.post_image(image).await?;

        // Decode everything before touching the disk so a bad payload
        // leaves previous artifacts intact.
        let mut decoded = Vec::with_capacity(ArtifactKind::ALL.len());
        for kind in ArtifactKind::ALL {
            let bytes = BASE64
                .decode(reply.payload(kind).trim().as_bytes())
                .map_err(|e| XaiError::InvalidOutput(format!("{} is not valid base64: {}", kind.file_name(), e)))?;
            if bytes.is_empty() {
                return Err(XaiError::InvalidOutput(format!("{} is empty", kind.file_name())));
            }
            decoded.push((kind, bytes));
        }

        tokio::fs::create_dir_all(output_dir).await?;
        for (kind, bytes) in decoded {
            tokio::fs::write(output_dir.join(kind.file_name()), bytes).await?;
        }

        debug!(endpoint = %self.client.endpoint, probability = ?reply.probability, "Explainer replied");
        Ok(Explanation { probability: reply.probability })
    }

    fn name(&self) -> &str {
        "remote-explainer"
    }
}
