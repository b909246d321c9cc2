use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::info;

/// Stages of a `/predict` request. Transitions only move forward.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "kebab-case")]
pub enum PredictionStage {
    Received,
    ImageSaved,
    Classified,
    Persisted,
}

/// Stages of an `/explain` request. Transitions only move forward.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "kebab-case")]
pub enum ExplanationStage {
    Received,
    ImageSaved,
    Explained,
    Merged,
}

impl std::fmt::Display for PredictionStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Received => write!(f, "received"),
            Self::ImageSaved => write!(f, "image-saved"),
            Self::Classified => write!(f, "classified"),
            Self::Persisted => write!(f, "persisted"),
        }
    }
}

impl std::fmt::Display for ExplanationStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Received => write!(f, "received"),
            Self::ImageSaved => write!(f, "image-saved"),
            Self::Explained => write!(f, "explained"),
            Self::Merged => write!(f, "merged"),
        }
    }
}

/// Tracks one request through its stages and logs each transition.
#[derive(Debug)]
pub struct StageTracker<S> {
    kind: &'static str,
    request_id: String,
    stage: S,
    started: Instant,
}

impl<S> StageTracker<S>
where
    S: Copy + Ord + std::fmt::Display,
{
    pub fn new(kind: &'static str, initial: S) -> Self {
        let request_id = uuid::Uuid::new_v4().simple().to_string();
        info!(pipeline = kind, request_id = %request_id, stage = %initial, "Request received");
        Self { kind, request_id, stage: initial, started: Instant::now() }
    }

    pub fn stage(&self) -> S {
        self.stage
    }

    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    /// Move to `next`. Backward or repeated transitions are ignored.
    pub fn advance(&mut self, next: S) {
        if next <= self.stage {
            return;
        }
        self.stage = next;
        info!(
            pipeline = self.kind,
            request_id = %self.request_id,
            stage = %next,
            elapsed_ms = self.started.elapsed().as_millis() as u64,
            "Stage reached"
        );
    }
}
