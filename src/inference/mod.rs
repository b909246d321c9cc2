pub mod remote;

use std::path::Path;
use async_trait::async_trait;
use crate::errors::XaiError;

pub use remote::{RemoteClassifier, RemoteExplainer};

/// Binary X-ray classifier.
#[async_trait]
pub trait Classifier: Send + Sync {
    /// Probability of pneumonia for the image at `image`, in [0, 1].
    async fn predict(&self, image: &Path) -> Result<f64, XaiError>;

    /// Implementation name for logging
    fn name(&self) -> &str;
}

/// Result of an explanation run. The overlays themselves are written to
/// the output directory handed to [`Explainer::explain`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Explanation {
    /// Probability recomputed alongside the overlays, if the explainer
    /// produced one.
    pub probability: Option<f64>,
}

/// Produces Grad-CAM, LIME and occlusion-sensitivity overlays.
#[async_trait]
pub trait Explainer: Send + Sync {
    /// Write `gradcam.png`, `lime.png` and `occlusion.png` for `image`
    /// into `output_dir`, creating it if needed.
    async fn explain(&self, image: &Path, output_dir: &Path) -> Result<Explanation, XaiError>;

    /// Implementation name for logging
    fn name(&self) -> &str;
}
