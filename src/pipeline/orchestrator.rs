use std::sync::Arc;
use tracing::{error, info, warn};
use crate::errors::XaiError;
use crate::inference::{Classifier, Explainer};
use crate::models::{DiagnosisResult, PatientMetadata};
use crate::reports::ReportService;
use crate::storage::{ArtifactKind, SavedUpload, StaticLayout, UploadStore};
use crate::utils::filename::validate_path_segment;
use super::state::{ExplanationStage, PredictionStage, StageTracker};

pub const MISSING_PATIENT_ID: &str = "Missing patientId/patient_id in form data";
pub const NO_FILE_SELECTED: &str = "No file selected";

/// An uploaded image as received from the client.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub filename: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct PredictRequest {
    pub image: ImageUpload,
    pub patient: PatientMetadata,
}

#[derive(Debug, Clone)]
pub struct PredictOutcome {
    pub result: DiagnosisResult,
    pub patient: PatientMetadata,
    /// `None` when the report could not be persisted.
    pub report_id: Option<String>,
    pub stage: PredictionStage,
}

#[derive(Debug, Clone)]
pub struct ExplainRequest {
    pub image: ImageUpload,
    pub patient_id: String,
}

#[derive(Debug, Clone)]
pub struct ExplainOutcome {
    /// Present when the explainer recomputed the probability.
    pub result: Option<DiagnosisResult>,
    pub patient_id: String,
    /// Report the artifacts were merged into, if any.
    pub report_id: Option<String>,
    pub stage: ExplanationStage,
}

impl ExplainOutcome {
    pub fn artifact_ref(&self, kind: ArtifactKind) -> String {
        StaticLayout::artifact_ref(&self.patient_id, kind)
    }
}

/// Runs the prediction and explanation flows against injected
/// collaborators. Built once at startup, shared read-only.
#[derive(Clone)]
pub struct Orchestrator {
    reports: ReportService,
    uploads: UploadStore,
    classifier: Arc<dyn Classifier>,
    explainer: Arc<dyn Explainer>,
}

impl Orchestrator {
    pub fn new(
        reports: ReportService,
        uploads: UploadStore,
        classifier: Arc<dyn Classifier>,
        explainer: Arc<dyn Explainer>,
    ) -> Self {
        Self { reports, uploads, classifier, explainer }
    }

    pub fn reports(&self) -> &ReportService {
        &self.reports
    }

    async fn save_image(&self, image: &ImageUpload) -> Result<SavedUpload, XaiError> {
        if image.filename.trim().is_empty() || image.bytes.is_empty() {
            return Err(XaiError::validation(NO_FILE_SELECTED));
        }
        self.uploads.save(&image.filename, &image.bytes).await
    }

    /// received → image-saved → classified → persisted.
    ///
    /// A classifier failure aborts with an upstream error and leaves the
    /// report in its image-saved state. A persistence failure is logged
    /// and the classification is still returned.
    pub async fn predict(&self, request: PredictRequest) -> Result<PredictOutcome, XaiError> {
        let mut tracker = StageTracker::new("predict", PredictionStage::Received);
        let PredictRequest { image, patient } = request;

        let saved = self.save_image(&image).await?;
        tracker.advance(PredictionStage::ImageSaved);

        let report_id = match self.reports.create(patient.clone(), &saved.filename).await {
            Ok(report) => Some(report.report_id),
            Err(e) => {
                warn!(request_id = tracker.request_id(), error = %e, "Report not persisted; continuing with classification");
                None
            }
        };

        let result = self
            .classify(&saved)
            .await
            .map_err(|e| {
                error!(request_id = tracker.request_id(), report_id = ?report_id, error = %e, "Classification failed");
                XaiError::upstream("Prediction failed", &e)
            })?;
        tracker.advance(PredictionStage::Classified);

        if let Some(id) = &report_id {
            match self.reports.attach_prediction(id, result.label, result.confidence).await {
                Ok(()) => tracker.advance(PredictionStage::Persisted),
                Err(e) => warn!(request_id = tracker.request_id(), report_id = %id, error = %e, "Prediction not persisted"),
            }
        }

        info!(
            request_id = tracker.request_id(),
            label = %result.label,
            confidence = result.confidence,
            stage = %tracker.stage(),
            "Prediction complete"
        );

        Ok(PredictOutcome {
            result,
            patient,
            report_id,
            stage: tracker.stage(),
        })
    }

    async fn classify(&self, saved: &SavedUpload) -> Result<DiagnosisResult, XaiError> {
        let probability = self.classifier.predict(&saved.path).await?;
        DiagnosisResult::from_probability(probability)
    }

    /// received → image-saved → explained → merged.
    ///
    /// Explainer failure or invalid output aborts with an upstream error.
    /// A merge failure is logged and the explanation is still returned.
    pub async fn explain(&self, request: ExplainRequest) -> Result<ExplainOutcome, XaiError> {
        let mut tracker = StageTracker::new("explain", ExplanationStage::Received);
        let ExplainRequest { image, patient_id } = request;

        if patient_id.trim().is_empty() {
            return Err(XaiError::validation(MISSING_PATIENT_ID));
        }
        validate_path_segment(&patient_id)?;

        let saved = self.save_image(&image).await?;
        tracker.advance(ExplanationStage::ImageSaved);

        let result = self
            .run_explainer(&saved, &patient_id)
            .await
            .map_err(|e| {
                error!(request_id = tracker.request_id(), patient_id = %patient_id, error = %e, "Explanation failed");
                XaiError::upstream("Explanation failed", &e)
            })?;
        tracker.advance(ExplanationStage::Explained);

        let refs = |kind| StaticLayout::artifact_ref(&patient_id, kind);
        let merged = self
            .reports
            .attach_explanation(
                &patient_id,
                &refs(ArtifactKind::GradCam),
                &refs(ArtifactKind::Lime),
                &refs(ArtifactKind::Occlusion),
                result.map(|r| r.label),
                result.map(|r| r.confidence),
            )
            .await;

        let report_id = match merged {
            Ok(Some(id)) => {
                tracker.advance(ExplanationStage::Merged);
                Some(id)
            }
            Ok(None) => None,
            Err(e) => {
                warn!(request_id = tracker.request_id(), patient_id = %patient_id, error = %e, "Explanation not merged");
                None
            }
        };

        Ok(ExplainOutcome {
            result,
            patient_id,
            report_id,
            stage: tracker.stage(),
        })
    }

    async fn run_explainer(
        &self,
        saved: &SavedUpload,
        patient_id: &str,
    ) -> Result<Option<DiagnosisResult>, XaiError> {
        let layout = self.reports.layout();
        let output_dir = layout.patient_dir(patient_id);

        // Overlays from an earlier run must not satisfy the check below.
        for kind in ArtifactKind::ALL {
            match tokio::fs::remove_file(layout.artifact_path(patient_id, kind)).await {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }

        let explanation = self.explainer.explain(&saved.path, &output_dir).await?;

        for kind in ArtifactKind::ALL {
            let path = layout.artifact_path(patient_id, kind);
            if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
                return Err(XaiError::InvalidOutput(format!(
                    "{} missing after explanation ({})",
                    kind.file_name(),
                    self.explainer.name()
                )));
            }
        }

        explanation
            .probability
            .map(DiagnosisResult::from_probability)
            .transpose()
    }
}
