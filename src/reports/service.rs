use std::sync::Arc;
use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, info};
use crate::errors::XaiError;
use crate::models::{Diagnosis, PatientMetadata, Prediction, Report, XaiArtifacts};
use crate::storage::{ReportStore, StaticLayout};
use crate::utils::time::now_timestamp;

/// Report lifecycle on top of a [`ReportStore`]: creation, prediction
/// attach, explanation merge, listing and history.
///
/// Read-modify-write cycles on a single record are serialized with a
/// per-`reportId` lock. Records are never deleted, so lock entries are
/// never evicted.
#[derive(Clone)]
pub struct ReportService {
    store: Arc<dyn ReportStore>,
    layout: StaticLayout,
    locks: Arc<DashMap<String, Arc<Mutex<()>>>>,
}

impl ReportService {
    pub fn new(store: Arc<dyn ReportStore>, layout: StaticLayout) -> Self {
        Self {
            store,
            layout,
            locks: Arc::new(DashMap::new()),
        }
    }

    pub fn layout(&self) -> &StaticLayout {
        &self.layout
    }

    async fn lock_record(&self, report_id: &str) -> OwnedMutexGuard<()> {
        let lock = self
            .locks
            .entry(report_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        lock.lock_owned().await
    }

    /// Allocate and persist a new report with empty prediction and xai.
    pub async fn create(
        &self,
        patient: PatientMetadata,
        image_filename: &str,
    ) -> Result<Report, XaiError> {
        let now = now_timestamp();
        let report = Report {
            report_id: uuid::Uuid::new_v4().to_string(),
            patient,
            image_filename: image_filename.to_string(),
            created_at: now.clone(),
            updated_at: now,
            prediction: Prediction::default(),
            xai: XaiArtifacts::default(),
        };

        self.store.create(&report).await.map_err(|e| match e {
            XaiError::Persistence(_) => e,
            other => XaiError::Persistence(other.to_string()),
        })?;

        info!(
            report_id = %report.report_id,
            patient_id = %report.patient.id,
            backend = self.store.backend_name(),
            "Report created"
        );
        Ok(report)
    }

    pub async fn get(&self, report_id: &str) -> Result<Option<Report>, XaiError> {
        self.store.get(report_id).await
    }

    /// Record the classifier result on an existing report.
    pub async fn attach_prediction(
        &self,
        report_id: &str,
        label: Diagnosis,
        confidence: f64,
    ) -> Result<(), XaiError> {
        let _guard = self.lock_record(report_id).await;

        let mut report = self
            .store
            .get(report_id)
            .await?
            .ok_or_else(|| XaiError::Persistence(format!("Report {} not found", report_id)))?;

        let now = now_timestamp();
        report.prediction = Prediction {
            label: Some(label),
            confidence: Some(confidence),
            predicted_at: Some(now.clone()),
        };
        report.updated_at = now;

        self.store.put(&report).await?;
        debug!(report_id, label = %label, confidence, "Prediction attached");
        Ok(())
    }

    /// Latest report for a patient by `updatedAt`/`createdAt`. On exact
    /// ties the first record in store order wins.
    pub async fn resolve_latest(&self, patient_id: &str) -> Result<Option<Report>, XaiError> {
        let reports = self.list(Some(patient_id)).await?;
        Ok(latest_of(reports))
    }

    /// Merge explanation artifacts into the patient's latest report.
    ///
    /// `xai` is replaced wholesale; `label` and `confidence` overwrite the
    /// stored prediction only when present. Returns the id of the updated
    /// report, or `None` when the patient has no reports.
    pub async fn attach_explanation(
        &self,
        patient_id: &str,
        gradcam: &str,
        lime: &str,
        occlusion: &str,
        label: Option<Diagnosis>,
        confidence: Option<f64>,
    ) -> Result<Option<String>, XaiError> {
        let Some(target) = self.resolve_latest(patient_id).await? else {
            info!(patient_id, "No report found for patient; explanation not persisted");
            return Ok(None);
        };

        let _guard = self.lock_record(&target.report_id).await;

        // Re-read under the lock so a concurrent prediction attach is kept.
        let mut report = self.store.get(&target.report_id).await?.unwrap_or(target);

        let now = now_timestamp();
        report.xai = XaiArtifacts {
            gradcam: Some(gradcam.to_string()),
            lime: Some(lime.to_string()),
            occlusion: Some(occlusion.to_string()),
            generated_at: Some(now.clone()),
        };
        if let Some(label) = label {
            report.prediction.label = Some(label);
        }
        if let Some(confidence) = confidence {
            report.prediction.confidence = Some(confidence);
        }
        if (label.is_some() || confidence.is_some()) && report.prediction.predicted_at.is_none() {
            report.prediction.predicted_at = Some(now.clone());
        }
        report.updated_at = now;

        self.store.put(&report).await?;
        info!(report_id = %report.report_id, patient_id, "Explanation merged into report");
        Ok(Some(report.report_id))
    }

    /// All readable reports, optionally restricted to one `patientId`
    /// (exact match). Order is store order.
    pub async fn list(&self, patient_id: Option<&str>) -> Result<Vec<Report>, XaiError> {
        let reports = self.store.list().await?;
        Ok(match patient_id {
            Some(id) => reports.into_iter().filter(|r| r.patient.id == id).collect(),
            None => reports,
        })
    }

    /// Fill empty `xai` slots from artifact files on disk. Display only,
    /// nothing is written back.
    pub async fn with_inferred_artifacts(&self, mut report: Report) -> Report {
        if report.xai.gradcam.is_none() || report.xai.lime.is_none() || report.xai.occlusion.is_none() {
            report.xai = self.layout.infer_artifacts(&report.patient.id, &report.xai).await;
        }
        report
    }
}

fn latest_of(reports: Vec<Report>) -> Option<Report> {
    let mut latest: Option<Report> = None;
    for report in reports {
        let newer = match &latest {
            Some(current) => report.sort_key() > current.sort_key(),
            None => true,
        };
        if newer {
            latest = Some(report);
        }
    }
    latest
}
