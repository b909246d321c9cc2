use serde::Serialize;
use crate::errors::XaiError;
use crate::models::{Diagnosis, Report};
use crate::storage::StaticLayout;
use super::service::ReportService;

/// A stored report plus the display fields the history UI reads directly.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    #[serde(flatten)]
    pub report: Report,
    pub diagnosis: Option<Diagnosis>,
    pub confidence: Option<f64>,
    pub gradcam: Option<String>,
    pub lime: Option<String>,
    pub occlusion: Option<String>,
    pub source_image_url: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct History {
    pub count: usize,
    pub reports: Vec<HistoryEntry>,
}

/// Most recent first by `updatedAt` → `createdAt` → `""`. Stable, so equal
/// keys keep their incoming order.
pub fn sort_latest_first(reports: &mut [Report]) {
    reports.sort_by(|a, b| b.sort_key().cmp(a.sort_key()));
}

impl ReportService {
    pub async fn history(&self, patient_id: Option<&str>) -> Result<History, XaiError> {
        let mut reports = self.list(patient_id).await?;
        sort_latest_first(&mut reports);

        let mut entries = Vec::with_capacity(reports.len());
        for report in reports {
            let report = self.with_inferred_artifacts(report).await;
            entries.push(self.to_entry(report));
        }

        Ok(History {
            count: entries.len(),
            reports: entries,
        })
    }

    fn to_entry(&self, report: Report) -> HistoryEntry {
        let layout = self.layout();
        let url = |reference: &Option<String>| reference.as_deref().map(|r| layout.public_url_for(r));

        HistoryEntry {
            diagnosis: report.prediction.label,
            confidence: report.prediction.confidence,
            gradcam: url(&report.xai.gradcam),
            lime: url(&report.xai.lime),
            occlusion: url(&report.xai.occlusion),
            source_image_url: (!report.image_filename.is_empty()).then(|| {
                layout.public_url_for(&StaticLayout::upload_ref(&report.image_filename))
            }),
            report,
        }
    }
}
