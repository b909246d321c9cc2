use axum::{extract::{Multipart, State}, Json};
use crate::api::form::UploadForm;
use crate::api::models::ExplainResponse;
use crate::api::AppState;
use crate::errors::XaiError;
use crate::pipeline::{ExplainRequest, MISSING_PATIENT_ID};
use crate::storage::ArtifactKind;

pub async fn explain(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<ExplainResponse>, XaiError> {
    let mut form = UploadForm::read(multipart).await?;
    let image = form.take_file()?;
    if form.patient.id.is_empty() {
        return Err(XaiError::validation(MISSING_PATIENT_ID));
    }

    let outcome = state
        .orchestrator
        .explain(ExplainRequest { image, patient_id: form.patient.id })
        .await?;

    let layout = state.orchestrator.reports().layout();
    let url = |kind| layout.public_url_for(&outcome.artifact_ref(kind));

    Ok(Json(ExplainResponse {
        label: outcome.result.map(|r| r.label),
        confidence: outcome.result.map(|r| r.confidence),
        gradcam: url(ArtifactKind::GradCam),
        lime: url(ArtifactKind::Lime),
        occlusion: url(ArtifactKind::Occlusion),
        report_id: outcome.report_id.clone(),
    }))
}
