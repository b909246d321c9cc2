use axum::{extract::{Multipart, State}, Json};
use crate::api::form::UploadForm;
use crate::api::models::PredictResponse;
use crate::api::AppState;
use crate::errors::XaiError;
use crate::pipeline::PredictRequest;

pub async fn predict(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<PredictResponse>, XaiError> {
    let mut form = UploadForm::read(multipart).await?;
    let image = form.take_file()?;

    let outcome = state
        .orchestrator
        .predict(PredictRequest { image, patient: form.patient })
        .await?;

    Ok(Json(PredictResponse {
        label: outcome.result.label,
        confidence: outcome.result.confidence,
        patient_info: outcome.patient.into(),
        report_id: outcome.report_id,
    }))
}
