use axum::{extract::{Query, State}, Json};
use crate::api::models::HistoryQuery;
use crate::api::AppState;
use crate::errors::XaiError;
use crate::reports::History;

pub async fn patient_history(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<History>, XaiError> {
    let history = state.orchestrator.reports().history(query.patient_filter()).await?;
    Ok(Json(history))
}
