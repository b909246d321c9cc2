use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use tracing::error;
use crate::errors::XaiError;

impl IntoResponse for XaiError {
    fn into_response(self) -> axum::response::Response {
        let (status, body) = match &self {
            XaiError::Validation(message) => (StatusCode::BAD_REQUEST, json!({"error": message})),
            XaiError::Upstream { message, detail } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({"error": message, "detail": detail}),
            ),
            other => {
                error!(error = %other, "Request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({"error": "Internal server error", "detail": other.to_string()}),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}
