pub mod errors;
pub mod form;
pub mod models;
pub mod routes;

use std::sync::Arc;
use std::time::Duration;
use axum::extract::DefaultBodyLimit;
use axum::http::HeaderValue;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::warn;
use crate::config::Settings;
use crate::errors::{RetryConfig, XaiError};
use crate::inference::{RemoteClassifier, RemoteExplainer};
use crate::pipeline::Orchestrator;
use crate::reports::ReportService;
use crate::storage::layout::STATIC_ROUTE;
use crate::storage::{FsReportStore, StaticLayout, UploadStore};

/// Chest X-rays can be large; axum's 2 MiB default is too small.
pub const MAX_UPLOAD_BYTES: usize = 32 * 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Orchestrator,
    pub cors_origins: Arc<Vec<String>>,
}

impl AppState {
    pub fn new(orchestrator: Orchestrator, cors_origins: Vec<String>) -> Self {
        Self { orchestrator, cors_origins: Arc::new(cors_origins) }
    }
}

/// Wire the filesystem stores and the remote inference clients from
/// resolved settings.
pub async fn create_app_state(settings: &Settings) -> Result<AppState, XaiError> {
    let layout = StaticLayout::new(&settings.static_dir, &settings.public_url);
    let store = Arc::new(FsReportStore::new(&settings.reports_dir)?);
    let uploads = UploadStore::new(layout.uploads_dir())?;
    tokio::fs::create_dir_all(layout.explanations_dir()).await?;

    let timeout = Duration::from_secs(settings.timeout_secs);
    let retry = RetryConfig { max_retries: settings.max_retries, ..RetryConfig::default() };
    let classifier = RemoteClassifier::new(&settings.classifier_url, timeout, retry.clone())?;
    let explainer = RemoteExplainer::new(&settings.explainer_url, timeout, retry)?;

    let orchestrator = Orchestrator::new(
        ReportService::new(store, layout),
        uploads,
        Arc::new(classifier),
        Arc::new(explainer),
    );
    Ok(AppState::new(orchestrator, settings.cors_origins.clone()))
}

pub fn build_router(state: AppState) -> Router {
    let static_root = state.orchestrator.reports().layout().root().to_path_buf();
    let cors = cors_layer(&state.cors_origins);

    Router::new()
        .route("/predict", post(routes::predict::predict))
        .route("/explain", post(routes::explain::explain))
        .route("/patients/history", get(routes::history::patient_history))
        .route("/health", get(routes::health::health_check))
        .nest_service(STATIC_ROUTE, ServeDir::new(static_root))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.iter().any(|o| o == "*") {
        return layer.allow_origin(Any);
    }

    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(parsed))
}
