use crate::cli::commands::ServeArgs;
use crate::errors::XaiError;
use crate::api;
use tracing::info;

pub async fn handle_serve(args: ServeArgs) -> Result<(), XaiError> {
    let settings = args.resolve().await?;
    info!(
        host = %settings.host,
        port = settings.port,
        static_dir = %settings.static_dir.display(),
        reports_dir = %settings.reports_dir.display(),
        classifier = %settings.classifier_url,
        explainer = %settings.explainer_url,
        "Starting API server"
    );

    let state = api::create_app_state(&settings).await?;
    let app = api::build_router(state);

    let addr = format!("{}:{}", settings.host, settings.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| XaiError::Internal(format!("Server error: {}", e)))?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutdown signal received");
    }
}
