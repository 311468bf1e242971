use std::{path::PathBuf, sync::Arc};

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use pronunciation_application::{AnalyzePronunciationUseCase, HealthUseCase};
use pronunciation_configuration::ServerConfig;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;

pub mod error;
pub mod handlers;

pub use error::HttpError;
pub use handlers::*;

#[derive(Clone)]
pub struct AppState {
    pub analyze: Arc<dyn AnalyzePronunciationUseCase>,
    pub health: Arc<dyn HealthUseCase>,
    /// Parent of the per-request upload directories.
    pub upload_dir: PathBuf,
}

pub fn create_router(state: AppState, max_upload_bytes: usize) -> Router {
    let analyze_route = post(analyze_pronunciation).layer(DefaultBodyLimit::max(max_upload_bytes));

    Router::new()
        .route("/health", get(health_check))
        .route("/api/analyze_pronunciation", analyze_route)
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn serve(router: Router, config: &ServerConfig) -> anyhow::Result<()> {
    let address = format!("{}:{}", config.host, config.port);
    let listener = TcpListener::bind(&address)
        .await
        .map_err(|err| anyhow::anyhow!("failed to bind {address}: {err}"))?;
    serve_on(listener, router).await
}

pub async fn serve_on(listener: TcpListener, router: Router) -> anyhow::Result<()> {
    let local_addr = listener.local_addr()?;
    tracing::info!(address = %local_addr, "pronunciation HTTP server listening");
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|err| anyhow::anyhow!("server error: {err}"))
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
