use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use villo_server::cache::{CacheConfig, StationProvider};
use villo_server::opendata::{
    FetchOrchestrator, OrchestratorConfig, SourceClient, SourceClientConfig,
};
use villo_server::web::{AppState, create_router};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let client =
        SourceClient::new(SourceClientConfig::default()).expect("failed to build HTTP client");
    let orchestrator = Arc::new(FetchOrchestrator::new(client, OrchestratorConfig::from_env()));

    let provider = StationProvider::new(Arc::clone(&orchestrator), &CacheConfig::default());

    let state = AppState::new(orchestrator, provider);
    let app = create_router(state);

    let addr: SocketAddr = std::env::var("VILLO_BIND_ADDR")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| SocketAddr::from(([127, 0, 0, 1], 3000)));

    tracing::info!(%addr, "Villo availability server listening");
    tracing::info!("  GET  /api?action=getStations  - raw upstream payload (proxy)");
    tracing::info!("  GET  /api?action=health       - health check");
    tracing::info!("  GET  /stations?locale=nl|fr   - normalized station list");
    tracing::info!("  POST /favorites/:id           - toggle favorite");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("failed to bind listener");
    axum::serve(listener, app).await.expect("server error");
}
