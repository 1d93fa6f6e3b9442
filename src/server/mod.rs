//! Web frontend for the search pipeline.
//!
//! Thin JSON layer: it receives a query string, hands it to the search
//! service, and serializes whatever comes back. Presentation lives in
//! whatever consumes the API; the default picture asset is served from the
//! static directory.

mod handlers;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;

use crate::config::Settings;
use crate::search::SearchService;

/// Shared state for the web server.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<SearchService>,
}

/// Build the application router.
pub fn create_router(state: AppState, static_dir: std::path::PathBuf) -> Router {
    Router::new()
        .route("/api/search", get(handlers::search))
        .route("/healthz", get(handlers::healthz))
        .nest_service("/static", ServeDir::new(static_dir))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Start the web server.
pub async fn serve(settings: &Settings, host: &str, port: u16) -> anyhow::Result<()> {
    let service = Arc::new(settings.build_service()?);
    let app = create_router(AppState { service }, settings.static_dir.clone());

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    tracing::info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
