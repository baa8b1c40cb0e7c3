//! Axum web server for the introspection API.

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use super::routes;
use crate::config::Settings;
use crate::metadata::SessionMetadataProvider;
use crate::session::SessionOpener;

/// Application state shared across handlers.
pub struct AppState {
    /// Opens one catalog session per provider call.
    pub opener: Arc<dyn SessionOpener>,
    /// Loaded settings.
    pub settings: Settings,
}

impl AppState {
    pub fn new(opener: Arc<dyn SessionOpener>, settings: Settings) -> Self {
        Self { opener, settings }
    }

    /// A provider bound to `db_url`.
    pub fn provider(&self, db_url: &str) -> SessionMetadataProvider {
        SessionMetadataProvider::new(self.opener.clone(), db_url)
    }
}

/// Build the axum router with all routes.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/v1/health", get(routes::health))
        .route("/api/v1/db/test-connection", post(routes::test_connection))
        .route("/api/v1/db/get-schemas", get(routes::get_schemas))
        .route("/api/v1/db/get-tables", get(routes::get_tables))
        .route("/api/v1/db/get-diagram-data", get(routes::get_diagram_data))
        .fallback(routes::not_found)
        .layer(cors)
        .with_state(state)
}

/// Start the web server and run until Ctrl+C.
pub async fn serve(state: Arc<AppState>) -> Result<(), Box<dyn std::error::Error>> {
    let addr = state.settings.server.bind_addr();
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(%addr, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        // No signal handler available; run until the process is killed.
        std::future::pending::<()>().await;
    }
}
