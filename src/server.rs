/// Server setup and initialization
///
/// Wires together all components: graph store, node executor, execution engine and
/// HTTP routes. Provides the main application factory function for creating the Axum app.

use crate::{
    api::workflows::{create_workflow_routes, AppState},
    config::Config,
    runtime::{engine::ExecutionEngine, executor::NodeExecutor},
    workflow::storage::SqliteGraphStore,
};
use anyhow::Result;
use axum::{routing::get, Router};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

/// Create the main Axum application backed by the configured SQLite database
pub async fn create_app(config: Config) -> Result<Router> {
    tracing::info!("📁 Opening graph store at {}", config.database.path);
    let store = SqliteGraphStore::open(&config.database.path)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to open graph store: {}", e))?;

    Ok(router(store))
}

/// Build the router over an already opened store
///
/// The engine reads through the same store the management routes write to.
pub fn router(store: SqliteGraphStore) -> Router {
    tracing::info!("⚙️ Initializing node executor with stub integrations");
    let executor = Arc::new(NodeExecutor::with_stub_integrations());

    tracing::info!("🚀 Initializing execution engine");
    let engine = Arc::new(ExecutionEngine::new(Arc::new(store.clone()), executor));

    let app_state = AppState { store, engine };

    tracing::info!("📡 Creating HTTP router with all endpoints");
    Router::new()
        .route("/healthz", get(health_check))
        .merge(create_workflow_routes().with_state(app_state))
}

/// Start the HTTP server with the given configuration
///
/// Installs the tracing subscriber, creates the application and serves it on the
/// configured address and port.
pub async fn start_server(config: Config) -> Result<()> {
    let filter = EnvFilter::try_new(&config.logging.filter)
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(true)
        .with_level(true)
        .init();

    tracing::info!("Starting Nodeflow server...");

    let app = create_app(config.clone()).await?;

    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&bind_addr).await?;

    tracing::info!("Server listening on http://{}", bind_addr);

    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}

/// Health check endpoint handler
async fn health_check() -> &'static str {
    "ok"
}
