/// Nodeflow: workflow execution engine
///
/// Main entry point for the Nodeflow server. Initializes configuration and starts
/// the HTTP server with workflow management and execution capabilities.

use nodeflow::{config::Config, server::start_server};

/// Application entry point
///
/// The server provides:
/// - Workflow, node and edge management at /api/workflows/*
/// - Runs at /api/workflows/{id}/run and history at /api/executions/{id}
/// - Health check at /healthz
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration (defaults to 0.0.0.0:3004 and data/nodeflow.db)
    let config = Config::default();

    start_server(config).await?;

    Ok(())
}
