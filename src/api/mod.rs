/// HTTP API Layer
///
/// This module provides the REST API endpoints for workflow management
/// and execution. It handles:
/// - Workflow creation, listing and enabling
/// - Node and edge creation
/// - Triggering runs and reading execution history

// Workflow, node, edge and execution endpoints
pub mod workflows;

// Re-export router builder
pub use workflows::{create_workflow_routes, AppState};
