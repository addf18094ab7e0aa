/// Workflow management REST API endpoints
///
/// Provides creation and inspection of workflow graphs, the run endpoint and
/// read access to execution history. Management goes straight to the SQLite store;
/// runs go through the execution engine.

use crate::{
    runtime::{ExecutionEngine, RunOutcome},
    workflow::{
        storage::{GraphStore, SqliteGraphStore},
        types::{Edge, EdgeError, ExecutionRecord, Node, Position, Workflow},
    },
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;

/// Application state containing shared resources
#[derive(Clone)]
pub struct AppState {
    /// Graph store for management operations and history
    pub store: SqliteGraphStore,
    /// Engine shared by all run requests
    pub engine: Arc<ExecutionEngine>,
}

/// Request body for workflow creation
#[derive(Debug, Deserialize)]
pub struct CreateWorkflowRequest {
    pub name: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

/// Request body for toggling a workflow
#[derive(Debug, Deserialize)]
pub struct UpdateWorkflowRequest {
    pub enabled: bool,
}

/// Request body for node creation
#[derive(Debug, Deserialize)]
pub struct CreateNodeRequest {
    pub category: String,
    pub label: String,
    #[serde(default)]
    pub config: Value,
    #[serde(default)]
    pub position: Position,
}

/// Request body for edge creation
#[derive(Debug, Deserialize)]
pub struct CreateEdgeRequest {
    pub source_id: String,
    pub target_id: String,
}

/// A workflow together with its graph
#[derive(Debug, Serialize)]
pub struct WorkflowDetail {
    pub workflow: Workflow,
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

/// Create workflow management routes
///
/// Sets up the REST API endpoints for workflows, their graphs and their runs.
pub fn create_workflow_routes() -> Router<AppState> {
    Router::new()
        .route("/api/workflows", post(create_workflow).get(list_workflows))
        .route("/api/workflows/{id}", get(get_workflow).patch(update_workflow))
        .route("/api/workflows/{id}/nodes", post(create_node))
        .route("/api/workflows/{id}/edges", post(create_edge))
        .route("/api/workflows/{id}/run", post(run_workflow))
        .route("/api/workflows/{id}/executions", get(list_executions))
        .route("/api/executions/{id}", get(get_execution))
}

/// Create a new workflow
///
/// POST /api/workflows
/// Body: { "name": "...", "enabled": true }
async fn create_workflow(
    State(state): State<AppState>,
    Json(payload): Json<CreateWorkflowRequest>,
) -> Result<(StatusCode, Json<Workflow>), StatusCode> {
    if payload.name.trim().is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }

    let workflow = Workflow::new(payload.name, payload.enabled);
    if let Err(e) = state.store.create_workflow(&workflow).await {
        tracing::error!("Failed to save workflow: {}", e);
        return Err(StatusCode::INTERNAL_SERVER_ERROR);
    }

    tracing::info!("🔥 Created workflow: {} ({})", workflow.id, workflow.name);
    Ok((StatusCode::CREATED, Json(workflow)))
}

/// List all workflows
///
/// GET /api/workflows
/// Returns: { "workflows": [...] }
async fn list_workflows(State(state): State<AppState>) -> Result<Json<Value>, StatusCode> {
    match state.store.list_workflows().await {
        Ok(workflows) => Ok(Json(json!({ "workflows": workflows }))),
        Err(e) => {
            tracing::error!("Failed to list workflows: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Get a workflow with its nodes and edges
///
/// GET /api/workflows/{id}
async fn get_workflow(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<WorkflowDetail>, StatusCode> {
    let workflow = require_workflow(&state, &id).await?;

    let graph = async {
        let nodes = state.store.load_nodes(&id).await?;
        let edges = state.store.load_edges(&id).await?;
        anyhow::Ok((nodes, edges))
    };
    match graph.await {
        Ok((nodes, edges)) => Ok(Json(WorkflowDetail {
            workflow,
            nodes,
            edges,
        })),
        Err(e) => {
            tracing::error!("Failed to load graph of workflow {}: {}", id, e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Enable or disable a workflow
///
/// PATCH /api/workflows/{id}
/// Body: { "enabled": false }
async fn update_workflow(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateWorkflowRequest>,
) -> Result<Json<Workflow>, StatusCode> {
    match state.store.set_workflow_enabled(&id, payload.enabled).await {
        Ok(true) => {}
        Ok(false) => return Err(StatusCode::NOT_FOUND),
        Err(e) => {
            tracing::error!("Failed to update workflow {}: {}", id, e);
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    }

    tracing::info!("🔄 Workflow {} enabled={}", id, payload.enabled);
    require_workflow(&state, &id).await.map(Json)
}

/// Add a node to a workflow
///
/// POST /api/workflows/{id}/nodes
/// Body: { "category": "data", "label": "...", "config": { "source": "weather" } }
///
/// Any category string is accepted; unknown ones only fail when a run reaches them.
async fn create_node(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<CreateNodeRequest>,
) -> Result<(StatusCode, Json<Node>), StatusCode> {
    require_workflow(&state, &id).await?;

    let mut node = Node::new(id, payload.category, payload.label, payload.config);
    node.position = payload.position;

    if let Err(e) = state.store.create_node(&node).await {
        tracing::error!("Failed to save node: {}", e);
        return Err(StatusCode::INTERNAL_SERVER_ERROR);
    }

    tracing::debug!("➕ Added {} node {} to workflow {}", node.category, node.id, node.workflow_id);
    Ok((StatusCode::CREATED, Json(node)))
}

/// Connect two nodes of a workflow
///
/// POST /api/workflows/{id}/edges
/// Body: { "source_id": "...", "target_id": "..." }
///
/// Self-loops are refused with 400. Targets are not checked for existence.
async fn create_edge(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<CreateEdgeRequest>,
) -> Result<(StatusCode, Json<Edge>), StatusCode> {
    require_workflow(&state, &id).await?;

    let edge = match Edge::new(id, payload.source_id, payload.target_id) {
        Ok(edge) => edge,
        Err(e) => {
            tracing::warn!("Rejected edge: {}", e);
            return Err(StatusCode::BAD_REQUEST);
        }
    };

    if let Err(e) = state.store.create_edge(&edge).await {
        if e.downcast_ref::<EdgeError>().is_some() {
            return Err(StatusCode::BAD_REQUEST);
        }
        tracing::error!("Failed to save edge: {}", e);
        return Err(StatusCode::INTERNAL_SERVER_ERROR);
    }

    tracing::debug!("🔗 Added edge {} → {}", edge.source_id, edge.target_id);
    Ok((StatusCode::CREATED, Json(edge)))
}

/// Run a workflow from its trigger node
///
/// POST /api/workflows/{id}/run
/// Returns the run outcome: 200 when it completed, 422 when it failed.
async fn run_workflow(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> (StatusCode, Json<RunOutcome>) {
    let outcome = state.engine.run(&id).await;
    let status = if outcome.success {
        StatusCode::OK
    } else {
        StatusCode::UNPROCESSABLE_ENTITY
    };
    (status, Json(outcome))
}

/// Execution history of a workflow, newest first
///
/// GET /api/workflows/{id}/executions
/// Returns: { "executions": [...] }
async fn list_executions(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, StatusCode> {
    match state.store.list_executions(&id).await {
        Ok(executions) => Ok(Json(json!({ "executions": executions }))),
        Err(e) => {
            tracing::error!("Failed to list executions of workflow {}: {}", id, e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Get one execution record
///
/// GET /api/executions/{id}
async fn get_execution(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ExecutionRecord>, StatusCode> {
    match state.store.get_execution(&id).await {
        Ok(Some(record)) => Ok(Json(record)),
        Ok(None) => Err(StatusCode::NOT_FOUND),
        Err(e) => {
            tracing::error!("Failed to get execution {}: {}", id, e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Load a workflow or answer 404
async fn require_workflow(state: &AppState, id: &str) -> Result<Workflow, StatusCode> {
    match state.store.load_workflow(id).await {
        Ok(Some(workflow)) => Ok(workflow),
        Ok(None) => Err(StatusCode::NOT_FOUND),
        Err(e) => {
            tracing::error!("Failed to get workflow {}: {}", id, e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}
