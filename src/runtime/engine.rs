/// Workflow execution engine
///
/// Loads a workflow graph from the store, validates it is runnable, walks it from the
/// trigger node and appends exactly one execution record per run.

use crate::runtime::context::ExecutionContext;
use crate::runtime::error::EngineError;
use crate::runtime::executor::NodeExecutor;
use crate::runtime::graph::build_adjacency;
use crate::runtime::walker::GraphWalker;
use crate::workflow::storage::GraphStore;
use crate::workflow::types::{ExecutionRecord, ExecutionStatus, Node};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

/// Caller-visible result of one run
///
/// Exactly one of `context` and `error` is set, depending on `success`.
#[derive(Debug, Clone, Serialize)]
pub struct RunOutcome {
    pub success: bool,
    /// Assigned before any work, so failed runs have one too
    pub execution_id: String,
    pub workflow_id: String,
    pub context: Option<ExecutionContext>,
    pub error: Option<String>,
    /// Node IDs in visit order; empty for failed runs
    pub visited: Vec<String>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

/// Successful traversal of one workflow
struct Completed {
    context: ExecutionContext,
    snapshot: Value,
    visited: Vec<String>,
}

/// Top-level orchestrator for workflow runs
///
/// Holds only shared, immutable collaborators; every run owns its own context,
/// so concurrent runs need no locking.
#[derive(Clone)]
pub struct ExecutionEngine {
    store: Arc<dyn GraphStore>,
    executor: Arc<NodeExecutor>,
}

impl std::fmt::Debug for ExecutionEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecutionEngine")
            .field("executor", &self.executor)
            .finish_non_exhaustive()
    }
}

impl ExecutionEngine {
    /// Create new execution engine over a graph store and node executor
    pub fn new(store: Arc<dyn GraphStore>, executor: Arc<NodeExecutor>) -> Self {
        Self { store, executor }
    }

    /// Run a workflow from its trigger node
    ///
    /// Never returns an error: every failure becomes a failed outcome and a failed
    /// execution record. Failing to append the record is logged and otherwise ignored.
    pub async fn run(&self, workflow_id: &str) -> RunOutcome {
        let execution_id = uuid::Uuid::new_v4().to_string();
        let started_at = Utc::now();
        let workflow_start_time = std::time::Instant::now();

        tracing::info!("🚀 Starting run {} of workflow {}", execution_id, workflow_id);

        let result = self.execute(workflow_id).await;
        let finished_at = Utc::now();
        let duration = workflow_start_time.elapsed();

        let (record, outcome) = match result {
            Ok(completed) => {
                tracing::info!(
                    "🎉 Run {} completed in {:?} ({} node visits)",
                    execution_id,
                    duration,
                    completed.visited.len()
                );
                tracing::debug!("📋 Visit order: {:?}", completed.visited);

                let record = ExecutionRecord {
                    id: execution_id.clone(),
                    workflow_id: workflow_id.to_string(),
                    status: ExecutionStatus::Completed,
                    error: None,
                    context: Some(completed.snapshot),
                    started_at,
                    finished_at,
                };
                let outcome = RunOutcome {
                    success: true,
                    execution_id,
                    workflow_id: workflow_id.to_string(),
                    context: Some(completed.context),
                    error: None,
                    visited: completed.visited,
                    started_at,
                    finished_at,
                };
                (record, outcome)
            }
            Err(e) => {
                let message = e.to_string();
                tracing::error!("❌ Run {} failed in {:?}: {}", execution_id, duration, message);

                let record = ExecutionRecord {
                    id: execution_id.clone(),
                    workflow_id: workflow_id.to_string(),
                    status: ExecutionStatus::Failed,
                    error: Some(message.clone()),
                    context: None,
                    started_at,
                    finished_at,
                };
                let outcome = RunOutcome {
                    success: false,
                    execution_id,
                    workflow_id: workflow_id.to_string(),
                    context: None,
                    error: Some(message),
                    visited: Vec::new(),
                    started_at,
                    finished_at,
                };
                (record, outcome)
            }
        };

        if let Err(e) = self.store.append_execution_record(&record).await {
            tracing::error!("💾 Failed to persist execution record {}: {}", record.id, e);
        }

        outcome
    }

    /// Validate, load and walk; any error fails the whole run
    async fn execute(&self, workflow_id: &str) -> Result<Completed, EngineError> {
        let workflow = self
            .store
            .load_workflow(workflow_id)
            .await?
            .ok_or_else(|| EngineError::WorkflowNotFound(workflow_id.to_string()))?;

        if !workflow.enabled {
            return Err(EngineError::WorkflowDisabled(workflow.id));
        }

        let nodes = self.store.load_nodes(workflow_id).await?;
        if nodes.is_empty() {
            return Err(EngineError::NoNodes);
        }

        let trigger = find_trigger(&nodes)?;
        let edges = self.store.load_edges(workflow_id).await?;
        tracing::debug!(
            "📊 Workflow '{}' has {} nodes and {} edges, trigger: {}",
            workflow.name,
            nodes.len(),
            edges.len(),
            trigger.id
        );

        let adjacency = build_adjacency(&nodes, &edges);
        let walker = GraphWalker::new(&self.executor, &nodes, &adjacency);

        let mut context = ExecutionContext::new();
        let visited = walker.walk(trigger, &mut context).await?;
        let snapshot = context.to_json()?;

        Ok(Completed {
            context,
            snapshot,
            visited,
        })
    }
}

/// The single trigger node of a workflow
fn find_trigger(nodes: &[Node]) -> Result<&Node, EngineError> {
    let triggers: Vec<&Node> = nodes.iter().filter(|node| node.is_trigger()).collect();
    match triggers.as_slice() {
        [] => Err(EngineError::NoTrigger),
        [trigger] => Ok(*trigger),
        many => Err(EngineError::MultipleTriggers(
            many.iter().map(|node| node.id.clone()).collect(),
        )),
    }
}
