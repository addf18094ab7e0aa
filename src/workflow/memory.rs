/// In-memory graph store
///
/// Keeps workflows, nodes, edges and execution records in process memory behind
/// tokio `RwLock`s. Used by tests and embedders that do not need durability.

use crate::workflow::{
    storage::GraphStore,
    types::{Edge, ExecutionRecord, Node, Workflow},
};
use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;

#[derive(Debug, Default)]
pub struct MemoryGraphStore {
    workflows: RwLock<HashMap<String, Workflow>>,
    nodes: RwLock<Vec<Node>>,
    edges: RwLock<Vec<Edge>>,
    executions: RwLock<Vec<ExecutionRecord>>,
    /// When set, `append_execution_record` fails
    fail_appends: AtomicBool,
}

impl MemoryGraphStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_workflow(&self, workflow: Workflow) {
        self.workflows
            .write()
            .await
            .insert(workflow.id.clone(), workflow);
    }

    pub async fn insert_node(&self, node: Node) {
        self.nodes.write().await.push(node);
    }

    /// Store an edge; self-loops are rejected like in the SQLite store
    pub async fn insert_edge(&self, edge: Edge) -> Result<()> {
        edge.validate()?;
        self.edges.write().await.push(edge);
        Ok(())
    }

    /// Make every subsequent record append fail (simulates a broken database)
    pub fn fail_appends(&self, fail: bool) {
        self.fail_appends.store(fail, Ordering::SeqCst);
    }

    /// Records appended so far, oldest first
    pub async fn executions(&self) -> Vec<ExecutionRecord> {
        self.executions.read().await.clone()
    }
}

#[async_trait]
impl GraphStore for MemoryGraphStore {
    async fn load_workflow(&self, workflow_id: &str) -> Result<Option<Workflow>> {
        Ok(self.workflows.read().await.get(workflow_id).cloned())
    }

    async fn load_nodes(&self, workflow_id: &str) -> Result<Vec<Node>> {
        Ok(self
            .nodes
            .read()
            .await
            .iter()
            .filter(|node| node.workflow_id == workflow_id)
            .cloned()
            .collect())
    }

    async fn load_edges(&self, workflow_id: &str) -> Result<Vec<Edge>> {
        Ok(self
            .edges
            .read()
            .await
            .iter()
            .filter(|edge| edge.workflow_id == workflow_id)
            .cloned()
            .collect())
    }

    async fn append_execution_record(&self, record: &ExecutionRecord) -> Result<()> {
        if self.fail_appends.load(Ordering::SeqCst) {
            return Err(anyhow::anyhow!("execution store unavailable"));
        }
        self.executions.write().await.push(record.clone());
        Ok(())
    }
}
