//! Errors that fail a workflow run.
//!
//! Every variant is fatal: the engine converts it into a failed run outcome and
//! a failed execution record carrying the error's message.

/// Reasons a run fails.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("workflow not found: {0}")]
    WorkflowNotFound(String),

    #[error("workflow is disabled: {0}")]
    WorkflowDisabled(String),

    #[error("workflow has no nodes")]
    NoNodes,

    #[error("workflow has no trigger node")]
    NoTrigger,

    #[error("workflow has multiple trigger nodes: {}", .0.join(", "))]
    MultipleTriggers(Vec<String>),

    /// A node's category matches no registered handler.
    #[error("unknown node category '{category}' on node {node_id}")]
    UnknownCategory { node_id: String, category: String },

    /// The node's configuration could not be read as its category's config.
    #[error("invalid configuration on node {node_id}: {message}")]
    InvalidConfig { node_id: String, message: String },

    /// A fetcher or sink failed.
    #[error("node {node_id} failed: {message}")]
    Handler { node_id: String, message: String },

    /// A successor is already on the current traversal path.
    #[error("cycle detected at node {node_id}")]
    CycleDetected { node_id: String },

    #[error("failed to snapshot execution context: {0}")]
    Snapshot(#[from] serde_json::Error),

    /// Loading the graph from the store failed.
    #[error("graph store error: {0}")]
    Store(#[from] anyhow::Error),
}
