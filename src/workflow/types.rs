/// Core workflow type definitions
///
/// Defines workflows, nodes, edges and execution records as they are stored by the
/// graph store and read by the execution engine. All types round-trip through JSON
/// for persistence and the HTTP layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// A named, enableable container for one node/edge graph
///
/// The engine only reads workflows; it refuses to run one whose `enabled` flag is off.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workflow {
    /// Unique workflow identifier
    pub id: String,
    /// Human-readable workflow name
    pub name: String,
    /// Disabled workflows are rejected before any traversal
    pub enabled: bool,
    pub created_at: DateTime<Utc>,
}

impl Workflow {
    /// Create a workflow with a fresh identifier
    pub fn new(name: impl Into<String>, enabled: bool) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            enabled,
            created_at: Utc::now(),
        }
    }
}

/// Node category which selects the handler used during traversal
///
/// Categories are stored as free text. Anything outside the four known values is
/// preserved in `Other` and only rejected when the walker tries to dispatch it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum NodeCategory {
    /// Entry point of the graph, exactly one per workflow
    Trigger,
    /// Fetches data from a registered source
    Data,
    /// Reshapes the accumulated execution context
    Transform,
    /// Dispatches an external effect through a registered sink
    Action,
    /// Unrecognised category, kept verbatim
    Other(String),
}

impl NodeCategory {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Trigger => "trigger",
            Self::Data => "data",
            Self::Transform => "transform",
            Self::Action => "action",
            Self::Other(raw) => raw,
        }
    }
}

impl From<&str> for NodeCategory {
    fn from(raw: &str) -> Self {
        match raw {
            "trigger" => Self::Trigger,
            "data" => Self::Data,
            "transform" => Self::Transform,
            "action" => Self::Action,
            other => Self::Other(other.to_string()),
        }
    }
}

impl From<String> for NodeCategory {
    fn from(raw: String) -> Self {
        Self::from(raw.as_str())
    }
}

impl From<NodeCategory> for String {
    fn from(category: NodeCategory) -> Self {
        category.as_str().to_string()
    }
}

impl fmt::Display for NodeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 2-D layout position, carried through unchanged
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

/// A single typed unit of work in a workflow graph
///
/// `config` is a JSON object whose shape depends on the category and its subtype key
/// (`type` or `source`). It is parsed into a typed config only at dispatch time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Unique node identifier
    pub id: String,
    /// Owning workflow
    pub workflow_id: String,
    pub category: NodeCategory,
    /// Display label
    pub label: String,
    /// Category-specific configuration as flexible JSON
    pub config: Value,
    pub position: Position,
}

impl Node {
    /// Create a node with a fresh identifier
    pub fn new(
        workflow_id: impl Into<String>,
        category: impl Into<NodeCategory>,
        label: impl Into<String>,
        config: Value,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            workflow_id: workflow_id.into(),
            category: category.into(),
            label: label.into(),
            config,
            position: Position::default(),
        }
    }

    pub fn is_trigger(&self) -> bool {
        self.category == NodeCategory::Trigger
    }
}

/// Directed connection between two nodes of the same workflow
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub id: String,
    pub workflow_id: String,
    /// Source node ID
    pub source_id: String,
    /// Target node ID
    pub target_id: String,
}

/// Reasons an edge is refused at creation time
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EdgeError {
    #[error("edge cannot connect node {0} to itself")]
    SelfLoop(String),
}

impl Edge {
    /// Create an edge with a fresh identifier, rejecting self-loops
    pub fn new(
        workflow_id: impl Into<String>,
        source_id: impl Into<String>,
        target_id: impl Into<String>,
    ) -> Result<Self, EdgeError> {
        let edge = Self {
            id: uuid::Uuid::new_v4().to_string(),
            workflow_id: workflow_id.into(),
            source_id: source_id.into(),
            target_id: target_id.into(),
        };
        edge.validate()?;
        Ok(edge)
    }

    /// Check creation-time invariants
    pub fn validate(&self) -> Result<(), EdgeError> {
        if self.source_id == self.target_id {
            return Err(EdgeError::SelfLoop(self.source_id.clone()));
        }
        Ok(())
    }
}

/// Terminal status of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionStatus {
    Completed,
    Failed,
}

impl ExecutionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "completed" => Some(Self::Completed),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}

/// Immutable record of one run, appended once through the graph store
///
/// `context` holds the serialized execution context and is only present for
/// completed runs; failed runs carry `error` instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionRecord {
    pub id: String,
    pub workflow_id: String,
    pub status: ExecutionStatus,
    pub error: Option<String>,
    pub context: Option<Value>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn category_round_trips_known_and_unknown_values() {
        assert_eq!(NodeCategory::from("data"), NodeCategory::Data);
        assert_eq!(
            NodeCategory::from("webhook"),
            NodeCategory::Other("webhook".to_string())
        );

        let encoded = serde_json::to_value(NodeCategory::Other("webhook".into())).unwrap();
        assert_eq!(encoded, json!("webhook"));
        let decoded: NodeCategory = serde_json::from_value(json!("trigger")).unwrap();
        assert_eq!(decoded, NodeCategory::Trigger);
    }

    #[test]
    fn edge_rejects_self_loop() {
        let err = Edge::new("wf", "n1", "n1").unwrap_err();
        assert_eq!(err, EdgeError::SelfLoop("n1".to_string()));
        assert!(err.to_string().contains("itself"));
    }

    #[test]
    fn node_serializes_category_as_plain_string() {
        let node = Node::new("wf", "transform", "Summary", json!({ "type": "summarize" }));
        let encoded = serde_json::to_value(&node).unwrap();
        assert_eq!(encoded["category"], json!("transform"));
        assert_eq!(encoded["position"], json!({ "x": 0.0, "y": 0.0 }));
    }

    #[test]
    fn execution_status_parses_stored_values() {
        assert_eq!(ExecutionStatus::parse("completed"), Some(ExecutionStatus::Completed));
        assert_eq!(ExecutionStatus::parse("failed"), Some(ExecutionStatus::Failed));
        assert_eq!(ExecutionStatus::parse("running"), None);
    }
}
