/// Run-scoped execution context and node result envelopes
///
/// The context is the only mutable state of a run: a map from node ID to the envelope
/// that node's handler produced. Handlers read it, only the walker writes it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Category-specific output of one node handler
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NodeOutput {
    Trigger {
        /// Informational `config.type`
        trigger_type: Option<String>,
        /// Raw node configuration
        config: Value,
    },
    Data {
        /// Requested `config.source`
        source: Option<String>,
        /// False when no fetcher is registered for the source
        configured: bool,
        data: Value,
    },
    Transform {
        /// Requested `config.type`
        operation: Option<String>,
        data: Value,
    },
    Action {
        /// Requested `config.type`
        action: Option<String>,
        /// False when no sink is registered for the action
        attempted: bool,
        target: Option<String>,
        detail: Value,
    },
}

/// Typed record stored in the execution context for every visited node
///
/// Serializes flat: `{ "type": "data", "source": ..., "timestamp": ... }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultEnvelope {
    #[serde(flatten)]
    pub output: NodeOutput,
    /// When the handler completed
    pub timestamp: DateTime<Utc>,
}

impl ResultEnvelope {
    /// Stamp a handler output with the current time
    pub fn now(output: NodeOutput) -> Self {
        Self {
            output,
            timestamp: Utc::now(),
        }
    }

    /// Category tag (`trigger`, `data`, `transform`, `action`)
    pub fn kind(&self) -> &'static str {
        match self.output {
            NodeOutput::Trigger { .. } => "trigger",
            NodeOutput::Data { .. } => "data",
            NodeOutput::Transform { .. } => "transform",
            NodeOutput::Action { .. } => "action",
        }
    }
}

/// Accumulated node results of one run, keyed by node ID
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExecutionContext {
    entries: BTreeMap<String, ResultEnvelope>,
}

impl ExecutionContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a node's envelope, replacing the entry of a previous visit
    pub fn insert(&mut self, node_id: impl Into<String>, envelope: ResultEnvelope) {
        self.entries.insert(node_id.into(), envelope);
    }

    pub fn get(&self, node_id: &str) -> Option<&ResultEnvelope> {
        self.entries.get(node_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn node_ids(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Snapshot as a JSON object keyed by node ID
    pub fn to_json(&self) -> serde_json::Result<Value> {
        serde_json::to_value(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn envelope_serializes_flat_with_type_tag() {
        let envelope = ResultEnvelope::now(NodeOutput::Data {
            source: Some("weather".to_string()),
            configured: true,
            data: json!({ "temperature": 72 }),
        });

        let encoded = serde_json::to_value(&envelope).unwrap();
        assert_eq!(encoded["type"], json!("data"));
        assert_eq!(encoded["source"], json!("weather"));
        assert_eq!(encoded["data"]["temperature"], json!(72));
        assert!(encoded["timestamp"].is_string());

        let decoded: ResultEnvelope = serde_json::from_value(encoded).unwrap();
        assert_eq!(decoded, envelope);
    }

    #[test]
    fn later_insert_overwrites_entry() {
        let mut context = ExecutionContext::new();
        let first = ResultEnvelope::now(NodeOutput::Transform {
            operation: Some("filter".into()),
            data: json!(1),
        });
        let second = ResultEnvelope::now(NodeOutput::Transform {
            operation: Some("filter".into()),
            data: json!(2),
        });

        context.insert("c", first);
        context.insert("c", second.clone());

        assert_eq!(context.len(), 1);
        assert_eq!(context.get("c"), Some(&second));
    }

    #[test]
    fn context_serializes_as_object_keyed_by_node() {
        let mut context = ExecutionContext::new();
        context.insert(
            "t1",
            ResultEnvelope::now(NodeOutput::Trigger {
                trigger_type: Some("manual".into()),
                config: json!({ "type": "manual" }),
            }),
        );

        let snapshot = context.to_json().unwrap();
        assert_eq!(snapshot["t1"]["type"], json!("trigger"));
        assert_eq!(snapshot["t1"]["trigger_type"], json!("manual"));
    }
}
