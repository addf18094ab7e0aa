/// Typed node configuration per category
///
/// Node configs are stored as free-form JSON. At dispatch time each node is parsed
/// into one of these structs: every field is optional, unknown keys are ignored and
/// a missing or `null` config reads as `{}`.

use crate::runtime::error::EngineError;
use crate::workflow::types::{Node, NodeCategory};
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::Value;

/// Trigger node config; `type` is informational only
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TriggerConfig {
    #[serde(rename = "type", default)]
    pub trigger_type: Option<String>,
}

/// Data node config
///
/// `source` selects the registered fetcher (`weather`, `calendar`, `github`).
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct DataConfig {
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub calendar_id: Option<String>,
    #[serde(default)]
    pub repository: Option<String>,
}

/// Transform node config; `type` is `summarize`, `filter` or `combine`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TransformConfig {
    #[serde(rename = "type", default)]
    pub operation: Option<String>,
}

/// Action node config
///
/// `type` selects the registered sink (`email`, `sms`, `social`).
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ActionConfig {
    #[serde(rename = "type", default)]
    pub action: Option<String>,
    /// Recipient address or phone number
    #[serde(default)]
    pub to: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    /// Social platform name
    #[serde(default)]
    pub platform: Option<String>,
}

/// A node's category together with its parsed configuration
#[derive(Debug, Clone, PartialEq)]
pub enum NodeSpec {
    Trigger(TriggerConfig),
    Data(DataConfig),
    Transform(TransformConfig),
    Action(ActionConfig),
}

impl NodeSpec {
    /// Parse a stored node; unknown categories and malformed configs fail the run
    pub fn parse(node: &Node) -> Result<Self, EngineError> {
        match &node.category {
            NodeCategory::Trigger => parse_config(node).map(Self::Trigger),
            NodeCategory::Data => parse_config(node).map(Self::Data),
            NodeCategory::Transform => parse_config(node).map(Self::Transform),
            NodeCategory::Action => parse_config(node).map(Self::Action),
            NodeCategory::Other(category) => Err(EngineError::UnknownCategory {
                node_id: node.id.clone(),
                category: category.clone(),
            }),
        }
    }
}

fn parse_config<T: DeserializeOwned + Default>(node: &Node) -> Result<T, EngineError> {
    match &node.config {
        Value::Null => Ok(T::default()),
        Value::Object(_) => T::deserialize(&node.config).map_err(|e| EngineError::InvalidConfig {
            node_id: node.id.clone(),
            message: e.to_string(),
        }),
        other => Err(EngineError::InvalidConfig {
            node_id: node.id.clone(),
            message: format!("expected a JSON object, found {}", json_kind(other)),
        }),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
