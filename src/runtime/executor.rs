/// Node execution handlers for the four node categories
///
/// This module contains the dispatch from a node to its category handler:
/// - trigger: echoes its configuration, no effect
/// - data: fetches through the DataFetcher registered for `config.source`
/// - transform: reshapes the whole current execution context
/// - action: dispatches through the ActionSink registered for `config.type`
///
/// Handlers only read the execution context; the graph walker writes results into it.

use crate::runtime::context::{ExecutionContext, NodeOutput, ResultEnvelope};
use crate::runtime::error::EngineError;
use crate::runtime::integrations::{
    ActionSink, DataFetcher, StubCalendar, StubEmail, StubGithub, StubSms, StubSocial, StubWeather,
};
use crate::runtime::nodes::{ActionConfig, DataConfig, NodeSpec, TransformConfig, TriggerConfig};
use crate::workflow::types::Node;
use serde_json::json;
use std::{collections::HashMap, fmt, sync::Arc};

/// Node executor that dispatches nodes to their category handler
///
/// Data sources and action sinks are looked up by name, so integrations can be
/// swapped or added without touching the traversal.
#[derive(Default)]
pub struct NodeExecutor {
    /// `config.source` -> fetcher
    fetchers: HashMap<String, Arc<dyn DataFetcher>>,
    /// `config.type` -> sink
    sinks: HashMap<String, Arc<dyn ActionSink>>,
}

impl fmt::Debug for NodeExecutor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut fetchers: Vec<&str> = self.fetchers.keys().map(String::as_str).collect();
        let mut sinks: Vec<&str> = self.sinks.keys().map(String::as_str).collect();
        fetchers.sort_unstable();
        sinks.sort_unstable();
        f.debug_struct("NodeExecutor")
            .field("fetchers", &fetchers)
            .field("sinks", &sinks)
            .finish()
    }
}

impl NodeExecutor {
    /// Executor with no integrations: every data and action node reports "not configured"
    pub fn new() -> Self {
        Self::default()
    }

    /// Executor with the stub integrations registered
    ///
    /// Sources: weather, calendar, code-host (alias github).
    /// Actions: email, sms, social-post (alias social).
    pub fn with_stub_integrations() -> Self {
        let code_host: Arc<dyn DataFetcher> = Arc::new(StubGithub);
        let social: Arc<dyn ActionSink> = Arc::new(StubSocial);
        Self::new()
            .with_data_fetcher("weather", Arc::new(StubWeather))
            .with_data_fetcher("calendar", Arc::new(StubCalendar))
            .with_data_fetcher("code-host", code_host.clone())
            .with_data_fetcher("github", code_host)
            .with_action_sink("email", Arc::new(StubEmail))
            .with_action_sink("sms", Arc::new(StubSms))
            .with_action_sink("social-post", social.clone())
            .with_action_sink("social", social)
    }

    /// Register (or replace) the fetcher for a data source name
    pub fn with_data_fetcher(mut self, source: impl Into<String>, fetcher: Arc<dyn DataFetcher>) -> Self {
        self.fetchers.insert(source.into(), fetcher);
        self
    }

    /// Register (or replace) the sink for an action type
    pub fn with_action_sink(mut self, action: impl Into<String>, sink: Arc<dyn ActionSink>) -> Self {
        self.sinks.insert(action.into(), sink);
        self
    }

    /// Execute a single node against the current execution context
    ///
    /// Unknown categories, malformed configs and integration failures are returned
    /// as errors; the caller treats all of them as fatal to the run.
    pub async fn execute_node(
        &self,
        node: &Node,
        context: &ExecutionContext,
    ) -> Result<ResultEnvelope, EngineError> {
        tracing::info!("🚀 Executing node '{}' ({}, category: {})", node.label, node.id, node.category);
        let start_time = std::time::Instant::now();

        let result = match NodeSpec::parse(node) {
            Ok(NodeSpec::Trigger(config)) => Ok(self.execute_trigger(node, config)),
            Ok(NodeSpec::Data(config)) => self.execute_data(node, config).await,
            Ok(NodeSpec::Transform(config)) => self.execute_transform(config, context),
            Ok(NodeSpec::Action(config)) => self.execute_action(node, config, context).await,
            Err(e) => Err(e),
        };

        let duration = start_time.elapsed();
        match result.map(ResultEnvelope::now) {
            Ok(envelope) => {
                tracing::info!(
                    "✅ Node '{}' ({}) completed in {:?}",
                    node.id,
                    envelope.kind(),
                    duration
                );
                tracing::debug!(
                    "📤 Output: {}",
                    serde_json::to_string(&envelope).unwrap_or_else(|_| "invalid_json".to_string())
                );
                Ok(envelope)
            }
            Err(e) => {
                tracing::error!("❌ Node '{}' failed in {:?} - Error: {}", node.id, duration, e);
                Err(e)
            }
        }
    }

    fn execute_trigger(&self, node: &Node, config: TriggerConfig) -> NodeOutput {
        NodeOutput::Trigger {
            trigger_type: config.trigger_type,
            config: node.config.clone(),
        }
    }

    async fn execute_data(&self, node: &Node, config: DataConfig) -> Result<NodeOutput, EngineError> {
        let fetcher = config
            .source
            .as_deref()
            .and_then(|source| self.fetchers.get(source));

        let Some(fetcher) = fetcher else {
            tracing::warn!("⚠️ Data source {:?} not configured on node '{}'", config.source, node.id);
            return Ok(NodeOutput::Data {
                source: config.source,
                configured: false,
                data: json!({ "message": "Data source not configured" }),
            });
        };

        let data = fetcher.fetch(&config).await.map_err(|e| EngineError::Handler {
            node_id: node.id.clone(),
            message: e.to_string(),
        })?;

        Ok(NodeOutput::Data {
            source: config.source,
            configured: true,
            data,
        })
    }

    /// Transforms see the whole context, not only their direct predecessors
    fn execute_transform(
        &self,
        config: TransformConfig,
        context: &ExecutionContext,
    ) -> Result<NodeOutput, EngineError> {
        let data = match config.operation.as_deref() {
            Some("summarize") => json!({
                "summary": serde_json::to_string(context)?,
                "entries": context.len(),
            }),
            // filter, combine and unrecognised operations pass the context through
            _ => context.to_json()?,
        };

        Ok(NodeOutput::Transform {
            operation: config.operation,
            data,
        })
    }

    async fn execute_action(
        &self,
        node: &Node,
        config: ActionConfig,
        context: &ExecutionContext,
    ) -> Result<NodeOutput, EngineError> {
        let sink = config
            .action
            .as_deref()
            .and_then(|action| self.sinks.get(action));

        let Some(sink) = sink else {
            tracing::warn!("⚠️ Action {:?} not configured on node '{}'", config.action, node.id);
            return Ok(NodeOutput::Action {
                action: config.action,
                attempted: false,
                target: None,
                detail: json!({ "message": "Action not configured" }),
            });
        };

        let dispatch = sink
            .dispatch(&config, context)
            .await
            .map_err(|e| EngineError::Handler {
                node_id: node.id.clone(),
                message: e.to_string(),
            })?;

        Ok(NodeOutput::Action {
            action: config.action,
            attempted: true,
            target: dispatch.target,
            detail: dispatch.detail,
        })
    }
}
