//! Data sources and action sinks used by data and action nodes.
//!
//! Both are async traits so real implementations can suspend on network I/O.
//! The stubs below return fixed payloads and make no external calls; they are
//! what the default [`NodeExecutor`](crate::runtime::NodeExecutor) registers.

use crate::runtime::context::ExecutionContext;
use crate::runtime::nodes::{ActionConfig, DataConfig};
use anyhow::Result;
use async_trait::async_trait;
use serde_json::{json, Value};

/// Fetches the payload of a data node.
#[async_trait]
pub trait DataFetcher: Send + Sync {
    async fn fetch(&self, config: &DataConfig) -> Result<Value>;
}

/// Outcome of handing an action to its sink.
#[derive(Debug, Clone, PartialEq)]
pub struct Dispatch {
    /// Recipient, phone number or platform the action went to.
    pub target: Option<String>,
    pub detail: Value,
}

/// Performs the external effect of an action node.
#[async_trait]
pub trait ActionSink: Send + Sync {
    async fn dispatch(&self, config: &ActionConfig, context: &ExecutionContext) -> Result<Dispatch>;
}

/// Fixed weather report.
#[derive(Debug, Default)]
pub struct StubWeather;

#[async_trait]
impl DataFetcher for StubWeather {
    async fn fetch(&self, config: &DataConfig) -> Result<Value> {
        let location = config.location.as_deref().unwrap_or("Unknown");
        tracing::debug!("🌤️ Stub weather fetch for {}", location);
        Ok(json!({
            "location": location,
            "temperature": 72,
            "condition": "Sunny",
        }))
    }
}

/// Empty calendar.
#[derive(Debug, Default)]
pub struct StubCalendar;

#[async_trait]
impl DataFetcher for StubCalendar {
    async fn fetch(&self, config: &DataConfig) -> Result<Value> {
        let calendar_id = config.calendar_id.as_deref().unwrap_or("primary");
        tracing::debug!("📅 Stub calendar fetch for {}", calendar_id);
        Ok(json!({
            "calendar_id": calendar_id,
            "events": [],
        }))
    }
}

/// Repository with no open issues or pull requests.
#[derive(Debug, Default)]
pub struct StubGithub;

#[async_trait]
impl DataFetcher for StubGithub {
    async fn fetch(&self, config: &DataConfig) -> Result<Value> {
        tracing::debug!("🐙 Stub github fetch for {:?}", config.repository);
        Ok(json!({
            "repository": config.repository,
            "issues": [],
            "pull_requests": [],
        }))
    }
}

/// Logs the email instead of sending it.
#[derive(Debug, Default)]
pub struct StubEmail;

#[async_trait]
impl ActionSink for StubEmail {
    async fn dispatch(&self, config: &ActionConfig, context: &ExecutionContext) -> Result<Dispatch> {
        tracing::info!(
            "📧 Email to {:?} ({:?}) with {} context entries",
            config.to,
            config.subject,
            context.len()
        );
        Ok(Dispatch {
            target: config.to.clone(),
            detail: json!({ "subject": config.subject }),
        })
    }
}

/// Logs the text message instead of sending it.
#[derive(Debug, Default)]
pub struct StubSms;

#[async_trait]
impl ActionSink for StubSms {
    async fn dispatch(&self, config: &ActionConfig, _context: &ExecutionContext) -> Result<Dispatch> {
        tracing::info!("📱 SMS to {:?}", config.to);
        Ok(Dispatch {
            target: config.to.clone(),
            detail: json!({ "message": config.message }),
        })
    }
}

/// Logs the post instead of publishing it.
#[derive(Debug, Default)]
pub struct StubSocial;

#[async_trait]
impl ActionSink for StubSocial {
    async fn dispatch(&self, config: &ActionConfig, _context: &ExecutionContext) -> Result<Dispatch> {
        tracing::info!("📣 Social post on {:?}", config.platform);
        Ok(Dispatch {
            target: config.platform.clone(),
            detail: json!({ "message": config.message }),
        })
    }
}
