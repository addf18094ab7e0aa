/// Nodeflow: workflow execution engine
///
/// This library stores workflow graphs of trigger, data, transform and action nodes
/// and runs them depth-first from their trigger, recording one execution per run.

// Core configuration and setup
pub mod config;

// Workflow management layer - graph types and storage
pub mod workflow;

// Runtime execution engine - graph walking and node dispatch
pub mod runtime;

// HTTP API layer - REST endpoints for workflow management and runs
pub mod api;

// Server setup and initialization
pub mod server;

// Re-export commonly used types for external consumers
pub use runtime::{EngineError, ExecutionContext, ExecutionEngine, NodeExecutor, RunOutcome};
pub use server::start_server;
pub use workflow::{Edge, GraphStore, Node, NodeCategory, Workflow};
