/// Runtime Execution Engine
///
/// This module provides the depth-first execution engine for workflows.
/// It handles:
/// - Building the adjacency map of a workflow graph
/// - Walking the graph from its trigger node
/// - Dispatching each node to its category handler
/// - Accumulating results in a run-scoped execution context

// Top-level run orchestration and execution records
pub mod engine;

// Per-category node dispatch
pub mod executor;

// Iterative depth-first traversal with cycle detection
pub mod walker;

// Adjacency map derived per run
pub mod graph;

// Execution context and result envelopes
pub mod context;

// Typed per-category node configuration
pub mod nodes;

// Data fetchers and action sinks
pub mod integrations;

pub mod error;

// Re-export main types
pub use context::{ExecutionContext, NodeOutput, ResultEnvelope};
pub use engine::{ExecutionEngine, RunOutcome};
pub use error::EngineError;
pub use executor::NodeExecutor;
