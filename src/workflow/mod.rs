/// Workflow Management Layer
///
/// This module handles workflow graph definitions and their persistence:
/// - Type definitions (Workflow, Node, Edge, ExecutionRecord)
/// - The GraphStore trait consumed by the execution engine
/// - SQLite (sqlx) and in-memory store implementations

// Core workflow type definitions
pub mod types;

// GraphStore trait and SQLite implementation
pub mod storage;

// In-memory GraphStore for tests and embedding
pub mod memory;

// Re-export commonly used types
pub use memory::MemoryGraphStore;
pub use storage::{GraphStore, SqliteGraphStore};
pub use types::{
    Edge, EdgeError, ExecutionRecord, ExecutionStatus, Node, NodeCategory, Position, Workflow,
};
