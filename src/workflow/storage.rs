/// Graph store: the persistence boundary consumed by the execution engine
///
/// The engine only needs the four operations of [`GraphStore`]. The SQLite store
/// additionally offers the management operations used by the HTTP layer.

use crate::workflow::types::{
    Edge, ExecutionRecord, ExecutionStatus, Node, NodeCategory, Position, Workflow,
};
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow},
    Row,
};
use std::path::Path;

/// Narrow interface the execution engine reads from and writes to
#[async_trait]
pub trait GraphStore: Send + Sync {
    /// Fetch a workflow record, `None` if it does not exist
    async fn load_workflow(&self, workflow_id: &str) -> Result<Option<Workflow>>;

    /// All nodes of a workflow, in insertion order
    async fn load_nodes(&self, workflow_id: &str) -> Result<Vec<Node>>;

    /// All edges of a workflow, in insertion order
    async fn load_edges(&self, workflow_id: &str) -> Result<Vec<Edge>>;

    /// Persist one execution record
    async fn append_execution_record(&self, record: &ExecutionRecord) -> Result<()>;
}

/// SQLite-backed graph store
///
/// Node configs and execution contexts are stored as JSON text, timestamps as RFC3339.
/// Ordered loads rely on `rowid`, which follows insertion order.
#[derive(Debug, Clone)]
pub struct SqliteGraphStore {
    /// SQLite connection pool
    pool: SqlitePool,
}

impl SqliteGraphStore {
    /// Create new store instance with an existing pool
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open (creating if missing) the database file and initialize the schema
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                anyhow::anyhow!("Failed to create data directory '{}': {}", parent.display(), e)
            })?;
        }

        tracing::info!("🗄️ Opening graph store: {}", path.display());
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);
        let pool = SqlitePool::connect_with(options).await?;

        let store = Self::new(pool);
        store.init_schema().await?;
        Ok(store)
    }

    /// In-memory database, limited to one connection so every query sees the same data
    pub async fn in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;

        let store = Self::new(pool);
        store.init_schema().await?;
        Ok(store)
    }

    /// Initialize the graph schema
    ///
    /// Safe to call multiple times (uses IF NOT EXISTS).
    pub async fn init_schema(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS workflows (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                enabled INTEGER NOT NULL DEFAULT 1,
                created_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS nodes (
                id TEXT PRIMARY KEY,
                workflow_id TEXT NOT NULL,
                category TEXT NOT NULL,
                label TEXT NOT NULL,
                config TEXT NOT NULL,
                position_x REAL NOT NULL DEFAULT 0,
                position_y REAL NOT NULL DEFAULT 0
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        // Self-loops are refused here as well as in Edge::validate
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS edges (
                id TEXT PRIMARY KEY,
                workflow_id TEXT NOT NULL,
                source_id TEXT NOT NULL,
                target_id TEXT NOT NULL,
                CHECK (source_id <> target_id)
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS executions (
                id TEXT PRIMARY KEY,
                workflow_id TEXT NOT NULL,
                status TEXT NOT NULL,
                error TEXT,
                context TEXT,
                started_at TEXT NOT NULL,
                finished_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_nodes_workflow ON nodes(workflow_id)")
            .execute(&self.pool)
            .await?;
        sqlx::query("CREATE INDEX IF NOT EXISTS idx_edges_workflow ON edges(workflow_id)")
            .execute(&self.pool)
            .await?;
        sqlx::query("CREATE INDEX IF NOT EXISTS idx_executions_workflow ON executions(workflow_id)")
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Store a new workflow
    pub async fn create_workflow(&self, workflow: &Workflow) -> Result<()> {
        sqlx::query("INSERT INTO workflows (id, name, enabled, created_at) VALUES (?, ?, ?, ?)")
            .bind(&workflow.id)
            .bind(&workflow.name)
            .bind(workflow.enabled)
            .bind(workflow.created_at.to_rfc3339())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// List all workflows, oldest first
    pub async fn list_workflows(&self) -> Result<Vec<Workflow>> {
        let rows = sqlx::query("SELECT id, name, enabled, created_at FROM workflows ORDER BY rowid")
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(workflow_from_row).collect()
    }

    /// Flip the enabled flag, returning false when the workflow does not exist
    pub async fn set_workflow_enabled(&self, workflow_id: &str, enabled: bool) -> Result<bool> {
        let result = sqlx::query("UPDATE workflows SET enabled = ? WHERE id = ?")
            .bind(enabled)
            .bind(workflow_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Store a new node
    pub async fn create_node(&self, node: &Node) -> Result<()> {
        let config_json = serde_json::to_string(&node.config)?;

        sqlx::query(
            r#"
            INSERT INTO nodes (id, workflow_id, category, label, config, position_x, position_y)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&node.id)
        .bind(&node.workflow_id)
        .bind(node.category.as_str())
        .bind(&node.label)
        .bind(&config_json)
        .bind(node.position.x)
        .bind(node.position.y)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Store a new edge; self-loops are rejected with [`EdgeError::SelfLoop`](crate::workflow::EdgeError)
    pub async fn create_edge(&self, edge: &Edge) -> Result<()> {
        edge.validate()?;

        sqlx::query("INSERT INTO edges (id, workflow_id, source_id, target_id) VALUES (?, ?, ?, ?)")
            .bind(&edge.id)
            .bind(&edge.workflow_id)
            .bind(&edge.source_id)
            .bind(&edge.target_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Execution history of one workflow, newest first
    pub async fn list_executions(&self, workflow_id: &str) -> Result<Vec<ExecutionRecord>> {
        let rows = sqlx::query(
            r#"
            SELECT id, workflow_id, status, error, CAST(context AS TEXT) AS context, started_at, finished_at
            FROM executions
            WHERE workflow_id = ?
            ORDER BY rowid DESC
            "#,
        )
        .bind(workflow_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(execution_from_row).collect()
    }

    /// Retrieve one execution record by ID
    pub async fn get_execution(&self, execution_id: &str) -> Result<Option<ExecutionRecord>> {
        let row = sqlx::query(
            r#"
            SELECT id, workflow_id, status, error, CAST(context AS TEXT) AS context, started_at, finished_at
            FROM executions
            WHERE id = ?
            "#,
        )
        .bind(execution_id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(execution_from_row).transpose()
    }
}

#[async_trait]
impl GraphStore for SqliteGraphStore {
    async fn load_workflow(&self, workflow_id: &str) -> Result<Option<Workflow>> {
        let row = sqlx::query("SELECT id, name, enabled, created_at FROM workflows WHERE id = ?")
            .bind(workflow_id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(workflow_from_row).transpose()
    }

    async fn load_nodes(&self, workflow_id: &str) -> Result<Vec<Node>> {
        let rows = sqlx::query(
            r#"
            SELECT id, workflow_id, category, label, CAST(config AS TEXT) AS config, position_x, position_y
            FROM nodes
            WHERE workflow_id = ?
            ORDER BY rowid
            "#,
        )
        .bind(workflow_id)
        .fetch_all(&self.pool)
        .await?;

        let mut nodes = Vec::with_capacity(rows.len());
        for row in rows {
            let config_json: String = row.try_get("config")?;
            nodes.push(Node {
                id: row.try_get("id")?,
                workflow_id: row.try_get("workflow_id")?,
                category: NodeCategory::from(row.try_get::<String, _>("category")?),
                label: row.try_get("label")?,
                config: serde_json::from_str(&config_json)?,
                position: Position {
                    x: row.try_get("position_x")?,
                    y: row.try_get("position_y")?,
                },
            });
        }

        Ok(nodes)
    }

    async fn load_edges(&self, workflow_id: &str) -> Result<Vec<Edge>> {
        let rows = sqlx::query(
            "SELECT id, workflow_id, source_id, target_id FROM edges WHERE workflow_id = ? ORDER BY rowid",
        )
        .bind(workflow_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| -> Result<Edge> {
                Ok(Edge {
                    id: row.try_get("id")?,
                    workflow_id: row.try_get("workflow_id")?,
                    source_id: row.try_get("source_id")?,
                    target_id: row.try_get("target_id")?,
                })
            })
            .collect()
    }

    async fn append_execution_record(&self, record: &ExecutionRecord) -> Result<()> {
        let context_json = record
            .context
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        sqlx::query(
            r#"
            INSERT INTO executions (id, workflow_id, status, error, context, started_at, finished_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&record.id)
        .bind(&record.workflow_id)
        .bind(record.status.as_str())
        .bind(&record.error)
        .bind(context_json)
        .bind(record.started_at.to_rfc3339())
        .bind(record.finished_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(raw)
        .map_err(|e| anyhow::anyhow!("Invalid stored timestamp '{}': {}", raw, e))?
        .with_timezone(&Utc))
}

fn workflow_from_row(row: &SqliteRow) -> Result<Workflow> {
    let created_at: String = row.try_get("created_at")?;
    Ok(Workflow {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        enabled: row.try_get("enabled")?,
        created_at: parse_timestamp(&created_at)?,
    })
}

fn execution_from_row(row: &SqliteRow) -> Result<ExecutionRecord> {
    let status: String = row.try_get("status")?;
    let context: Option<String> = row.try_get("context")?;
    let started_at: String = row.try_get("started_at")?;
    let finished_at: String = row.try_get("finished_at")?;

    Ok(ExecutionRecord {
        id: row.try_get("id")?,
        workflow_id: row.try_get("workflow_id")?,
        status: ExecutionStatus::parse(&status)
            .ok_or_else(|| anyhow::anyhow!("Unknown execution status: {}", status))?,
        error: row.try_get("error")?,
        context: context.as_deref().map(serde_json::from_str).transpose()?,
        started_at: parse_timestamp(&started_at)?,
        finished_at: parse_timestamp(&finished_at)?,
    })
}
