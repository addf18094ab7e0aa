/// Configuration management for the Nodeflow engine
///
/// Handles server binding, the SQLite database location and the log filter.

use serde::{Deserialize, Serialize};

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server configuration
    pub server: ServerConfig,
    /// Database configuration
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server bind address (e.g., "0.0.0.0")
    pub host: String,
    /// Server port number
    pub port: u16,
}

/// Graph store location
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite file path; parent directories are created on startup
    pub path: String,
}

/// Tracing subscriber settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `EnvFilter` directive, e.g. "info" or "nodeflow=debug"
    pub filter: String,
}

impl Default for Config {
    /// Default configuration with ENV_VAR support for k8s/container deployment
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: std::env::var("NODEFLOW_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: std::env::var("NODEFLOW_PORT")
                    .ok()
                    .and_then(|port| port.parse().ok())
                    .unwrap_or(3004),
            },
            database: DatabaseConfig {
                path: std::env::var("NODEFLOW_DATABASE")
                    .unwrap_or_else(|_| "data/nodeflow.db".to_string()),
            },
            logging: LoggingConfig {
                filter: std::env::var("NODEFLOW_LOG").unwrap_or_else(|_| "info".to_string()),
            },
        }
    }
}
