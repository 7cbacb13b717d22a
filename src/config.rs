//! Backend selection and graph-level options.
//!
//! ```rust
//! use kvgraph::{BackendKind, GraphConfig, open_graph};
//!
//! let cfg = GraphConfig::memory().with_bucket("social");
//! assert_eq!(cfg.backend, BackendKind::Memory);
//! let graph = open_graph(&cfg)?;
//! # Ok::<(), kvgraph::KvGraphError>(())
//! ```

use std::path::PathBuf;

use crate::{
    connection::Connection,
    errors::Result,
    graph::Graph,
    optimizer::Optimizer,
};

pub const DEFAULT_BUCKET: &str = "graph";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BackendKind {
    /// Process-local, nothing persisted. Each bucket is its own keyspace.
    #[default]
    Memory,
    /// SQLite file (or an in-memory SQLite database when no path is set).
    /// Buckets share one connection and are separated by a bucket column.
    Sqlite,
}

impl BackendKind {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "memory" | "mem" => Some(BackendKind::Memory),
            "sqlite" => Some(BackendKind::Sqlite),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SqliteConfig {
    pub path: Option<PathBuf>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GraphConfig {
    pub backend: BackendKind,
    pub bucket: String,
    /// Apply rewrite rules when planning. Results are identical either way.
    pub optimize: bool,
    pub sqlite: SqliteConfig,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::Memory,
            bucket: DEFAULT_BUCKET.to_string(),
            optimize: true,
            sqlite: SqliteConfig::default(),
        }
    }
}

impl GraphConfig {
    pub fn new(backend: BackendKind) -> Self {
        Self {
            backend,
            ..Self::default()
        }
    }

    pub fn memory() -> Self {
        Self::new(BackendKind::Memory)
    }

    pub fn sqlite<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            backend: BackendKind::Sqlite,
            sqlite: SqliteConfig {
                path: Some(path.into()),
            },
            ..Self::default()
        }
    }

    pub fn sqlite_in_memory() -> Self {
        Self::new(BackendKind::Sqlite)
    }

    pub fn with_bucket(mut self, bucket: &str) -> Self {
        self.bucket = bucket.to_string();
        self
    }

    pub fn with_optimizer(mut self, enabled: bool) -> Self {
        self.optimize = enabled;
        self
    }

    pub fn optimizer(&self) -> Optimizer {
        if self.optimize {
            Optimizer::default()
        } else {
            Optimizer::without_rewrites()
        }
    }
}

pub fn open_graph(config: &GraphConfig) -> Result<Graph> {
    let connection = Connection::open(config)?;
    let store = connection.bucket(&config.bucket)?;
    tracing::info!(backend = ?config.backend, bucket = %config.bucket, "graph opened");
    Ok(Graph::new(store).with_optimizer(config.optimizer()))
}
