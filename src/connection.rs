//! Connection lifecycle and bucket-scoped store handles.
//!
//! A [`Connection`] is owned by the host. Each bucket handle is created on
//! first use and shared afterwards; concurrent first use still yields one
//! handle.

use std::sync::Arc;

use ahash::AHashMap;
use parking_lot::Mutex;

use crate::{
    backend::{KvStore, MemoryKvStore},
    config::{BackendKind, GraphConfig},
    diagnostics::require,
    errors::{ErrorCode, Result},
    pattern::is_valid_token,
};

#[cfg(feature = "sqlite-backend")]
use crate::backend::sqlite::{self, SharedConnection, SqliteKvStore};

enum Target {
    Memory,
    #[cfg(feature = "sqlite-backend")]
    Sqlite(SharedConnection),
}

pub struct Connection {
    target: Target,
    buckets: Mutex<AHashMap<String, Arc<dyn KvStore>>>,
}

impl Connection {
    pub fn open(config: &GraphConfig) -> Result<Self> {
        let target = match config.backend {
            BackendKind::Memory => Target::Memory,
            #[cfg(feature = "sqlite-backend")]
            BackendKind::Sqlite => match &config.sqlite.path {
                Some(path) => Target::Sqlite(sqlite::open_connection(path)?),
                None => Target::Sqlite(sqlite::open_in_memory_connection()?),
            },
            #[cfg(not(feature = "sqlite-backend"))]
            BackendKind::Sqlite => {
                return Err(crate::errors::KvGraphError::storage(
                    "sqlite backend not compiled in (enable the sqlite-backend feature)",
                ));
            }
        };
        tracing::info!(backend = ?config.backend, "connection opened");
        Ok(Self {
            target,
            buckets: Mutex::new(AHashMap::new()),
        })
    }

    pub fn in_memory() -> Self {
        Self {
            target: Target::Memory,
            buckets: Mutex::new(AHashMap::new()),
        }
    }

    pub fn bucket(&self, name: &str) -> Result<Arc<dyn KvStore>> {
        require(
            is_valid_token(name),
            ErrorCode::ArgInvalidToken,
            format!("bucket name '{name}' is not a valid key token"),
        )?;
        let mut buckets = self.buckets.lock();
        if let Some(store) = buckets.get(name) {
            return Ok(Arc::clone(store));
        }
        let store: Arc<dyn KvStore> = match &self.target {
            Target::Memory => Arc::new(MemoryKvStore::new()),
            #[cfg(feature = "sqlite-backend")]
            Target::Sqlite(conn) => Arc::new(SqliteKvStore::with_connection(Arc::clone(conn), name)),
        };
        buckets.insert(name.to_string(), Arc::clone(&store));
        tracing::debug!(bucket = name, "bucket handle created");
        Ok(store)
    }

    pub fn bucket_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.buckets.lock().keys().cloned().collect();
        names.sort();
        names
    }

    /// Releases every bucket handle held by this connection. Handles already
    /// given out stay usable until their last clone drops.
    pub fn close(self) -> Result<()> {
        let released = self.buckets.lock().len();
        drop(self);
        tracing::info!(buckets = released, "connection closed");
        Ok(())
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let backend = match self.target {
            Target::Memory => "memory",
            #[cfg(feature = "sqlite-backend")]
            Target::Sqlite(_) => "sqlite",
        };
        f.debug_struct("Connection")
            .field("backend", &backend)
            .field("buckets", &self.bucket_names())
            .finish()
    }
}
