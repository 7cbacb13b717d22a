use tracing_subscriber::{EnvFilter, fmt};

use crate::errors::{ErrorCode, KvGraphError, Result};

pub const LOG_ENV: &str = "KVGRAPH_LOG";

/// Installs a stderr subscriber filtered by `KVGRAPH_LOG`, falling back to
/// `default_level`. Fails if a global subscriber is already set.
pub fn init_logging(default_level: &str) -> Result<()> {
    let filter = match std::env::var(LOG_ENV) {
        Ok(directives) => EnvFilter::try_new(directives),
        Err(_) => EnvFilter::try_new(default_level),
    }
    .map_err(|e| {
        KvGraphError::precondition(ErrorCode::ArgInvalid, format!("invalid log filter: {e}"))
    })?;
    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|_| KvGraphError::precondition(ErrorCode::ArgInvalid, "logging already initialized"))
}
