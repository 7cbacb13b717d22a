//! Three-tier assertion helpers.
//!
//! - [`invariant`]: engine bug. Logged at `error` before the error is returned.
//! - [`require`]: caller supplied something invalid. Returned, not logged.
//! - [`warn`]: recoverable anomaly. Logged at `warn`, execution continues.

use crate::errors::{ErrorCode, KvGraphError, Result};

pub fn invariant<T: Into<String>>(condition: bool, code: ErrorCode, msg: T) -> Result<()> {
    if condition {
        return Ok(());
    }
    Err(invariant_violation(code, msg))
}

pub fn invariant_violation<T: Into<String>>(code: ErrorCode, msg: T) -> KvGraphError {
    let message = msg.into();
    tracing::error!(code = %code, "{message}");
    KvGraphError::invariant(code, message)
}

pub fn require<T: Into<String>>(condition: bool, code: ErrorCode, msg: T) -> Result<()> {
    if condition {
        Ok(())
    } else {
        Err(KvGraphError::precondition(code, msg))
    }
}

pub fn warn(code: ErrorCode, msg: impl AsRef<str>) {
    tracing::warn!(code = %code, "{}", msg.as_ref());
}
