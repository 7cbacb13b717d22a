use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Stable, machine-readable error codes. The string form never changes once
/// published, hosts match on it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    ChainEmpty,
    ChainOperationNotAllowed,
    ChainUnknownOperation,
    DslSyntax,
    ArgInvalid,
    ArgLabelRequired,
    ArgEndpointRequired,
    ArgInvalidToken,
    ArgReservedProperty,
    ArgPropertyKeyRequired,
    ArgNonScalarValue,
    ArgLimitInvalid,
    DataEndpointMissing,
    KvInvalidPattern,
    KvKeyExists,
    KvStorage,
    KvSerialization,
    InvariantTraverserMismatch,
    InvariantPlanMissingRoot,
    WarnCorruptIndex,
    WarnDanglingRecord,
    WarnCleanupFailed,
    WarnRewriteSkipped,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::ChainEmpty => "CHAIN_EMPTY",
            ErrorCode::ChainOperationNotAllowed => "CHAIN_OPERATION_NOT_ALLOWED",
            ErrorCode::ChainUnknownOperation => "CHAIN_UNKNOWN_OPERATION",
            ErrorCode::DslSyntax => "DSL_SYNTAX",
            ErrorCode::ArgInvalid => "ARG_INVALID",
            ErrorCode::ArgLabelRequired => "ARG_LABEL_REQUIRED",
            ErrorCode::ArgEndpointRequired => "ARG_ENDPOINT_REQUIRED",
            ErrorCode::ArgInvalidToken => "ARG_INVALID_TOKEN",
            ErrorCode::ArgReservedProperty => "ARG_RESERVED_PROPERTY",
            ErrorCode::ArgPropertyKeyRequired => "ARG_PROPERTY_KEY_REQUIRED",
            ErrorCode::ArgNonScalarValue => "ARG_NON_SCALAR_VALUE",
            ErrorCode::ArgLimitInvalid => "ARG_LIMIT_INVALID",
            ErrorCode::DataEndpointMissing => "DATA_ENDPOINT_MISSING",
            ErrorCode::KvInvalidPattern => "KV_INVALID_PATTERN",
            ErrorCode::KvKeyExists => "KV_KEY_EXISTS",
            ErrorCode::KvStorage => "KV_STORAGE",
            ErrorCode::KvSerialization => "KV_SERIALIZATION",
            ErrorCode::InvariantTraverserMismatch => "INVARIANT_TRAVERSER_MISMATCH",
            ErrorCode::InvariantPlanMissingRoot => "INVARIANT_PLAN_MISSING_ROOT",
            ErrorCode::WarnCorruptIndex => "WARN_CORRUPT_INDEX",
            ErrorCode::WarnDanglingRecord => "WARN_DANGLING_RECORD",
            ErrorCode::WarnCleanupFailed => "WARN_CLEANUP_FAILED",
            ErrorCode::WarnRewriteSkipped => "WARN_REWRITE_SKIPPED",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorKind {
    Precondition,
    Invariant,
    Backend,
}

#[derive(Debug, Error)]
pub enum KvGraphError {
    #[error("precondition failed [{code}]: {message}")]
    Precondition { code: ErrorCode, message: String },
    #[error("invariant violated [{code}]: {message}")]
    Invariant { code: ErrorCode, message: String },
    #[error("key already exists: {0}")]
    KeyExists(String),
    #[error("storage error: {0}")]
    Storage(String),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl KvGraphError {
    pub fn precondition<T: Into<String>>(code: ErrorCode, msg: T) -> Self {
        KvGraphError::Precondition {
            code,
            message: msg.into(),
        }
    }

    pub fn invariant<T: Into<String>>(code: ErrorCode, msg: T) -> Self {
        KvGraphError::Invariant {
            code,
            message: msg.into(),
        }
    }

    pub fn key_exists<T: Into<String>>(key: T) -> Self {
        KvGraphError::KeyExists(key.into())
    }

    pub fn storage<T: Into<String>>(msg: T) -> Self {
        KvGraphError::Storage(msg.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            KvGraphError::Precondition { .. } => ErrorKind::Precondition,
            KvGraphError::Invariant { .. } => ErrorKind::Invariant,
            KvGraphError::KeyExists(_)
            | KvGraphError::Storage(_)
            | KvGraphError::Serialization(_) => ErrorKind::Backend,
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            KvGraphError::Precondition { code, .. } | KvGraphError::Invariant { code, .. } => *code,
            KvGraphError::KeyExists(_) => ErrorCode::KvKeyExists,
            KvGraphError::Storage(_) => ErrorCode::KvStorage,
            KvGraphError::Serialization(_) => ErrorCode::KvSerialization,
        }
    }

    pub fn is_key_exists(&self) -> bool {
        matches!(self, KvGraphError::KeyExists(_))
    }
}

pub type Result<T> = std::result::Result<T, KvGraphError>;
