//! Shared error type across fatigue crates.

use serde::Serialize;
use thiserror::Error;

/// Client-facing error codes (stable API).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientCode {
    /// Required configuration is missing or malformed.
    Configuration,
    /// Submission body failed validation.
    Validation,
    /// The point could not be handed to the write buffer.
    StorageWrite,
    /// Flushing the write buffer during shutdown failed.
    ShutdownFlush,
}

impl ClientCode {
    /// String representation used in JSON responses.
    pub fn as_str(self) -> &'static str {
        match self {
            ClientCode::Configuration => "CONFIGURATION",
            ClientCode::Validation => "VALIDATION",
            ClientCode::StorageWrite => "STORAGE_WRITE",
            ClientCode::ShutdownFlush => "SHUTDOWN_FLUSH",
        }
    }
}

/// One failing field of a request body.
///
/// `loc` mirrors the JSON path of the offending value, e.g. `["body", "value"]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub loc: Vec<String>,
    pub msg: String,
}

impl FieldError {
    pub fn new(path: &[&str], msg: impl Into<String>) -> Self {
        Self {
            loc: path.iter().map(|s| s.to_string()).collect(),
            msg: msg.into(),
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, FatigueError>;

/// Unified error type used by core and gateway.
#[derive(Debug, Error)]
pub enum FatigueError {
    #[error("configuration: {0}")]
    Configuration(String),
    #[error("validation failed: {}", summarize(.0))]
    Validation(Vec<FieldError>),
    #[error("time-series write error: {0}")]
    StorageWrite(String),
    #[error("shutdown flush failed: {0}")]
    ShutdownFlush(String),
}

impl FatigueError {
    /// Map internal error to a stable client-facing code.
    pub fn client_code(&self) -> ClientCode {
        match self {
            FatigueError::Configuration(_) => ClientCode::Configuration,
            FatigueError::Validation(_) => ClientCode::Validation,
            FatigueError::StorageWrite(_) => ClientCode::StorageWrite,
            FatigueError::ShutdownFlush(_) => ClientCode::ShutdownFlush,
        }
    }

    /// Shorthand for a single-field validation failure.
    pub fn invalid(path: &[&str], msg: impl Into<String>) -> Self {
        FatigueError::Validation(vec![FieldError::new(path, msg)])
    }
}

fn summarize(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {}", e.loc.join("."), e.msg))
        .collect::<Vec<_>>()
        .join("; ")
}
