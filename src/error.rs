//! Error types for taskpad
//!
//! Exit codes:
//! - 0: Success
//! - 2: User error (bad args, bad config, unknown task)
//! - 3: Blocked (data directory held by another writer)
//! - 4: Operation failed (I/O, serialization, storage write)

use std::path::PathBuf;
use thiserror::Error;

/// Exit codes for the taskpad CLI
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const USER_ERROR: i32 = 2;
    pub const BLOCKED: i32 = 3;
    pub const OPERATION_FAILED: i32 = 4;
}

/// Main error type for taskpad operations
#[derive(Error, Debug)]
pub enum Error {
    // User errors (exit code 2)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Task not found: {0}")]
    TaskNotFound(String),

    // Blocked (exit code 3)
    #[error("Data directory is locked by another writer: {0}")]
    LockFailed(PathBuf),

    // Operation failures (exit code 4)
    #[error("Failed to write {record} record: {source}")]
    StorageWrite {
        record: String,
        #[source]
        source: Box<Error>,
    },

    #[error("No data directory available; pass --data-dir")]
    DataDirUnavailable,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Operation failed: {0}")]
    OperationFailed(String),
}

impl Error {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::InvalidArgument(_) | Error::InvalidConfig(_) | Error::TaskNotFound(_) => {
                exit_codes::USER_ERROR
            }

            Error::LockFailed(_) => exit_codes::BLOCKED,

            Error::StorageWrite { .. }
            | Error::DataDirUnavailable
            | Error::Io(_)
            | Error::Json(_)
            | Error::OperationFailed(_) => exit_codes::OPERATION_FAILED,
        }
    }

    /// Machine-readable class of the exit code
    pub fn kind(&self) -> &'static str {
        match self.exit_code() {
            exit_codes::USER_ERROR => "user_error",
            exit_codes::BLOCKED => "blocked",
            _ => "operation_failed",
        }
    }

    /// Wrap a lower-level failure as a write error for the named record.
    pub fn storage_write(record: impl Into<String>, source: Error) -> Self {
        Error::StorageWrite {
            record: record.into(),
            source: Box::new(source),
        }
    }

    /// Structured context for JSON error output.
    pub fn details(&self) -> Option<serde_json::Value> {
        match self {
            Error::TaskNotFound(id) => Some(serde_json::json!({ "id": id })),
            Error::LockFailed(path) => Some(serde_json::json!({ "lock": path })),
            Error::StorageWrite { record, .. } => Some(serde_json::json!({ "record": record })),
            _ => None,
        }
    }
}

/// Result type alias for taskpad operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error body of the JSON envelope
#[derive(Debug, serde::Serialize)]
pub struct JsonError {
    pub message: String,
    pub code: i32,
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl From<&Error> for JsonError {
    fn from(err: &Error) -> Self {
        JsonError {
            message: err.to_string(),
            code: err.exit_code(),
            kind: err.kind(),
            details: err.details(),
        }
    }
}
