//! Error types for taskgate.
//!
//! Uses thiserror for derive macros and provides user-actionable error messages.
//! Gate blocks are not errors inside the engine; `Blocked` only exists so the
//! CLI can turn a block decision into the right exit code.

use crate::exit_codes;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for taskgate operations.
#[derive(Error, Debug)]
pub enum TaskgateError {
    /// User provided invalid arguments or the project is in an invalid state.
    #[error("{0}")]
    UserError(String),

    /// The schema is malformed, incomplete, or carries an unsupported version.
    ///
    /// `key` names the offending schema key or pattern so the message can be
    /// acted on without re-reading the config.
    #[error("schema validation failed at '{key}': {message}")]
    SchemaValidation { key: String, message: String },

    /// A gate blocked the requested action (CLI rendering only).
    #[error("{0}")]
    Blocked(String),

    /// Reading or writing a project file failed.
    #[error("failed to access '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl TaskgateError {
    /// Shorthand for a schema validation error.
    pub fn schema(key: impl Into<String>, message: impl Into<String>) -> Self {
        TaskgateError::SchemaValidation {
            key: key.into(),
            message: message.into(),
        }
    }

    /// Wrap an I/O error with the path it happened on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        TaskgateError::Io {
            path: path.into(),
            source,
        }
    }

    /// Returns the appropriate exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            TaskgateError::UserError(_) => exit_codes::USER_ERROR,
            TaskgateError::SchemaValidation { .. } => exit_codes::SCHEMA_INVALID,
            TaskgateError::Blocked(_) => exit_codes::BLOCKED,
            TaskgateError::Io { .. } => exit_codes::USER_ERROR,
        }
    }
}

/// Result type alias for taskgate operations.
pub type Result<T> = std::result::Result<T, TaskgateError>;
