/// Error Types
///
/// Tool operations return `ToolError`, which carries a programmatic
/// `ErrorKind` alongside its human-readable message. The text form is only
/// produced at the MCP boundary, where it becomes `Error: <message>`.
/// Process-level failures (configuration, binding, I/O) use `ServerError`.

use serde::Serialize;
use thiserror::Error;

/// Coarse error category exposed to clients as `_meta.errorKind`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Missing path, directory, or resource
    NotFound,
    /// Path exists but is the wrong kind of entry
    WrongType,
    /// Arguments were missing, malformed, or outside the operation's domain
    InvalidInput,
    /// Any other failure (I/O errors, permissions, ...)
    Internal,
}

/// Failure of a single tool invocation.
#[derive(Debug, Error)]
pub enum ToolError {
    /// `what` names the entry that was expected ("File", "Directory", "Path")
    #[error("{what} not found: {path}")]
    NotFound { what: &'static str, path: String },

    #[error("Path is not a file: {0}")]
    NotAFile(String),

    #[error("Path is not a directory: {0}")]
    NotADirectory(String),

    #[error("File is not valid UTF-8: {0}")]
    InvalidEncoding(String),

    #[error("Invalid pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("Cannot divide by zero")]
    DivisionByZero,

    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    #[error("Could not encode result: {0}")]
    Encode(#[from] serde_json::Error),

    /// `action` is a verb phrase such as "read file"
    #[error("Could not {action}: {source}")]
    Io {
        action: &'static str,
        #[source]
        source: std::io::Error,
    },
}

impl ToolError {
    pub fn not_found(what: &'static str, path: impl Into<String>) -> Self {
        ToolError::NotFound { what, path: path.into() }
    }

    pub fn io(action: &'static str, source: std::io::Error) -> Self {
        ToolError::Io { action, source }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ToolError::NotFound { .. } => ErrorKind::NotFound,
            ToolError::NotAFile(_) | ToolError::NotADirectory(_) => ErrorKind::WrongType,
            ToolError::InvalidEncoding(_)
            | ToolError::InvalidPattern { .. }
            | ToolError::DivisionByZero
            | ToolError::InvalidArguments(_) => ErrorKind::InvalidInput,
            ToolError::Io { source, .. } if source.kind() == std::io::ErrorKind::NotFound => {
                ErrorKind::NotFound
            }
            ToolError::Io { .. } | ToolError::Encode(_) => ErrorKind::Internal,
        }
    }
}

/// Process-level error for server startup and configuration.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Failed to read config file {path}: {source}")]
    ConfigRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file {path}: {source}")]
    ConfigParse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Invalid {name} '{value}': {reason}")]
    InvalidSetting {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
