//! Error types for Topicflow.
//!
//! Library crates use [`TopicflowError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all Topicflow operations.
#[derive(Debug, thiserror::Error)]
pub enum TopicflowError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Network/HTTP error while talking to a summary source.
    #[error("network error: {0}")]
    Network(String),

    /// Response body or input document could not be parsed.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// Store read/write failure that is not a parse failure.
    #[error("storage error: {0}")]
    Storage(String),

    /// An on-disk store document exists but does not parse.
    #[error("malformed store at {path:?}: {message}")]
    MalformedStore { path: PathBuf, message: String },

    /// Neither summary source produced usable content.
    #[error("acquisition failed for '{topic}': {reason}")]
    Acquisition { topic: String, reason: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Input validation error (bad user id, unsupported format, ...).
    #[error("validation error: {message}")]
    Validation { message: String },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, TopicflowError>;

impl TopicflowError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a parse error from any displayable message.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn malformed(path: impl Into<PathBuf>, msg: impl Into<String>) -> Self {
        Self::MalformedStore {
            path: path.into(),
            message: msg.into(),
        }
    }

    pub fn acquisition(topic: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Acquisition {
            topic: topic.into(),
            reason: reason.into(),
        }
    }
}
