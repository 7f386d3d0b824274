//! Domain-specific error types and error handling utilities.
//!
//! This module defines [`GitDeckError`], the single failure type surfaced by the process
//! runner, the git bridge and the working-state synchronizer. Tool failures always carry
//! the raw text git printed so the user-facing layer can display it verbatim.
//!
//! # Public API
//! - [`GitDeckError`]: Main error enum covering all failure modes
//! - [`Result<T>`]: Type alias for `std::result::Result<T, GitDeckError>`
//!
//! # Error Categories
//! - **Process**: the git executable could not be launched, or a bounded wait expired
//! - **Tool**: git ran but reported a failure (non-zero exit or a fatal marker on stderr)
//! - **Repository**: the selected directory is not a repository
//! - **Cache**: persisted working-state blobs could not be written or read back

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Domain-specific error types for git-deck
#[derive(Error, Debug)]
pub enum GitDeckError {
    // Process errors
    #[error("Failed to launch '{program}': {source}")]
    SpawnFailure {
        program: String,
        source: std::io::Error,
    },

    #[error("'{command}' did not finish within {}s", .after.as_secs())]
    TimedOut { command: String, after: Duration },

    #[error("Output pipe for '{program}' was not captured")]
    MissingOutputPipe { program: String },

    // Tool errors. The message is git's own text, unmodified.
    #[error("{message}")]
    ToolFailure { command: String, message: String },

    #[error("Failed to {action} {file}: {message}")]
    FileActionFailed {
        action: String,
        file: String,
        message: String,
    },

    // Repository errors
    #[error("{message}")]
    NotARepository { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Cache errors
    #[error("Failed to create cache directory '{path}': {source}")]
    CacheDirectoryCreationFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to serialize cache data: {source}")]
    CacheSerializationFailed { source: serde_json::Error },

    #[error("Failed to write cache file '{path}': {source}")]
    CacheWriteFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Cache file does not exist at '{path}'. Run 'git-deck status' first.")]
    CacheFileNotFound { path: PathBuf },

    #[error("Failed to read cache file '{path}': {source}")]
    CacheReadFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse cache file '{path}': {source}")]
    CacheParseFailed {
        path: PathBuf,
        source: serde_json::Error,
    },

    // JSON serialization errors
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience type alias for Results using GitDeckError
pub type Result<T> = std::result::Result<T, GitDeckError>;

impl GitDeckError {
    /// Create a spawn failure for the given program
    pub fn spawn_failure(program: impl Into<String>, source: std::io::Error) -> Self {
        Self::SpawnFailure {
            program: program.into(),
            source,
        }
    }

    /// Create a timeout error for a command line
    pub fn timed_out(command: impl Into<String>, after: Duration) -> Self {
        Self::TimedOut {
            command: command.into(),
            after,
        }
    }

    /// Create a tool failure carrying git's raw message
    pub fn tool_failure(command: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ToolFailure {
            command: command.into(),
            message: message.into(),
        }
    }

    /// Create a per-file action failure (stage, unstage, revert)
    pub fn file_action_failed(
        action: impl Into<String>,
        file: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::FileActionFailed {
            action: action.into(),
            file: file.into(),
            message: message.into(),
        }
    }

    /// Create a not-a-repository error
    pub fn not_a_repository(message: impl Into<String>) -> Self {
        Self::NotARepository {
            message: message.into(),
        }
    }

    /// Raw tool text for failures that carry one, the display string otherwise.
    pub fn tool_message(&self) -> String {
        match self {
            Self::ToolFailure { message, .. } | Self::FileActionFailed { message, .. } => {
                message.clone()
            }
            other => other.to_string(),
        }
    }

    /// Create a cache directory creation failed error
    pub fn cache_directory_creation_failed(
        path: impl Into<PathBuf>,
        source: std::io::Error,
    ) -> Self {
        Self::CacheDirectoryCreationFailed {
            path: path.into(),
            source,
        }
    }

    /// Create a cache serialization failed error
    pub fn cache_serialization_failed(source: serde_json::Error) -> Self {
        Self::CacheSerializationFailed { source }
    }

    /// Create a cache write failed error
    pub fn cache_write_failed(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::CacheWriteFailed {
            path: path.into(),
            source,
        }
    }

    /// Create a cache file not found error
    pub fn cache_file_not_found(path: impl Into<PathBuf>) -> Self {
        Self::CacheFileNotFound { path: path.into() }
    }

    /// Create a cache read failed error
    pub fn cache_read_failed(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::CacheReadFailed {
            path: path.into(),
            source,
        }
    }

    /// Create a cache parse failed error
    pub fn cache_parse_failed(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::CacheParseFailed {
            path: path.into(),
            source,
        }
    }
}
