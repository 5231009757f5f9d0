//! Error types for go-replace-sync.
//!
//! All operations return `Result<T>` which aliases `Result<T, SyncError>`.
//! Each variant corresponds to the pipeline step that failed, so callers can
//! react to a read failure differently from a parse failure.

use std::path::PathBuf;
use thiserror::Error;

/// Errors from synchronization runs.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Manifest locations could not be determined.
    #[error("Cannot resolve manifest path: {0}")]
    PathResolution(String),

    /// Manifest file could not be read.
    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Manifest content is not valid go.mod syntax.
    #[error("{}:{line}:{column}: {message}", path.display())]
    Parse {
        path: PathBuf,
        line: usize,
        column: usize,
        message: String,
    },

    /// Manifest could not be rendered back to text (indicates bug).
    #[error("Failed to format {}: {message}", path.display())]
    Format { path: PathBuf, message: String },

    /// Manifest file could not be written.
    #[error("Failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Invalid configuration file content.
    #[error("Invalid config '{0}': {1}")]
    Config(PathBuf, String),

    /// TOML parse error in a configuration file.
    #[error("TOML error: {0}")]
    Toml(#[from] toml_edit::TomlError),

    /// Unexpected error.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias for go-replace-sync operations.
pub type Result<T> = std::result::Result<T, SyncError>;
