//! Error types for filestore_core.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using filestore_core's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during store operations.
///
/// `FileNotFound` is the only sentinel callers are expected to match on.
/// Everything else is an infrastructure failure and carries the backend's
/// own error information.
#[derive(Error, Debug)]
pub enum Error {
    /// No object exists at the given path, or the path names a directory.
    #[error("file was not found: {path}")]
    FileNotFound { path: String },

    /// I/O error occurred during file operations.
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    /// Store root is unusable. Only returned while constructing a store.
    #[error("Invalid store root {path}: {reason}")]
    InvalidRoot { path: PathBuf, reason: String },

    /// Path climbs above the store root and the store confines paths.
    #[error("Path escapes store root: {path}")]
    PathEscapesRoot { path: String },

    /// Operation context was cancelled or its deadline passed.
    #[error("Operation cancelled")]
    Cancelled,

    /// Configuration file could not be parsed.
    #[error("Invalid config: {reason}")]
    InvalidConfig { reason: String },
}

impl Error {
    /// Create a FileNotFound error.
    pub fn file_not_found(path: impl Into<String>) -> Self {
        Error::FileNotFound { path: path.into() }
    }

    /// Create an InvalidRoot error.
    pub fn invalid_root(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Error::InvalidRoot {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a PathEscapesRoot error.
    pub fn path_escapes_root(path: impl Into<String>) -> Self {
        Error::PathEscapesRoot { path: path.into() }
    }

    /// Create an InvalidConfig error.
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Error::InvalidConfig {
            reason: reason.into(),
        }
    }

    /// Whether this is the `FileNotFound` sentinel.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::FileNotFound { .. })
    }
}

impl From<tempfile::PersistError> for Error {
    fn from(err: tempfile::PersistError) -> Self {
        // Dropping err.file removes the temporary file.
        Error::Io { source: err.error }
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::InvalidConfig {
            reason: err.to_string(),
        }
    }
}
