//! Centralized error types for emlrename.

use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the emlrename library.
#[derive(Error, Debug)]
pub enum RenameError {
    /// I/O error with the associated file path.
    #[error("I/O error on '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The target directory does not exist or is not a directory.
    #[error("Directory not found: {0}")]
    DirectoryNotFound(PathBuf),

    /// The file was read but no header field could be recognized.
    #[error("No message headers found in '{0}'")]
    Unparseable(PathBuf),

    /// The folder holds more message files than the configured ceiling.
    #[error("Too many message files in folder: {found} found, limit is {limit}")]
    TooManyFiles { found: usize, limit: usize },
}

/// Convenience alias for `Result<T, RenameError>`.
pub type Result<T> = std::result::Result<T, RenameError>;

impl RenameError {
    /// Create an `Io` variant from a path and an `io::Error`.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether this error means the file could not be opened or read at all.
    pub fn is_unopenable(&self) -> bool {
        matches!(self, Self::Io { .. })
    }
}
