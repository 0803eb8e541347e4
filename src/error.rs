//! Centralized error types for listsift.

use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the listsift library.
#[derive(Error, Debug)]
pub enum SiftError {
    /// I/O error with the associated file path.
    #[error("I/O error reading '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The specified file does not exist.
    #[error("Input file not found: {0}")]
    FileNotFound(PathBuf),

    /// A message block was empty or whitespace-only and could not be built.
    ///
    /// This is the normal fate of the empty flush emitted when a boundary
    /// marker is the very first chunk of a stream; callers drop the message
    /// and continue.
    #[error("Empty message block")]
    EmptyMessage,

    /// Message text could not be interpreted as text.
    #[error("Decode error: {0}")]
    Decode(String),

    /// A sink write failed.
    #[error("Export error: {0}")]
    Export(String),
}

/// Convenience alias for `Result<T, SiftError>`.
pub type Result<T> = std::result::Result<T, SiftError>;

impl SiftError {
    /// Create an `Io` variant from a path and an `io::Error`.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Allow `?` on `std::io::Error` inside functions returning `SiftError`
/// when no path context is available (rare — prefer `SiftError::io`).
impl From<std::io::Error> for SiftError {
    fn from(source: std::io::Error) -> Self {
        Self::Io {
            path: PathBuf::from("<unknown>"),
            source,
        }
    }
}
