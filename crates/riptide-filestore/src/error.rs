//! # Design
//!
//! - Structured, constant-message errors for the file store.
//! - Capture operation context (paths, names) so failures are
//!   reproducible in tests.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type for file store operations.
pub type FileStoreResult<T> = Result<T, FileStoreError>;

/// Errors produced by the scratch-directory service.
#[derive(Debug, Error)]
pub enum FileStoreError {
    /// IO failures while interacting with the filesystem.
    #[error("file store io failure")]
    Io {
        /// Operation that triggered the IO failure.
        operation: &'static str,
        /// Path involved in the IO failure.
        path: PathBuf,
        /// Underlying IO error.
        source: io::Error,
    },
    /// A requested file does not exist in the store.
    #[error("file not found")]
    NotFound {
        /// Name that failed lookup.
        filename: String,
    },
    /// A supplied filename failed validation.
    #[error("invalid filename")]
    InvalidFilename {
        /// Offending value.
        value: String,
        /// Static reason for the rejection.
        reason: &'static str,
    },
    /// A download finished but left no file under the staging prefix.
    #[error("staging output missing")]
    MissingOutput {
        /// Staging identifier whose output was expected.
        uid: String,
    },
}

impl FileStoreError {
    pub(crate) fn io(operation: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            operation,
            path: path.into(),
            source,
        }
    }
}
