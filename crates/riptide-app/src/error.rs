//! # Design
//!
//! - Centralize application-level errors for the bootstrap sequence.
//! - Keep error messages constant while carrying context fields for
//!   debugging.

use thiserror::Error;

/// Result alias for application operations.
pub type AppResult<T> = Result<T, AppError>;

/// Application-level error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration resolution failed.
    #[error("configuration operation failed")]
    Config {
        /// Operation identifier.
        operation: &'static str,
        /// Source configuration error.
        source: riptide_config::ConfigError,
    },
    /// Telemetry initialisation failed.
    #[error("telemetry operation failed")]
    Telemetry {
        /// Operation identifier.
        operation: &'static str,
        /// Source telemetry error.
        source: anyhow::Error,
    },
    /// File store operations failed.
    #[error("file store operation failed")]
    FileStore {
        /// Operation identifier.
        operation: &'static str,
        /// Source file store error.
        source: riptide_filestore::FileStoreError,
    },
    /// API server operations failed.
    #[error("api server operation failed")]
    ApiServer {
        /// Operation identifier.
        operation: &'static str,
        /// Source API server error.
        source: anyhow::Error,
    },
}

impl AppError {
    pub(crate) const fn config(
        operation: &'static str,
        source: riptide_config::ConfigError,
    ) -> Self {
        Self::Config { operation, source }
    }

    pub(crate) const fn telemetry(operation: &'static str, source: anyhow::Error) -> Self {
        Self::Telemetry { operation, source }
    }

    pub(crate) const fn file_store(
        operation: &'static str,
        source: riptide_filestore::FileStoreError,
    ) -> Self {
        Self::FileStore { operation, source }
    }

    pub(crate) const fn api_server(operation: &'static str, source: anyhow::Error) -> Self {
        Self::ApiServer { operation, source }
    }
}
