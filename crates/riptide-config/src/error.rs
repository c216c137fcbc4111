//! Error types for configuration loading.

use thiserror::Error;

/// Result alias for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Primary error type for configuration loading and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An environment value failed validation.
    #[error("invalid configuration field")]
    InvalidField {
        /// Environment variable that failed validation.
        field: &'static str,
        /// Offending value supplied by the environment.
        value: String,
        /// Machine-readable reason for the failure.
        reason: &'static str,
    },
    /// Bind address value was invalid.
    #[error("invalid bind address")]
    InvalidBindAddr {
        /// Bind address payload provided by the environment.
        value: String,
    },
}

impl ConfigError {
    pub(crate) fn invalid_field(
        field: &'static str,
        value: impl Into<String>,
        reason: &'static str,
    ) -> Self {
        Self::InvalidField {
            field,
            value: value.into(),
            reason,
        }
    }
}
