//! # Design
//!
//! - Structured, constant-message errors for extractor invocations.
//! - Distinguish "the tool ran and rejected the content" from "the tool
//!   could not be run", because the HTTP layer maps them differently.

use std::io;
use std::time::Duration;

use thiserror::Error;

/// Result type for extractor operations.
pub type ExtractorResult<T> = Result<T, ExtractorError>;

/// Errors produced by the yt-dlp wrapper.
#[derive(Debug, Error)]
pub enum ExtractorError {
    /// The yt-dlp binary could not be located.
    #[error("extractor binary missing")]
    ToolMissing {
        /// Name of the missing binary.
        tool: &'static str,
    },
    /// Spawning or collecting the child process failed.
    #[error("extractor process failure")]
    Spawn {
        /// Operation that triggered the failure.
        operation: &'static str,
        /// Underlying IO error.
        source: io::Error,
    },
    /// The process ran and exited non-zero (unsupported site, private or
    /// removed content, bad format selector).
    #[error("extraction rejected")]
    Rejected {
        /// Trailing stderr emitted by yt-dlp.
        stderr: String,
    },
    /// The process succeeded but its stdout was not the expected JSON.
    #[error("extractor output parse failure")]
    Parse {
        /// Underlying JSON error.
        source: serde_json::Error,
    },
    /// The process succeeded but produced unusable output.
    #[error("extractor output invalid")]
    Output {
        /// Static reason describing what was wrong with the output.
        reason: &'static str,
    },
    /// The invocation exceeded the configured timeout.
    #[error("extractor timed out")]
    TimedOut {
        /// Timeout that elapsed.
        timeout: Duration,
    },
}

impl ExtractorError {
    pub(crate) fn rejected(stderr: impl Into<String>) -> Self {
        Self::Rejected {
            stderr: stderr.into(),
        }
    }

    pub(crate) const fn spawn(operation: &'static str, source: io::Error) -> Self {
        Self::Spawn { operation, source }
    }

    /// Whether the failure came from yt-dlp itself rejecting the content,
    /// as opposed to the process being unrunnable or unparsable.
    #[must_use]
    pub const fn is_rejection(&self) -> bool {
        matches!(self, Self::Rejected { .. })
    }
}
