//! Error types for transcoder invocations.

use std::io;
use std::time::Duration;

use thiserror::Error;

/// Result type for transcoder operations.
pub type TranscodeResult<T> = Result<T, TranscodeError>;

/// Errors produced by the FFmpeg wrapper.
#[derive(Debug, Error)]
pub enum TranscodeError {
    /// The ffmpeg binary could not be located. Surfaced as a descriptive
    /// configuration error on first use, never a crash.
    #[error("transcoder binary missing")]
    ToolMissing {
        /// Name of the missing binary.
        tool: &'static str,
    },
    /// Spawning or collecting the child process failed.
    #[error("transcoder process failure")]
    Spawn {
        /// Operation that triggered the failure.
        operation: &'static str,
        /// Underlying IO error.
        source: io::Error,
    },
    /// The process ran and exited non-zero.
    #[error("transcode failed")]
    Failed {
        /// Trailing stderr emitted by ffmpeg.
        stderr: String,
    },
    /// The invocation exceeded the configured timeout.
    #[error("transcoder timed out")]
    TimedOut {
        /// Timeout that elapsed.
        timeout: Duration,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn spawn_preserves_source() {
        let err = TranscodeError::Spawn {
            operation: "to_audio",
            source: io::Error::other("io"),
        };
        assert!(err.source().is_some());
    }
}
