//! `FfmpegTranscoder` and the `AudioTranscoder` trait seam.
//!
//! # Design
//! - ffmpeg runs as an async child process bounded by the configured
//!   timeout, mirroring the extractor wrapper.
//! - Only audio extraction is exposed; the service never re-encodes video.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::error::{TranscodeError, TranscodeResult};

const FFMPEG_BINARY: &str = "ffmpeg";

/// Container extension produced by audio extraction.
pub const AUDIO_EXTENSION: &str = "mp3";

/// Contract between the HTTP layer and the media conversion backend.
#[async_trait]
pub trait AudioTranscoder: Send + Sync {
    /// Extract the audio track of `input` into an mp3 at `output`.
    async fn to_audio(&self, input: &Path, output: &Path) -> TranscodeResult<()>;
}

/// Production transcoder that shells out to the ffmpeg binary.
pub struct FfmpegTranscoder {
    binary: PathBuf,
    timeout: Duration,
}

impl FfmpegTranscoder {
    /// Locate ffmpeg and construct the transcoder.
    ///
    /// Discovery order: the explicit override, then the system `PATH`.
    ///
    /// # Errors
    ///
    /// Returns [`TranscodeError::ToolMissing`] when no binary can be found.
    pub fn new(override_path: Option<&Path>, timeout: Duration) -> TranscodeResult<Self> {
        let binary = discover(override_path).ok_or(TranscodeError::ToolMissing {
            tool: FFMPEG_BINARY,
        })?;
        debug!(binary = %binary.display(), "using ffmpeg");
        Ok(Self { binary, timeout })
    }

    /// Construct against an explicit binary path without discovery.
    /// Used by tests that stub the binary.
    #[must_use]
    pub fn with_binary(binary: PathBuf, timeout: Duration) -> Self {
        Self { binary, timeout }
    }

    /// Check that the binary answers `-version`.
    pub async fn probe(&self) -> bool {
        let mut command = Command::new(&self.binary);
        command.arg("-version").kill_on_drop(true);
        match tokio::time::timeout(self.timeout, command.output()).await {
            Ok(Ok(output)) => output.status.success(),
            Ok(Err(err)) => {
                warn!(error = %err, "ffmpeg probe failed");
                false
            }
            Err(_) => {
                warn!("ffmpeg probe timed out");
                false
            }
        }
    }
}

#[async_trait]
impl AudioTranscoder for FfmpegTranscoder {
    async fn to_audio(&self, input: &Path, output: &Path) -> TranscodeResult<()> {
        debug!(input = %input.display(), output = %output.display(), "extracting audio");
        let mut command = Command::new(&self.binary);
        command
            .arg("-y")
            .arg("-i")
            .arg(input)
            .args(["-vn", "-acodec", "libmp3lame", "-b:a", "192k"])
            .arg(output)
            .kill_on_drop(true);

        let result = tokio::time::timeout(self.timeout, command.output())
            .await
            .map_err(|_| TranscodeError::TimedOut {
                timeout: self.timeout,
            })?
            .map_err(|source| {
                // A vanished binary is a deployment problem, not a process one.
                if source.kind() == ErrorKind::NotFound {
                    TranscodeError::ToolMissing {
                        tool: FFMPEG_BINARY,
                    }
                } else {
                    TranscodeError::Spawn {
                        operation: "to_audio",
                        source,
                    }
                }
            })?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            return Err(TranscodeError::Failed {
                stderr: stderr
                    .lines()
                    .rev()
                    .find(|line| !line.trim().is_empty())
                    .unwrap_or("transcoder produced no diagnostics")
                    .trim()
                    .to_string(),
            });
        }
        Ok(())
    }
}

fn discover(override_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = override_path {
        if path.is_file() {
            return Some(path.to_path_buf());
        }
        warn!(path = %path.display(), "configured ffmpeg override does not exist");
        return None;
    }
    which::which(FFMPEG_BINARY).ok()
}

#[cfg(test)]
#[cfg(unix)]
mod tests {
    use super::*;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use tempfile::TempDir;

    fn stub_binary(dir: &TempDir, script: &str) -> PathBuf {
        let path = dir.path().join("ffmpeg");
        fs::write(&path, script).expect("write stub");
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).expect("chmod stub");
        path
    }

    #[tokio::test]
    async fn to_audio_succeeds_on_zero_exit() {
        let dir = TempDir::new().expect("tempdir");
        // The stub "converts" by touching its final argument.
        let script = "#!/bin/sh\nfor arg; do out=$arg; done\ntouch \"$out\"\n";
        let transcoder =
            FfmpegTranscoder::with_binary(stub_binary(&dir, script), Duration::from_secs(5));

        let input = dir.path().join("video.mp4");
        let output = dir.path().join("audio.mp3");
        fs::write(&input, b"fake").expect("input fixture");

        transcoder.to_audio(&input, &output).await.expect("transcode");
        assert!(output.is_file());
    }

    #[tokio::test]
    async fn to_audio_surfaces_stderr_on_failure() {
        let dir = TempDir::new().expect("tempdir");
        let script = "#!/bin/sh\necho 'Invalid data found when processing input' >&2\nexit 1\n";
        let transcoder =
            FfmpegTranscoder::with_binary(stub_binary(&dir, script), Duration::from_secs(5));

        let err = transcoder
            .to_audio(Path::new("in.mp4"), Path::new("out.mp3"))
            .await
            .unwrap_err();
        match err {
            TranscodeError::Failed { stderr } => {
                assert!(stderr.contains("Invalid data"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn vanished_binary_surfaces_as_tool_missing() {
        let dir = TempDir::new().expect("tempdir");
        let transcoder =
            FfmpegTranscoder::with_binary(dir.path().join("missing"), Duration::from_secs(1));

        let err = transcoder
            .to_audio(Path::new("in.mp4"), Path::new("out.mp3"))
            .await
            .unwrap_err();
        assert!(matches!(err, TranscodeError::ToolMissing { tool: "ffmpeg" }));
    }

    #[tokio::test]
    async fn probe_fails_for_missing_binary() {
        let dir = TempDir::new().expect("tempdir");
        let transcoder =
            FfmpegTranscoder::with_binary(dir.path().join("missing"), Duration::from_secs(1));
        assert!(!transcoder.probe().await);
    }
}
