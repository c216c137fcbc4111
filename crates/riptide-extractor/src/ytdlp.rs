//! `YtDlpExtractor` and the `MediaExtractor` trait seam.
//!
//! # Design
//! - yt-dlp runs as an async child process; every invocation is bounded by
//!   the configured timeout and killed when the caller gives up.
//! - Metadata extraction uses `--dump-json --no-download`; downloads use a
//!   caller-supplied output template so the file store controls naming.
//! - The trait seam exists so the HTTP layer can be tested with mocks.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Output;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::error::{ExtractorError, ExtractorResult};
use crate::model::{FormatSelector, RawFormat, VideoMetadata};

const YTDLP_BINARY: &str = "yt-dlp";

/// Contract between the HTTP layer and the extraction backend.
#[async_trait]
pub trait MediaExtractor: Send + Sync {
    /// Resolve a URL into metadata without downloading anything.
    async fn analyze(&self, url: &str) -> ExtractorResult<VideoMetadata>;

    /// List the downloadable formats for a URL in the extractor's order.
    async fn formats(&self, url: &str) -> ExtractorResult<Vec<RawFormat>>;

    /// Download the selected format, writing through the supplied output
    /// template (`%(ext)s` is substituted by the extractor).
    async fn download(
        &self,
        url: &str,
        selector: &FormatSelector,
        output_template: &Path,
    ) -> ExtractorResult<()>;
}

/// Production extractor that shells out to the yt-dlp binary.
pub struct YtDlpExtractor {
    binary: PathBuf,
    timeout: Duration,
}

impl YtDlpExtractor {
    /// Locate yt-dlp and construct the extractor.
    ///
    /// Discovery order: the explicit override, then the system `PATH`.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractorError::ToolMissing`] when no binary can be found.
    pub fn new(override_path: Option<&Path>, timeout: Duration) -> ExtractorResult<Self> {
        let binary = discover(override_path).ok_or(ExtractorError::ToolMissing {
            tool: YTDLP_BINARY,
        })?;
        debug!(binary = %binary.display(), "using yt-dlp");
        Ok(Self { binary, timeout })
    }

    /// Construct against an explicit binary path without discovery.
    /// Used by tests that stub the binary.
    #[must_use]
    pub fn with_binary(binary: PathBuf, timeout: Duration) -> Self {
        Self { binary, timeout }
    }

    /// Check that the binary answers `--version`.
    pub async fn probe(&self) -> bool {
        match self.run("probe", &["--version"]).await {
            Ok(_) => true,
            Err(err) => {
                warn!(error = %err, "yt-dlp probe failed");
                false
            }
        }
    }

    async fn run(&self, operation: &'static str, args: &[&str]) -> ExtractorResult<Output> {
        let mut command = Command::new(&self.binary);
        command.args(args).kill_on_drop(true);

        let output = tokio::time::timeout(self.timeout, command.output())
            .await
            .map_err(|_| ExtractorError::TimedOut {
                timeout: self.timeout,
            })?
            .map_err(|source| {
                // A vanished binary is a deployment problem, not a process one.
                if source.kind() == ErrorKind::NotFound {
                    ExtractorError::ToolMissing {
                        tool: YTDLP_BINARY,
                    }
                } else {
                    ExtractorError::spawn(operation, source)
                }
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ExtractorError::rejected(stderr_excerpt(&stderr)));
        }
        Ok(output)
    }

    async fn dump_json(&self, url: &str) -> ExtractorResult<VideoMetadata> {
        let output = self
            .run(
                "dump_json",
                &["--dump-json", "--no-download", "--no-warnings", url],
            )
            .await?;

        let stdout = String::from_utf8(output.stdout).map_err(|_| ExtractorError::Output {
            reason: "stdout was not valid utf-8",
        })?;
        // Playlist URLs emit one JSON object per line; the first entry is
        // the one the caller asked about.
        let line = stdout
            .lines()
            .find(|line| !line.trim().is_empty())
            .ok_or(ExtractorError::Output {
                reason: "stdout was empty",
            })?;
        serde_json::from_str(line).map_err(|source| ExtractorError::Parse { source })
    }
}

#[async_trait]
impl MediaExtractor for YtDlpExtractor {
    async fn analyze(&self, url: &str) -> ExtractorResult<VideoMetadata> {
        debug!(url, "analyzing url");
        self.dump_json(url).await
    }

    async fn formats(&self, url: &str) -> ExtractorResult<Vec<RawFormat>> {
        Ok(self.dump_json(url).await?.formats)
    }

    async fn download(
        &self,
        url: &str,
        selector: &FormatSelector,
        output_template: &Path,
    ) -> ExtractorResult<()> {
        let template = output_template.to_str().ok_or(ExtractorError::Output {
            reason: "output template was not valid utf-8",
        })?;
        debug!(url, selector = selector.as_arg(), "downloading");
        self.run(
            "download",
            &[
                "-f",
                selector.as_arg(),
                "-o",
                template,
                "--no-warnings",
                "--no-playlist",
                url,
            ],
        )
        .await?;
        Ok(())
    }
}

/// Locate the yt-dlp binary: explicit override first, then `PATH`.
#[must_use]
fn discover(override_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = override_path {
        if path.is_file() {
            return Some(path.to_path_buf());
        }
        warn!(path = %path.display(), "configured yt-dlp override does not exist");
        return None;
    }
    which::which(YTDLP_BINARY).ok()
}

/// Last non-empty stderr line; yt-dlp prints its `ERROR:` summary there.
fn stderr_excerpt(stderr: &str) -> String {
    stderr
        .lines()
        .rev()
        .find(|line| !line.trim().is_empty())
        .unwrap_or("extractor produced no diagnostics")
        .trim()
        .to_string()
}
