//! Mock backends and state fixtures shared by the handler tests.

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tempfile::TempDir;

use riptide_config::AppConfig;
use riptide_extractor::{
    ExtractorError, ExtractorResult, FormatSelector, MediaExtractor, RawFormat, VideoMetadata,
};
use riptide_filestore::FileStore;
use riptide_telemetry::Metrics;
use riptide_transcoder::{AudioTranscoder, TranscodeError, TranscodeResult};

use crate::state::ApiState;

/// How the mock extractor should behave.
#[derive(Clone)]
pub(crate) enum MockBehaviour {
    /// Return the canned metadata; downloads write a file with this extension.
    Succeed { download_ext: &'static str },
    /// Fail as if yt-dlp rejected the content.
    Reject { stderr: &'static str },
    /// Fail as if the process produced unusable output.
    Break,
}

pub(crate) struct MockExtractor {
    behaviour: MockBehaviour,
    meta: VideoMetadata,
    pub(crate) invocations: AtomicUsize,
}

impl MockExtractor {
    pub(crate) fn new(behaviour: MockBehaviour) -> Self {
        Self {
            behaviour,
            meta: sample_metadata(),
            invocations: AtomicUsize::new(0),
        }
    }

    pub(crate) fn with_metadata(behaviour: MockBehaviour, meta: VideoMetadata) -> Self {
        Self {
            behaviour,
            meta,
            invocations: AtomicUsize::new(0),
        }
    }

    pub(crate) fn invocation_count(&self) -> usize {
        self.invocations.load(Ordering::SeqCst)
    }

    fn check(&self) -> ExtractorResult<()> {
        self.invocations.fetch_add(1, Ordering::SeqCst);
        match &self.behaviour {
            MockBehaviour::Succeed { .. } => Ok(()),
            MockBehaviour::Reject { stderr } => Err(ExtractorError::Rejected {
                stderr: (*stderr).to_string(),
            }),
            MockBehaviour::Break => Err(ExtractorError::Output {
                reason: "stdout was empty",
            }),
        }
    }
}

#[async_trait]
impl MediaExtractor for MockExtractor {
    async fn analyze(&self, _url: &str) -> ExtractorResult<VideoMetadata> {
        self.check()?;
        Ok(self.meta.clone())
    }

    async fn formats(&self, _url: &str) -> ExtractorResult<Vec<RawFormat>> {
        self.check()?;
        Ok(self.meta.formats.clone())
    }

    async fn download(
        &self,
        _url: &str,
        _selector: &FormatSelector,
        output_template: &Path,
    ) -> ExtractorResult<()> {
        self.check()?;
        let MockBehaviour::Succeed { download_ext } = &self.behaviour else {
            unreachable!("check already failed")
        };
        let template = output_template.to_string_lossy().to_string();
        let target = template.replace("%(ext)s", download_ext);
        std::fs::write(&target, b"downloaded media").map_err(|source| ExtractorError::Spawn {
            operation: "mock_write",
            source,
        })?;
        Ok(())
    }
}

pub(crate) struct MockTranscoder {
    fail: bool,
    pub(crate) invocations: AtomicUsize,
}

impl MockTranscoder {
    pub(crate) fn new() -> Self {
        Self {
            fail: false,
            invocations: AtomicUsize::new(0),
        }
    }

    pub(crate) fn failing() -> Self {
        Self {
            fail: true,
            invocations: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl AudioTranscoder for MockTranscoder {
    async fn to_audio(&self, input: &Path, output: &Path) -> TranscodeResult<()> {
        self.invocations.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(TranscodeError::Failed {
                stderr: "Invalid data found when processing input".to_string(),
            });
        }
        std::fs::copy(input, output).map_err(|source| TranscodeError::Spawn {
            operation: "mock_copy",
            source,
        })?;
        Ok(())
    }
}

/// Canned yt-dlp-shaped metadata with one audio and one video format.
pub(crate) fn sample_metadata() -> VideoMetadata {
    VideoMetadata {
        title: "Test Clip".to_string(),
        duration: Some(187.0),
        duration_string: Some("3:07".to_string()),
        thumbnail: Some("https://i.example/t.jpg".to_string()),
        webpage_url: Some("https://www.youtube.com/watch?v=abc".to_string()),
        extractor: Some("youtube".to_string()),
        formats: vec![
            RawFormat {
                format_id: "140".to_string(),
                ext: "m4a".to_string(),
                resolution: Some("audio only".to_string()),
                height: None,
                filesize: Some(3_145_728),
                filesize_approx: None,
                vcodec: Some("none".to_string()),
                acodec: Some("mp4a.40.2".to_string()),
                format_note: Some("medium".to_string()),
            },
            RawFormat {
                format_id: "22".to_string(),
                ext: "mp4".to_string(),
                resolution: None,
                height: Some(720),
                filesize: None,
                filesize_approx: Some(52_428_800),
                vcodec: Some("avc1.64001F".to_string()),
                acodec: Some("mp4a.40.2".to_string()),
                format_note: Some("720p".to_string()),
            },
        ],
    }
}

/// Handler state wired against mocks and a temp-dir file store.
pub(crate) struct TestContext {
    pub(crate) state: Arc<ApiState>,
    pub(crate) extractor: Arc<MockExtractor>,
    pub(crate) transcoder: Arc<MockTranscoder>,
    _tmp: TempDir,
}

pub(crate) fn context(extractor: MockExtractor, transcoder: MockTranscoder) -> TestContext {
    let tmp = TempDir::new().expect("tempdir");
    let store = FileStore::new(tmp.path().join("downloads")).expect("store");
    let extractor = Arc::new(extractor);
    let transcoder = Arc::new(transcoder);
    let state = Arc::new(ApiState::new(
        AppConfig::default(),
        Arc::clone(&extractor) as Arc<dyn MediaExtractor>,
        Arc::clone(&transcoder) as Arc<dyn AudioTranscoder>,
        store,
        Metrics::new().expect("metrics"),
    ));
    TestContext {
        state,
        extractor,
        transcoder,
        _tmp: tmp,
    }
}

pub(crate) fn succeeding_context() -> TestContext {
    context(
        MockExtractor::new(MockBehaviour::Succeed { download_ext: "mp4" }),
        MockTranscoder::new(),
    )
}
