//! Shared application state threaded through the request handlers.

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, PoisonError};

use riptide_config::AppConfig;
use riptide_extractor::MediaExtractor;
use riptide_filestore::FileStore;
use riptide_telemetry::Metrics;
use riptide_transcoder::AudioTranscoder;

/// Dependencies shared by every handler.
pub struct ApiState {
    /// Resolved application configuration.
    pub config: AppConfig,
    /// Extraction backend (yt-dlp in production, mocks in tests).
    pub extractor: Arc<dyn MediaExtractor>,
    /// Conversion backend (ffmpeg in production, mocks in tests).
    pub transcoder: Arc<dyn AudioTranscoder>,
    /// Scratch-directory service for finished files.
    pub store: FileStore,
    /// Metrics registry.
    pub telemetry: Metrics,
    degraded: Mutex<BTreeSet<&'static str>>,
}

impl ApiState {
    /// Bundle the shared dependencies into handler state.
    #[must_use]
    pub fn new(
        config: AppConfig,
        extractor: Arc<dyn MediaExtractor>,
        transcoder: Arc<dyn AudioTranscoder>,
        store: FileStore,
        telemetry: Metrics,
    ) -> Self {
        Self {
            config,
            extractor,
            transcoder,
            store,
            telemetry,
            degraded: Mutex::new(BTreeSet::new()),
        }
    }

    /// Mark a component as degraded in health reporting.
    pub fn add_degraded_component(&self, component: &'static str) {
        self.degraded_guard().insert(component);
    }

    /// Clear a component's degraded marker.
    pub fn remove_degraded_component(&self, component: &'static str) {
        self.degraded_guard().remove(component);
    }

    /// Components currently marked degraded, in stable order.
    #[must_use]
    pub fn current_degraded(&self) -> Vec<String> {
        self.degraded_guard()
            .iter()
            .map(ToString::to_string)
            .collect()
    }

    /// Whether the named component is currently degraded.
    #[must_use]
    pub fn is_degraded(&self, component: &str) -> bool {
        self.degraded_guard().contains(component)
    }

    fn degraded_guard(&self) -> std::sync::MutexGuard<'_, BTreeSet<&'static str>> {
        self.degraded.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
