//! Prometheus-backed metrics registry and snapshot helpers.
//!
//! # Design
//! - Encapsulates collector registration to keep the public API small.
//! - Exposes the counters the riptide services care about: HTTP traffic,
//!   download outcomes, sweep activity, and external tool failures.

use anyhow::Result;
use prometheus::{Encoder, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};
use serde::Serialize;

/// Prometheus-backed metrics registry shared across services.
#[derive(Clone)]
pub struct Metrics {
    inner: std::sync::Arc<MetricsInner>,
}

struct MetricsInner {
    registry: Registry,
    http_requests_total: IntCounterVec,
    downloads_total: IntCounterVec,
    transcodes_total: IntCounterVec,
    tool_failures_total: IntCounterVec,
    sweep_removed_total: IntCounter,
}

/// Snapshot of selected counters for health reporting.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    /// Downloads that completed and produced a servable file.
    pub downloads_completed_total: u64,
    /// Downloads that failed in the extractor or transcoder.
    pub downloads_failed_total: u64,
    /// Files removed by the retention sweep since startup.
    pub sweep_removed_total: u64,
    /// External tool invocations that failed, across both tools.
    pub tool_failures_total: u64,
}

impl Metrics {
    /// Construct a new metrics registry with the standard collectors registered.
    ///
    /// # Errors
    ///
    /// Returns an error if any of the Prometheus collectors cannot be
    /// registered.
    pub fn new() -> Result<Self> {
        let registry = Registry::new();

        let http_requests_total = IntCounterVec::new(
            Opts::new("http_requests_total", "Total HTTP requests received"),
            &["route", "code"],
        )?;
        let downloads_total = IntCounterVec::new(
            Opts::new("downloads_total", "Download requests by outcome"),
            &["outcome"],
        )?;
        let transcodes_total = IntCounterVec::new(
            Opts::new("transcodes_total", "Audio transcode runs by outcome"),
            &["outcome"],
        )?;
        let tool_failures_total = IntCounterVec::new(
            Opts::new(
                "tool_failures_total",
                "External tool invocations that failed",
            ),
            &["tool"],
        )?;
        let sweep_removed_total = IntCounter::with_opts(Opts::new(
            "sweep_removed_total",
            "Files removed by the retention sweep",
        ))?;

        registry.register(Box::new(http_requests_total.clone()))?;
        registry.register(Box::new(downloads_total.clone()))?;
        registry.register(Box::new(transcodes_total.clone()))?;
        registry.register(Box::new(tool_failures_total.clone()))?;
        registry.register(Box::new(sweep_removed_total.clone()))?;

        Ok(Self {
            inner: std::sync::Arc::new(MetricsInner {
                registry,
                http_requests_total,
                downloads_total,
                transcodes_total,
                tool_failures_total,
                sweep_removed_total,
            }),
        })
    }

    /// Record a completed HTTP request for the given route and status code.
    pub fn inc_http_request(&self, route: &str, code: u16) {
        self.inner
            .http_requests_total
            .with_label_values(&[route, &code.to_string()])
            .inc();
    }

    /// Record a download that produced a servable file.
    pub fn inc_download_completed(&self) {
        self.inner
            .downloads_total
            .with_label_values(&["completed"])
            .inc();
    }

    /// Record a download that failed before a file could be served.
    pub fn inc_download_failed(&self) {
        self.inner
            .downloads_total
            .with_label_values(&["failed"])
            .inc();
    }

    /// Record an audio transcode by outcome.
    pub fn inc_transcode(&self, success: bool) {
        let outcome = if success { "completed" } else { "failed" };
        self.inner
            .transcodes_total
            .with_label_values(&[outcome])
            .inc();
    }

    /// Record a failed invocation of the named external tool.
    pub fn inc_tool_failure(&self, tool: &str) {
        self.inner
            .tool_failures_total
            .with_label_values(&[tool])
            .inc();
    }

    /// Record files removed by a retention sweep.
    pub fn add_sweep_removed(&self, count: u64) {
        self.inner.sweep_removed_total.inc_by(count);
    }

    /// Produce a snapshot of the counters surfaced through health reporting.
    #[must_use]
    pub fn snapshot(&self) -> MetricsSnapshot {
        let downloads_completed_total = self
            .inner
            .downloads_total
            .with_label_values(&["completed"])
            .get();
        let downloads_failed_total = self
            .inner
            .downloads_total
            .with_label_values(&["failed"])
            .get();
        let tool_failures_total = self
            .inner
            .tool_failures_total
            .with_label_values(&["yt-dlp"])
            .get()
            + self
                .inner
                .tool_failures_total
                .with_label_values(&["ffmpeg"])
                .get();
        MetricsSnapshot {
            downloads_completed_total,
            downloads_failed_total,
            sweep_removed_total: self.inner.sweep_removed_total.get(),
            tool_failures_total,
        }
    }

    /// Render the registry in the Prometheus text exposition format.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding the metric families fails.
    pub fn render(&self) -> Result<String> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.inner.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}
