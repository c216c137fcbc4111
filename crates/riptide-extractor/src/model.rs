//! Payload models for yt-dlp `--dump-json` output.
//!
//! Fields mirror the subset of the yt-dlp info dictionary the service
//! consumes; everything else in the payload is ignored on deserialisation.

use serde::{Deserialize, Serialize};

/// Metadata for a single video as reported by yt-dlp.
#[derive(Debug, Clone, Deserialize)]
pub struct VideoMetadata {
    /// Video title; yt-dlp always emits one but it may be empty.
    #[serde(default)]
    pub title: String,
    /// Duration in seconds, when the platform reports one.
    #[serde(default)]
    pub duration: Option<f64>,
    /// Pre-rendered duration string (e.g. `3:07`), when available.
    #[serde(default)]
    pub duration_string: Option<String>,
    /// Thumbnail URL, when available.
    #[serde(default)]
    pub thumbnail: Option<String>,
    /// Canonical page URL.
    #[serde(default)]
    pub webpage_url: Option<String>,
    /// Name of the yt-dlp extractor that handled the URL.
    #[serde(default)]
    pub extractor: Option<String>,
    /// Downloadable formats in yt-dlp's reported order.
    #[serde(default)]
    pub formats: Vec<RawFormat>,
}

impl VideoMetadata {
    /// Human-readable duration: the platform string when present, else the
    /// second count, else empty.
    #[must_use]
    pub fn display_duration(&self) -> String {
        if let Some(text) = &self.duration_string
            && !text.is_empty()
        {
            return text.clone();
        }
        self.duration
            .map(|secs| format!("{secs:.0}"))
            .unwrap_or_default()
    }
}

/// One downloadable format option as reported by yt-dlp.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawFormat {
    /// yt-dlp format identifier.
    pub format_id: String,
    /// Container extension.
    #[serde(default)]
    pub ext: String,
    /// Resolution label (e.g. `1920x1080`, `audio only`).
    #[serde(default)]
    pub resolution: Option<String>,
    /// Frame height in pixels.
    #[serde(default)]
    pub height: Option<u32>,
    /// Exact file size in bytes, when known.
    #[serde(default)]
    pub filesize: Option<u64>,
    /// Approximate file size in bytes, when the exact size is unknown.
    #[serde(default)]
    pub filesize_approx: Option<u64>,
    /// Video codec, `none` for audio-only formats.
    #[serde(default)]
    pub vcodec: Option<String>,
    /// Audio codec, `none` for video-only formats.
    #[serde(default)]
    pub acodec: Option<String>,
    /// Free-form note (e.g. `720p`, `medium`).
    #[serde(default)]
    pub format_note: Option<String>,
}

impl RawFormat {
    /// Best available size estimate: exact size when known, else approximate.
    #[must_use]
    pub const fn effective_filesize(&self) -> Option<u64> {
        match self.filesize {
            Some(size) => Some(size),
            None => self.filesize_approx,
        }
    }

    /// Resolution label, synthesised from the height when yt-dlp omits one.
    #[must_use]
    pub fn display_resolution(&self) -> Option<String> {
        if let Some(label) = &self.resolution
            && !label.is_empty()
        {
            return Some(label.clone());
        }
        self.height.map(|height| format!("{height}p"))
    }

    /// Primary codec: the video codec when present, else the audio codec.
    /// `none` entries count as absent.
    #[must_use]
    pub fn primary_codec(&self) -> Option<String> {
        let pick = |codec: &Option<String>| {
            codec
                .as_deref()
                .filter(|value| !value.is_empty() && *value != "none")
                .map(ToString::to_string)
        };
        pick(&self.vcodec).or_else(|| pick(&self.acodec))
    }
}

/// Format selection passed to a download invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatSelector {
    /// Let yt-dlp pick the best muxed format.
    Best,
    /// Best audio-only stream, falling back to best muxed.
    BestAudio,
    /// A specific format id previously returned by the formats listing.
    Id(String),
}

impl FormatSelector {
    /// Render the selector as a yt-dlp `-f` argument.
    #[must_use]
    pub fn as_arg(&self) -> &str {
        match self {
            Self::Best => "best",
            Self::BestAudio => "bestaudio/best",
            Self::Id(id) => id,
        }
    }
}
