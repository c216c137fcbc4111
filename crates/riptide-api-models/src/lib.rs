#![forbid(unsafe_code)]
#![deny(
    warnings,
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]

//! Shared HTTP DTOs for the riptide public API.
//!
//! The conversions from extractor payloads live here so the mapping from
//! domain objects to wire shapes remains a single source of truth between
//! the server and its tests.

use serde::{Deserialize, Serialize};

use riptide_extractor::{Platform, RawFormat};

/// Uniform error body returned on every failure.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorBody {
    /// Human-readable description of the failure.
    pub error: String,
}

/// Request body shared by the analyze and formats endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct UrlRequest {
    /// Source URL to resolve through the extractor.
    #[serde(default)]
    pub url: Option<String>,
}

/// Response payload for `POST /api/analyze`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzeResponse {
    /// Video title reported by the extractor.
    pub title: String,
    /// Human-readable duration.
    pub duration: String,
    /// Thumbnail URL, when the platform provides one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    /// Detected source platform.
    pub platform: Platform,
}

/// One downloadable quality/codec option for a source URL.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormatDescriptor {
    /// Extractor-assigned format identifier.
    pub id: String,
    /// Container extension.
    pub extension: String,
    /// Resolution label, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolution: Option<String>,
    /// Size estimate in bytes, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filesize: Option<u64>,
    /// Primary codec, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub codec: Option<String>,
}

impl From<&RawFormat> for FormatDescriptor {
    fn from(raw: &RawFormat) -> Self {
        Self {
            id: raw.format_id.clone(),
            extension: raw.ext.clone(),
            resolution: raw.display_resolution(),
            filesize: raw.effective_filesize(),
            codec: raw.primary_codec(),
        }
    }
}

/// Response payload for `POST /api/formats`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormatsResponse {
    /// Format descriptors in the extractor's reported order.
    pub formats: Vec<FormatDescriptor>,
}

/// Request body for `POST /api/download`.
#[derive(Debug, Clone, Deserialize)]
pub struct DownloadRequest {
    /// Source URL to download.
    #[serde(default)]
    pub url: Option<String>,
    /// Specific format id from a previous formats listing.
    #[serde(default)]
    pub format_id: Option<String>,
    /// Extract the audio track into an audio container instead of keeping
    /// the native format.
    #[serde(default)]
    pub audio_only: bool,
}

/// Response payload for `POST /api/download`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadResponse {
    /// Relative URL the finished file can be fetched from.
    pub download_url: String,
    /// Name of the finished file.
    pub filename: String,
    /// Size of the finished file in bytes.
    pub size_bytes: u64,
}

/// Response payload for `GET /api/health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Overall service status; always `ok` while the process serves.
    pub status: String,
}

/// Per-tool component status in the full health report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthComponent {
    /// `ok` or `degraded`.
    pub status: String,
}

/// Response payload for `GET /api/health/full`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FullHealthResponse {
    /// Overall status: `ok`, or `degraded` when a tool is unavailable.
    pub status: String,
    /// Build identifier.
    pub build: String,
    /// Components currently marked degraded.
    pub degraded: Vec<String>,
    /// Extractor availability.
    pub extractor: HealthComponent,
    /// Transcoder availability.
    pub transcoder: HealthComponent,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_descriptor_maps_raw_fields() {
        let raw: RawFormat = serde_json::from_value(serde_json::json!({
            "format_id": "22",
            "ext": "mp4",
            "height": 720,
            "filesize_approx": 52_428_800u64,
            "vcodec": "avc1.64001F",
            "acodec": "mp4a.40.2"
        }))
        .expect("raw format");

        let descriptor = FormatDescriptor::from(&raw);
        assert_eq!(descriptor.id, "22");
        assert_eq!(descriptor.extension, "mp4");
        assert_eq!(descriptor.resolution.as_deref(), Some("720p"));
        assert_eq!(descriptor.filesize, Some(52_428_800));
        assert_eq!(descriptor.codec.as_deref(), Some("avc1.64001F"));
    }

    #[test]
    fn optional_descriptor_fields_are_omitted() {
        let descriptor = FormatDescriptor {
            id: "140".into(),
            extension: "m4a".into(),
            resolution: None,
            filesize: None,
            codec: None,
        };
        let json = serde_json::to_value(&descriptor).expect("serialise");
        assert_eq!(
            json,
            serde_json::json!({"id": "140", "extension": "m4a"})
        );
    }

    #[test]
    fn download_request_defaults_optional_fields() {
        let request: DownloadRequest =
            serde_json::from_str(r#"{"url": "https://youtu.be/x"}"#).expect("request");
        assert!(request.format_id.is_none());
        assert!(!request.audio_only);
    }
}
