//! Analyze and formats endpoints, plus the URL validation shared with the
//! download flow.

use std::sync::Arc;

use axum::{Json, extract::State};
use tracing::warn;
use url::Url;

use riptide_api_models::{AnalyzeResponse, FormatDescriptor, FormatsResponse, UrlRequest};
use riptide_extractor::{ExtractorError, Platform};

use crate::http::constants::COMPONENT_EXTRACTOR;
use crate::http::errors::ApiError;
use crate::state::ApiState;

const UNKNOWN_TITLE: &str = "Unknown";

/// Validate the request URL: present, parseable, http(s), and on a
/// supported platform. No external process runs for invalid payloads.
pub(crate) fn validate_url(raw: Option<&str>) -> Result<(Url, Platform), ApiError> {
    let raw = raw
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| ApiError::bad_request("URL required"))?;

    let url = Url::parse(raw).map_err(|_| ApiError::bad_request("Invalid URL"))?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(ApiError::bad_request("Invalid URL"));
    }

    let platform =
        Platform::detect(&url).ok_or_else(|| ApiError::bad_request("Unsupported platform"))?;
    Ok((url, platform))
}

/// Record extractor health after a metadata call.
pub(crate) fn note_extractor_outcome(state: &ApiState, result: &Result<(), &ExtractorError>) {
    match result {
        Ok(()) => state.remove_degraded_component(COMPONENT_EXTRACTOR),
        Err(err) => {
            if !err.is_rejection() {
                state.telemetry.inc_tool_failure(COMPONENT_EXTRACTOR);
            }
            if matches!(err, ExtractorError::ToolMissing { .. }) {
                state.add_degraded_component(COMPONENT_EXTRACTOR);
            }
        }
    }
}

pub(crate) async fn analyze(
    State(state): State<Arc<ApiState>>,
    Json(body): Json<UrlRequest>,
) -> Result<Json<AnalyzeResponse>, ApiError> {
    let (url, platform) = validate_url(body.url.as_deref())?;

    let meta = match state.extractor.analyze(url.as_str()).await {
        Ok(meta) => {
            note_extractor_outcome(&state, &Ok(()));
            meta
        }
        Err(err) => {
            note_extractor_outcome(&state, &Err(&err));
            warn!(url = %url, error = %err, "analyze failed");
            return Err(ApiError::from_extraction(&err));
        }
    };

    let title = if meta.title.is_empty() {
        UNKNOWN_TITLE.to_string()
    } else {
        meta.title.clone()
    };
    Ok(Json(AnalyzeResponse {
        title,
        duration: meta.display_duration(),
        thumbnail: meta.thumbnail,
        platform,
    }))
}

pub(crate) async fn formats(
    State(state): State<Arc<ApiState>>,
    Json(body): Json<UrlRequest>,
) -> Result<Json<FormatsResponse>, ApiError> {
    let (url, _platform) = validate_url(body.url.as_deref())?;

    let raw = match state.extractor.formats(url.as_str()).await {
        Ok(raw) => {
            note_extractor_outcome(&state, &Ok(()));
            raw
        }
        Err(err) => {
            note_extractor_outcome(&state, &Err(&err));
            warn!(url = %url, error = %err, "formats listing failed");
            return Err(ApiError::from_extraction(&err));
        }
    };

    // An empty listing is a valid result, not an error.
    let formats = raw.iter().map(FormatDescriptor::from).collect();
    Ok(Json(FormatsResponse { formats }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::test_support::{
        MockBehaviour, MockExtractor, MockTranscoder, context, succeeding_context,
    };
    use axum::http::StatusCode;
    use riptide_extractor::VideoMetadata;
    use std::collections::HashSet;

    fn url_body(url: &str) -> Json<UrlRequest> {
        Json(UrlRequest {
            url: Some(url.to_string()),
        })
    }

    #[tokio::test]
    async fn analyze_returns_title_duration_and_platform() {
        let ctx = succeeding_context();
        let response = analyze(
            State(Arc::clone(&ctx.state)),
            url_body("https://www.youtube.com/watch?v=abc"),
        )
        .await
        .expect("analyze");

        assert_eq!(response.title, "Test Clip");
        assert_eq!(response.duration, "3:07");
        assert_eq!(response.platform, Platform::Youtube);
        assert!(!response.title.is_empty());
        assert!(!response.duration.is_empty());
    }

    #[tokio::test]
    async fn analyze_is_idempotent_for_fixed_content() {
        let ctx = succeeding_context();
        let first = analyze(
            State(Arc::clone(&ctx.state)),
            url_body("https://youtu.be/abc"),
        )
        .await
        .expect("first");
        let second = analyze(
            State(Arc::clone(&ctx.state)),
            url_body("https://youtu.be/abc"),
        )
        .await
        .expect("second");
        assert_eq!(first.title, second.title);
        assert_eq!(first.duration, second.duration);
    }

    #[tokio::test]
    async fn missing_url_is_400_without_invoking_extractor() {
        let ctx = succeeding_context();
        let err = analyze(State(Arc::clone(&ctx.state)), Json(UrlRequest { url: None }))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(ctx.extractor.invocation_count(), 0);
    }

    #[tokio::test]
    async fn formats_missing_url_is_400_without_invoking_extractor() {
        let ctx = succeeding_context();
        let err = formats(State(Arc::clone(&ctx.state)), Json(UrlRequest { url: None }))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(ctx.extractor.invocation_count(), 0);
    }

    #[tokio::test]
    async fn malformed_and_unsupported_urls_are_400() {
        let ctx = succeeding_context();
        for bad in ["not a url", "ftp://youtube.com/v", "https://example.com/v"] {
            let err = analyze(State(Arc::clone(&ctx.state)), url_body(bad))
                .await
                .unwrap_err();
            assert_eq!(err.status, StatusCode::BAD_REQUEST, "url: {bad}");
        }
        assert_eq!(ctx.extractor.invocation_count(), 0);
    }

    #[tokio::test]
    async fn rejected_content_maps_to_422() {
        let ctx = context(
            MockExtractor::new(MockBehaviour::Reject {
                stderr: "ERROR: Private video",
            }),
            MockTranscoder::new(),
        );
        let err = analyze(
            State(Arc::clone(&ctx.state)),
            url_body("https://youtu.be/abc"),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn broken_extractor_maps_to_502() {
        let ctx = context(
            MockExtractor::new(MockBehaviour::Break),
            MockTranscoder::new(),
        );
        let err = formats(
            State(Arc::clone(&ctx.state)),
            url_body("https://youtu.be/abc"),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn formats_returns_one_descriptor_per_format_with_unique_ids() {
        let ctx = succeeding_context();
        let response = formats(
            State(Arc::clone(&ctx.state)),
            url_body("https://youtu.be/abc"),
        )
        .await
        .expect("formats");

        assert_eq!(response.formats.len(), 2);
        let ids: HashSet<_> = response.formats.iter().map(|f| f.id.clone()).collect();
        assert_eq!(ids.len(), response.formats.len());
    }

    #[tokio::test]
    async fn empty_format_list_is_a_valid_result() {
        let mut meta = crate::http::test_support::sample_metadata();
        meta.formats.clear();
        let ctx = context(
            MockExtractor::with_metadata(MockBehaviour::Succeed { download_ext: "mp4" }, meta),
            MockTranscoder::new(),
        );
        let response = formats(
            State(Arc::clone(&ctx.state)),
            url_body("https://youtu.be/abc"),
        )
        .await
        .expect("formats");
        assert!(response.formats.is_empty());
    }

    #[tokio::test]
    async fn blank_title_falls_back_to_unknown() {
        let meta = VideoMetadata {
            title: String::new(),
            ..crate::http::test_support::sample_metadata()
        };
        let ctx = context(
            MockExtractor::with_metadata(MockBehaviour::Succeed { download_ext: "mp4" }, meta),
            MockTranscoder::new(),
        );
        let response = analyze(
            State(Arc::clone(&ctx.state)),
            url_body("https://youtu.be/abc"),
        )
        .await
        .expect("analyze");
        assert_eq!(response.title, UNKNOWN_TITLE);
    }
}
