//! API error wrapper and the taxonomy-to-status mapping.
//!
//! Taxonomy: validation failures map to 400, unknown format ids to 404,
//! content the extractor rejects to 422, unusable extractor output to 502,
//! and download/transcode process failures to 500. Every error serialises
//! to the uniform `{"error": message}` body.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use riptide_api_models::ErrorBody;
use riptide_extractor::ExtractorError;
use riptide_transcoder::TranscodeError;

/// Structured API error carrying the response status and message.
#[derive(Debug)]
pub(crate) struct ApiError {
    pub(crate) status: StatusCode,
    message: String,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub(crate) fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub(crate) fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub(crate) fn unprocessable(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, message)
    }

    pub(crate) fn bad_gateway(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_GATEWAY, message)
    }

    pub(crate) fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    /// Mapping for metadata operations (analyze, formats): a rejection from
    /// the tool is the content's fault (422), everything else means the
    /// extractor itself misbehaved (502), except a missing binary which is
    /// a deployment problem (500).
    pub(crate) fn from_extraction(err: &ExtractorError) -> Self {
        match err {
            ExtractorError::Rejected { stderr } => Self::unprocessable(stderr.clone()),
            ExtractorError::ToolMissing { tool } => {
                Self::internal(format!("{tool} is not installed on the server"))
            }
            ExtractorError::TimedOut { .. } => Self::bad_gateway("extractor timed out"),
            ExtractorError::Spawn { .. }
            | ExtractorError::Parse { .. }
            | ExtractorError::Output { .. } => Self::bad_gateway("extractor failure"),
        }
    }

    /// Mapping for the download operation: every extractor failure is a
    /// download failure (500), bar the missing-binary message.
    pub(crate) fn from_download(err: &ExtractorError) -> Self {
        match err {
            ExtractorError::ToolMissing { tool } => {
                Self::internal(format!("{tool} is not installed on the server"))
            }
            ExtractorError::Rejected { stderr } => {
                Self::internal(format!("download failed: {stderr}"))
            }
            ExtractorError::TimedOut { .. } => Self::internal("download timed out"),
            ExtractorError::Spawn { .. }
            | ExtractorError::Parse { .. }
            | ExtractorError::Output { .. } => Self::internal("download failed"),
        }
    }

    /// Mapping for transcoder failures during audio extraction.
    pub(crate) fn from_transcode(err: &TranscodeError) -> Self {
        match err {
            TranscodeError::ToolMissing { tool } => {
                Self::internal(format!("{tool} is not installed on the server"))
            }
            TranscodeError::TimedOut { .. } => Self::internal("audio conversion timed out"),
            TranscodeError::Failed { stderr } => {
                Self::internal(format!("audio conversion failed: {stderr}"))
            }
            TranscodeError::Spawn { .. } => Self::internal("audio conversion failed"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorBody {
                error: self.message,
            }),
        )
            .into_response()
    }
}
