//! Header names and component identifiers shared across the HTTP layer.

/// Request id header set and propagated by the middleware stack.
pub(crate) const HEADER_REQUEST_ID: &str = "x-request-id";

/// Health component name for the extraction backend.
pub(crate) const COMPONENT_EXTRACTOR: &str = "yt-dlp";

/// Health component name for the conversion backend.
pub(crate) const COMPONENT_TRANSCODER: &str = "ffmpeg";
