//! Download endpoint and the file-serving route.
//!
//! # Design
//! - One metadata pass validates the content and any requested format id,
//!   then one download pass writes through a staged output template.
//! - `audio_only` downloads the best audio stream and hands it to the
//!   transcoder; the served file always carries an audio extension.
//! - The staging guard cleans up on every failure path; finalisation moves
//!   the file into the serving root under a sanitised, uid-prefixed name.

use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    Json,
    body::Body,
    extract::{Path as AxumPath, State},
    http::{StatusCode, header},
    response::Response,
};
use tokio_util::io::ReaderStream;
use tracing::{info, warn};

use riptide_api_models::{DownloadRequest, DownloadResponse};
use riptide_extractor::FormatSelector;
use riptide_filestore::FileStoreError;
use riptide_transcoder::{AUDIO_EXTENSION, TranscodeError};

use crate::http::constants::COMPONENT_TRANSCODER;
use crate::http::errors::ApiError;
use crate::http::media::{note_extractor_outcome, validate_url};
use crate::state::ApiState;

const DOWNLOAD_FILE_ROUTE: &str = "/api/download-file";

pub(crate) async fn download(
    State(state): State<Arc<ApiState>>,
    Json(body): Json<DownloadRequest>,
) -> Result<Json<DownloadResponse>, ApiError> {
    let (url, _platform) = validate_url(body.url.as_deref())?;

    // Opportunistic sweep, mirroring the periodic task. Failure here must
    // not block the download itself.
    match state.store.sweep(state.config.retention) {
        Ok(removed) => state.telemetry.add_sweep_removed(removed),
        Err(err) => warn!(error = %err, "pre-download sweep failed"),
    }

    let meta = match state.extractor.analyze(url.as_str()).await {
        Ok(meta) => {
            note_extractor_outcome(&state, &Ok(()));
            meta
        }
        Err(err) => {
            note_extractor_outcome(&state, &Err(&err));
            state.telemetry.inc_download_failed();
            return Err(ApiError::from_extraction(&err));
        }
    };

    if let Some(format_id) = &body.format_id
        && !meta.formats.iter().any(|f| &f.format_id == format_id)
    {
        state.telemetry.inc_download_failed();
        return Err(ApiError::not_found(format!("unknown format_id: {format_id}")));
    }

    let selector = match (&body.format_id, body.audio_only) {
        (Some(id), _) => FormatSelector::Id(id.clone()),
        (None, true) => FormatSelector::BestAudio,
        (None, false) => FormatSelector::Best,
    };

    let working = state.store.stage();
    let template = working.output_template();
    if let Err(err) = state
        .extractor
        .download(url.as_str(), &selector, &template)
        .await
    {
        note_extractor_outcome(&state, &Err(&err));
        state.telemetry.inc_download_failed();
        warn!(url = %url, error = %err, "download failed");
        return Err(ApiError::from_download(&err));
    }

    let source = working.locate_output().map_err(|err| {
        state.telemetry.inc_download_failed();
        warn!(error = %err, "download produced no output");
        ApiError::internal("download produced no output file")
    })?;

    let serve_source: PathBuf = if body.audio_only {
        // The extractor may already have written <uid>.mp3; the transcode
        // target must stay distinct so ffmpeg never reads its own output.
        let audio_path = working.path_for_ext(&format!("audio.{AUDIO_EXTENSION}"));
        match state.transcoder.to_audio(&source, &audio_path).await {
            Ok(()) => {
                state.telemetry.inc_transcode(true);
                state.remove_degraded_component(COMPONENT_TRANSCODER);
                audio_path
            }
            Err(err) => {
                state.telemetry.inc_transcode(false);
                state.telemetry.inc_tool_failure(COMPONENT_TRANSCODER);
                if matches!(err, TranscodeError::ToolMissing { .. }) {
                    state.add_degraded_component(COMPONENT_TRANSCODER);
                }
                state.telemetry.inc_download_failed();
                warn!(error = %err, "audio conversion failed");
                return Err(ApiError::from_transcode(&err));
            }
        }
    } else {
        source
    };

    let stored = state
        .store
        .finalize(working, &serve_source, &meta.title)
        .map_err(|err| {
            state.telemetry.inc_download_failed();
            warn!(error = %err, "failed to finalise download");
            ApiError::internal("failed to store downloaded file")
        })?;

    state.telemetry.inc_download_completed();
    info!(filename = %stored.filename, size_bytes = stored.size_bytes, "download ready");
    Ok(Json(DownloadResponse {
        download_url: format!("{DOWNLOAD_FILE_ROUTE}/{}", stored.filename),
        filename: stored.filename,
        size_bytes: stored.size_bytes,
    }))
}

pub(crate) async fn download_file(
    State(state): State<Arc<ApiState>>,
    AxumPath(filename): AxumPath<String>,
) -> Result<Response, ApiError> {
    let stored = state.store.open(&filename).map_err(|err| match err {
        FileStoreError::NotFound { filename } => {
            ApiError::not_found(format!("no such file: {filename}"))
        }
        FileStoreError::InvalidFilename { .. } => ApiError::bad_request("invalid filename"),
        other => {
            warn!(error = %other, "file lookup failed");
            ApiError::internal("file lookup failed")
        }
    })?;

    let file = tokio::fs::File::open(&stored.path)
        .await
        .map_err(|err| {
            warn!(path = %stored.path.display(), error = %err, "failed to open stored file");
            ApiError::internal("failed to open stored file")
        })?;
    let stream = ReaderStream::new(file);

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/octet-stream")
        .header(header::CONTENT_LENGTH, stored.size_bytes)
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", stored.filename),
        )
        .body(Body::from_stream(stream))
        .map_err(|err| {
            warn!(error = %err, "failed to build file response");
            ApiError::internal("failed to build file response")
        })
}
