//! Health and diagnostics endpoints.

use std::sync::Arc;

use axum::{Json, body::Body, extract::State, http::StatusCode, response::Response};
use riptide_telemetry::build_sha;
use tracing::error;

use riptide_api_models::{FullHealthResponse, HealthComponent, HealthResponse};

use crate::http::constants::{COMPONENT_EXTRACTOR, COMPONENT_TRANSCODER};
use crate::http::errors::ApiError;
use crate::state::ApiState;

const STATUS_OK: &str = "ok";
const STATUS_DEGRADED: &str = "degraded";

/// Liveness probe: the process is serving, nothing else is checked.
#[allow(clippy::unused_async)]
pub(crate) async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: STATUS_OK.to_string(),
    })
}

fn component_status(state: &ApiState, component: &str) -> HealthComponent {
    let status = if state.is_degraded(component) {
        STATUS_DEGRADED
    } else {
        STATUS_OK
    };
    HealthComponent {
        status: status.to_string(),
    }
}

#[allow(clippy::unused_async)]
pub(crate) async fn health_full(State(state): State<Arc<ApiState>>) -> Json<FullHealthResponse> {
    let degraded = state.current_degraded();
    let status = if degraded.is_empty() {
        STATUS_OK
    } else {
        STATUS_DEGRADED
    };
    Json(FullHealthResponse {
        status: status.to_string(),
        build: build_sha().to_string(),
        degraded,
        extractor: component_status(&state, COMPONENT_EXTRACTOR),
        transcoder: component_status(&state, COMPONENT_TRANSCODER),
    })
}

#[allow(clippy::unused_async)]
pub(crate) async fn metrics(State(state): State<Arc<ApiState>>) -> Result<Response, ApiError> {
    match state.telemetry.render() {
        Ok(body) => Response::builder()
            .status(StatusCode::OK)
            .header(
                axum::http::header::CONTENT_TYPE,
                "text/plain; version=0.0.4",
            )
            .body(Body::from(body))
            .map_err(|err| {
                error!(error = %err, "failed to build metrics response");
                ApiError::internal("failed to build metrics response")
            }),
        Err(err) => {
            error!(error = %err, "failed to render metrics");
            Err(ApiError::internal("failed to render metrics"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::constants::COMPONENT_TRANSCODER;
    use crate::http::test_support::succeeding_context;

    #[tokio::test]
    async fn health_reports_exactly_ok() {
        let response = health().await;
        let json = serde_json::to_value(&response.0).expect("serialise");
        assert_eq!(json, serde_json::json!({"status": "ok"}));
    }

    #[tokio::test]
    async fn full_health_flips_to_degraded_with_the_component() {
        let ctx = succeeding_context();
        let response = health_full(State(Arc::clone(&ctx.state))).await;
        assert_eq!(response.status, "ok");
        assert!(response.degraded.is_empty());
        assert_eq!(response.transcoder.status, "ok");

        ctx.state.add_degraded_component(COMPONENT_TRANSCODER);
        let response = health_full(State(Arc::clone(&ctx.state))).await;
        assert_eq!(response.status, "degraded");
        assert_eq!(response.degraded, vec!["ffmpeg".to_string()]);
        assert_eq!(response.transcoder.status, "degraded");
        assert_eq!(response.extractor.status, "ok");
    }

    #[tokio::test]
    async fn metrics_renders_prometheus_text() {
        let ctx = succeeding_context();
        ctx.state.telemetry.inc_http_request("/api/health", 200);
        let response = metrics(State(Arc::clone(&ctx.state))).await.expect("metrics");
        assert_eq!(response.status(), StatusCode::OK);
        let content_type = response
            .headers()
            .get(axum::http::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default();
        assert!(content_type.starts_with("text/plain"));
    }
}
