//! Task-local request context for downstream telemetry.
//!
//! # Design
//! - Keeps request identifiers and routes in task-local storage so log
//!   statements deep in the stack can attach them without threading
//!   parameters through every call.

use std::future::Future;
use std::sync::Arc;

/// Retrieve the request identifier for the current task, if one is set.
#[must_use]
pub fn current_request_id() -> Option<String> {
    ACTIVE_REQUEST_CONTEXT
        .try_with(|ctx| ctx.request_id.as_ref().to_string())
        .ok()
}

/// Retrieve the matched route for the current task, if one is set.
#[must_use]
pub fn current_route() -> Option<String> {
    ACTIVE_REQUEST_CONTEXT
        .try_with(|ctx| ctx.route.as_ref().to_string())
        .ok()
}

/// Execute the provided future with the supplied request context available
/// to downstream telemetry.
pub async fn with_request_context<Fut, T>(
    request_id: impl Into<String>,
    route: impl Into<String>,
    fut: Fut,
) -> T
where
    Fut: Future<Output = T>,
{
    let context = RequestContext {
        request_id: Arc::from(request_id.into()),
        route: Arc::from(route.into()),
    };
    ACTIVE_REQUEST_CONTEXT.scope(context, fut).await
}

#[derive(Clone)]
struct RequestContext {
    request_id: Arc<str>,
    route: Arc<str>,
}

tokio::task_local! {
    static ACTIVE_REQUEST_CONTEXT: RequestContext;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn with_request_context_exposes_identifiers() {
        let output = with_request_context("req-42", "/api/analyze", async {
            assert_eq!(current_request_id().as_deref(), Some("req-42"));
            assert_eq!(current_route().as_deref(), Some("/api/analyze"));
            "done"
        })
        .await;
        assert_eq!(output, "done");
        assert!(current_request_id().is_none());
        assert!(current_route().is_none());
    }
}
