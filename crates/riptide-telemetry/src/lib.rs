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

//! Logging and metrics plumbing shared by the riptide services.
//!
//! Layout: `init.rs` (tracing subscriber setup), `metrics.rs` (prometheus
//! registry), `layers.rs` (request-id tower layers), `context.rs`
//! (task-local request context).

pub mod context;
pub mod init;
pub mod layers;
pub mod metrics;

pub use context::{current_request_id, current_route, with_request_context};
pub use init::{DEFAULT_LOG_LEVEL, LogFormat, LoggingConfig, build_sha, init_logging};
pub use layers::{propagate_request_id_layer, set_request_id_layer};
pub use metrics::{Metrics, MetricsSnapshot};
