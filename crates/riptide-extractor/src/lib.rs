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

//! yt-dlp wrapper: binary discovery, async invocation, and JSON parsing.
//!
//! Layout: `model.rs` (yt-dlp payload models), `platform.rs` (supported
//! platform table), `ytdlp.rs` (`YtDlpExtractor` and the `MediaExtractor`
//! trait seam), `error.rs` (structured errors).

pub mod error;
pub mod model;
pub mod platform;
pub mod ytdlp;

pub use error::{ExtractorError, ExtractorResult};
pub use model::{FormatSelector, RawFormat, VideoMetadata};
pub use platform::Platform;
pub use ytdlp::{MediaExtractor, YtDlpExtractor};
