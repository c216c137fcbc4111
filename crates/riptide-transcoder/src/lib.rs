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

//! FFmpeg wrapper for audio extraction.
//!
//! Layout: `ffmpeg.rs` (`FfmpegTranscoder` and the `AudioTranscoder`
//! trait seam), `error.rs` (structured errors).

pub mod error;
pub mod ffmpeg;

pub use error::{TranscodeError, TranscodeResult};
pub use ffmpeg::{AUDIO_EXTENSION, AudioTranscoder, FfmpegTranscoder};
