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

//! Scratch-directory service for downloaded media files.
//!
//! Layout: `service.rs` (`FileStore`, staging guard, sweep), `model.rs`
//! (stored-file record), `error.rs` (structured errors).

pub mod error;
pub mod model;
pub mod service;

pub use error::{FileStoreError, FileStoreResult};
pub use model::StoredFile;
pub use service::{FileStore, WorkingFile, sanitize_filename};
