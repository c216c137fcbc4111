//! Records describing files held in the store.

use std::path::PathBuf;

use chrono::{DateTime, Utc};

/// A finalised file available for serving until the sweep removes it.
#[derive(Debug, Clone)]
pub struct StoredFile {
    /// Name of the file relative to the store root.
    pub filename: String,
    /// Absolute path to the file on disk.
    pub path: PathBuf,
    /// Size in bytes at finalisation or lookup time.
    pub size_bytes: u64,
    /// Creation timestamp derived from filesystem metadata.
    pub created_at: DateTime<Utc>,
}
