//! `FileStore`: staged downloads, finalisation, lookup, and the
//! retention sweep.
//!
//! # Design
//! - Downloads write into a `work/` staging directory under unique
//!   8-character prefixes, so concurrent writers never collide.
//! - `WorkingFile` is a guard: dropping it removes whatever the download
//!   left behind, which covers every failure path.
//! - The sweep never touches staging entries that are still registered
//!   in-flight, so a slow download cannot be deleted mid-write.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, SystemTime};

use chrono::{DateTime, Utc};
use tracing::{info, warn};
use uuid::Uuid;
use walkdir::WalkDir;

use crate::error::{FileStoreError, FileStoreResult};
use crate::model::StoredFile;

const WORK_DIR_NAME: &str = "work";
const MAX_NAME_LEN: usize = 150;
const FALLBACK_BASENAME: &str = "download";
const FORBIDDEN: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Scratch-directory service shared across request handlers and the sweep.
#[derive(Clone)]
pub struct FileStore {
    inner: Arc<StoreInner>,
}

struct StoreInner {
    root: PathBuf,
    work_dir: PathBuf,
    in_flight: Mutex<HashSet<String>>,
}

/// Guard for one staged download. Dropping it removes any staging
/// artefacts and deregisters the download from the in-flight set.
pub struct WorkingFile {
    store: Arc<StoreInner>,
    uid: String,
}

impl FileStore {
    /// Open (creating if needed) the store rooted at `root`.
    ///
    /// # Errors
    ///
    /// Returns an error if the root or staging directory cannot be created.
    pub fn new(root: impl Into<PathBuf>) -> FileStoreResult<Self> {
        let root = root.into();
        let work_dir = root.join(WORK_DIR_NAME);
        fs::create_dir_all(&work_dir)
            .map_err(|source| FileStoreError::io("create_dirs", &work_dir, source))?;
        Ok(Self {
            inner: Arc::new(StoreInner {
                root,
                work_dir,
                in_flight: Mutex::new(HashSet::new()),
            }),
        })
    }

    /// Root directory finalised files are served from.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.inner.root
    }

    /// Allocate a staging identifier for a new download.
    #[must_use]
    pub fn stage(&self) -> WorkingFile {
        let uid = Uuid::new_v4().simple().to_string()[..8].to_string();
        self.inner
            .in_flight_guard()
            .insert(uid.clone());
        WorkingFile {
            store: Arc::clone(&self.inner),
            uid,
        }
    }

    /// Move a completed download into the serving root under a sanitised,
    /// collision-free name and release the staging guard.
    ///
    /// # Errors
    ///
    /// Returns an error if the rename or metadata lookup fails.
    pub fn finalize(
        &self,
        working: WorkingFile,
        source: &Path,
        title: &str,
    ) -> FileStoreResult<StoredFile> {
        let ext = source
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("bin");
        let mut base = sanitize_filename(title);
        if base.is_empty() {
            base = FALLBACK_BASENAME.to_string();
        }
        let filename = format!("{}_{base}.{ext}", working.uid());
        let dest = self.inner.root.join(&filename);

        fs::rename(source, &dest)
            .map_err(|source| FileStoreError::io("finalize_rename", &dest, source))?;
        let metadata =
            fs::metadata(&dest).map_err(|source| FileStoreError::io("finalize_stat", &dest, source))?;
        drop(working);

        info!(filename, size_bytes = metadata.len(), "file finalised");
        Ok(StoredFile {
            filename,
            path: dest,
            size_bytes: metadata.len(),
            created_at: Utc::now(),
        })
    }

    /// Look up a finalised file by name for serving.
    ///
    /// # Errors
    ///
    /// Returns [`FileStoreError::InvalidFilename`] for names that are not in
    /// canonical sanitised form (path separators, traversal, forbidden
    /// characters) and [`FileStoreError::NotFound`] when no such file exists.
    pub fn open(&self, filename: &str) -> FileStoreResult<StoredFile> {
        if filename.is_empty() {
            return Err(FileStoreError::InvalidFilename {
                value: filename.to_string(),
                reason: "empty name",
            });
        }
        if sanitize_filename(filename) != filename || filename.contains("..") {
            return Err(FileStoreError::InvalidFilename {
                value: filename.to_string(),
                reason: "name is not in canonical form",
            });
        }

        let path = self.inner.root.join(filename);
        if !path.is_file() {
            return Err(FileStoreError::NotFound {
                filename: filename.to_string(),
            });
        }
        let metadata =
            fs::metadata(&path).map_err(|source| FileStoreError::io("open_stat", &path, source))?;
        let created_at = metadata
            .modified()
            .map_or_else(|_| Utc::now(), DateTime::<Utc>::from);
        Ok(StoredFile {
            filename: filename.to_string(),
            path,
            size_bytes: metadata.len(),
            created_at,
        })
    }

    /// Remove files whose age exceeds the retention window. Staging entries
    /// still registered in-flight are skipped. Returns the number of files
    /// removed.
    ///
    /// # Errors
    ///
    /// Returns an error only when the store directories cannot be read;
    /// individual remove failures are logged and skipped.
    pub fn sweep(&self, retention: Duration) -> FileStoreResult<u64> {
        let now = SystemTime::now();
        let mut removed = 0;

        removed += self.sweep_dir(&self.inner.root, now, retention, false)?;
        removed += self.sweep_dir(&self.inner.work_dir, now, retention, true)?;

        if removed > 0 {
            info!(removed, "retention sweep removed files");
        }
        Ok(removed)
    }

    fn sweep_dir(
        &self,
        dir: &Path,
        now: SystemTime,
        retention: Duration,
        staging: bool,
    ) -> FileStoreResult<u64> {
        let mut removed = 0;
        for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
            let entry = entry.map_err(|err| FileStoreError::Io {
                operation: "sweep_walk",
                path: dir.to_path_buf(),
                source: err
                    .into_io_error()
                    .unwrap_or_else(|| std::io::Error::other("walkdir loop")),
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            if staging && self.is_in_flight(entry.file_name().to_string_lossy().as_ref()) {
                continue;
            }
            let Ok(metadata) = entry.metadata() else {
                continue;
            };
            let Ok(modified) = metadata.modified() else {
                continue;
            };
            let age = now.duration_since(modified).unwrap_or(Duration::ZERO);
            if age <= retention {
                continue;
            }
            match fs::remove_file(entry.path()) {
                Ok(()) => {
                    removed += 1;
                    info!(path = %entry.path().display(), age_secs = age.as_secs(), "swept file");
                }
                Err(err) => {
                    warn!(path = %entry.path().display(), error = %err, "sweep failed to remove file");
                }
            }
        }
        Ok(removed)
    }

    fn is_in_flight(&self, staging_name: &str) -> bool {
        let uid = staging_name.split('.').next().unwrap_or(staging_name);
        self.inner.in_flight_guard().contains(uid)
    }
}

impl StoreInner {
    fn in_flight_guard(&self) -> std::sync::MutexGuard<'_, HashSet<String>> {
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl WorkingFile {
    /// Staging identifier prefixed to every file this download produces.
    #[must_use]
    pub fn uid(&self) -> &str {
        &self.uid
    }

    /// Output template handed to the extractor; `%(ext)s` is substituted
    /// by yt-dlp.
    #[must_use]
    pub fn output_template(&self) -> PathBuf {
        self.store.work_dir.join(format!("{}.%(ext)s", self.uid))
    }

    /// Staging path for a sibling artefact with the given extension (used
    /// by the transcoder for its audio output).
    #[must_use]
    pub fn path_for_ext(&self, ext: &str) -> PathBuf {
        self.store.work_dir.join(format!("{}.{ext}", self.uid))
    }

    /// Locate the file the extractor produced under this staging prefix.
    ///
    /// # Errors
    ///
    /// Returns [`FileStoreError::MissingOutput`] when nothing usable was
    /// written (partial `.part` files and unsubstituted templates do not
    /// count).
    pub fn locate_output(&self) -> FileStoreResult<PathBuf> {
        let prefix = format!("{}.", self.uid);
        let entries = fs::read_dir(&self.store.work_dir).map_err(|source| {
            FileStoreError::io("locate_output", &self.store.work_dir, source)
        })?;
        for entry in entries.flatten() {
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            if name.starts_with(&prefix) && !name.ends_with(".part") && !name.contains("%(") {
                return Ok(entry.path());
            }
        }
        Err(FileStoreError::MissingOutput {
            uid: self.uid.clone(),
        })
    }
}

impl Drop for WorkingFile {
    fn drop(&mut self) {
        let prefix = format!("{}.", self.uid);
        if let Ok(entries) = fs::read_dir(&self.store.work_dir) {
            for entry in entries.flatten() {
                if entry
                    .file_name()
                    .to_str()
                    .is_some_and(|name| name.starts_with(&prefix))
                {
                    if let Err(err) = fs::remove_file(entry.path()) {
                        warn!(path = %entry.path().display(), error = %err, "failed to clean staging file");
                    }
                }
            }
        }
        self.store.in_flight_guard().remove(&self.uid);
    }
}

/// Strip characters that are unsafe in served filenames, collapse
/// whitespace runs, and cap the length.
#[must_use]
pub fn sanitize_filename(name: &str) -> String {
    let stripped: String = name
        .chars()
        .filter(|ch| !FORBIDDEN.contains(ch) && !ch.is_control())
        .collect();
    let collapsed = stripped.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed.chars().take(MAX_NAME_LEN).collect()
}
