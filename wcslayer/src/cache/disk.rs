//! On-disk cache for raw coverage payloads.
//!
//! The disk tier stores the bytes exactly as fetched, so a later run can
//! decode them without another network round trip. Directory creation
//! and stale-file cleanup run under a dedicated lock; the file writes
//! themselves do not, so writes to unrelated paths proceed in parallel.
//! Two in-flight misses for the same request may both write the same
//! path; the write is idempotent and the content deterministic, so the
//! race is harmless.

use std::fs;
use std::path::Path;

use parking_lot::Mutex;
use thiserror::Error;
use tracing::debug;

/// Errors from disk cache writes.
///
/// Callers log these and move on; a failed cache write never fails the
/// request that produced the data.
#[derive(Debug, Error)]
pub enum DiskCacheError {
    #[error("failed to create cache directory '{path}': {source}")]
    CreateDir {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to write cache file '{path}': {source}")]
    Write {
        path: String,
        source: std::io::Error,
    },
}

/// Persists raw fetched payloads under key-derived paths.
#[derive(Debug, Default)]
pub struct DiskCache {
    /// Serializes directory creation and stale-file cleanup.
    dir_lock: Mutex<()>,
}

impl DiskCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if `path` holds a usable cached payload.
    ///
    /// Zero-length files are leftovers from interrupted writes and do
    /// not count as hits.
    pub fn has(&self, path: &Path) -> bool {
        fs::metadata(path).map(|m| m.len() > 0).unwrap_or(false)
    }

    /// Writes `data` to `path`, creating parent directories as needed.
    ///
    /// A stale zero-length file at the target is deleted first. After a
    /// successful write the file is made readable and writable for
    /// owner, group and others, so several users can share one cache
    /// directory.
    pub fn store(&self, path: &Path, data: &[u8]) -> Result<(), DiskCacheError> {
        {
            let _guard = self.dir_lock.lock();

            if let Ok(metadata) = fs::metadata(path) {
                if metadata.len() == 0 {
                    debug!(path = %path.display(), "Removing stale zero-length cache file");
                    let _ = fs::remove_file(path);
                }
            }

            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).map_err(|source| DiskCacheError::CreateDir {
                    path: parent.display().to_string(),
                    source,
                })?;
            }
        }

        fs::write(path, data).map_err(|source| DiskCacheError::Write {
            path: path.display().to_string(),
            source,
        })?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let permissions = fs::Permissions::from_mode(0o666);
            fs::set_permissions(path, permissions).map_err(|source| DiskCacheError::Write {
                path: path.display().to_string(),
                source,
            })?;
        }

        Ok(())
    }
}
