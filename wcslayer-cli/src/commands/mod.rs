//! CLI command implementations.

pub mod cache;
pub mod fetch;

use std::path::PathBuf;

/// Default on-disk cache location, e.g. `~/.cache/wcslayer`.
pub fn default_cache_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("wcslayer")
}
