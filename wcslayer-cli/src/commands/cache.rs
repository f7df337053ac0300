//! Cache management CLI commands.

use std::fs;
use std::path::{Path, PathBuf};

use clap::Subcommand;

use crate::error::CliError;

/// Cache action subcommands.
#[derive(Debug, Subcommand)]
pub enum CacheAction {
    /// Show cache location, entry count and total size
    Info,
    /// Delete all cached coverage payloads
    Clear,
}

/// Run a cache subcommand against `cache_dir`.
pub fn run(action: CacheAction, cache_dir: &Path) -> Result<(), CliError> {
    match action {
        CacheAction::Info => {
            let (files, bytes) = measure(cache_dir).map_err(|source| CliError::CacheInspect {
                path: cache_dir.display().to_string(),
                source,
            })?;
            println!("Cache directory: {}", cache_dir.display());
            println!("  Entries: {}", files);
            println!("  Size:    {}", format_size(bytes));
            Ok(())
        }
        CacheAction::Clear => {
            println!("Clearing cache at: {}", cache_dir.display());
            let (files, bytes) = measure(cache_dir).unwrap_or((0, 0));
            clear(cache_dir).map_err(|source| CliError::CacheClear {
                path: cache_dir.display().to_string(),
                source,
            })?;
            println!("Deleted {} files, freed {}", files, format_size(bytes));
            Ok(())
        }
    }
}

/// Recursively counts files and sums their sizes.
fn measure(dir: &Path) -> Result<(u64, u64), std::io::Error> {
    if !dir.exists() {
        return Ok((0, 0));
    }
    let mut files = 0u64;
    let mut bytes = 0u64;
    let mut pending: Vec<PathBuf> = vec![dir.to_path_buf()];
    while let Some(current) = pending.pop() {
        for entry in fs::read_dir(&current)? {
            let entry = entry?;
            let metadata = entry.metadata()?;
            if metadata.is_dir() {
                pending.push(entry.path());
            } else {
                files += 1;
                bytes += metadata.len();
            }
        }
    }
    Ok((files, bytes))
}

/// Removes the cache contents but keeps the directory itself.
fn clear(dir: &Path) -> Result<(), std::io::Error> {
    if !dir.exists() {
        return Ok(());
    }
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if entry.metadata()?.is_dir() {
            fs::remove_dir_all(entry.path())?;
        } else {
            fs::remove_file(entry.path())?;
        }
    }
    Ok(())
}

fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KiB", "MiB", "GiB"];
    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} {}", bytes, UNITS[0])
    } else {
        format!("{:.1} {}", size, UNITS[unit])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size_units() {
        assert_eq!(format_size(0), "0 B");
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(2048), "2.0 KiB");
        assert_eq!(format_size(3 * 1024 * 1024), "3.0 MiB");
    }

    #[test]
    fn test_measure_counts_nested_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("a/b")).unwrap();
        fs::write(dir.path().join("a/one.tif"), [0u8; 10]).unwrap();
        fs::write(dir.path().join("a/b/two.tif"), [0u8; 30]).unwrap();

        let (files, bytes) = measure(dir.path()).unwrap();
        assert_eq!(files, 2);
        assert_eq!(bytes, 40);
    }

    #[test]
    fn test_measure_missing_directory_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nothing_here");
        assert_eq!(measure(&missing).unwrap(), (0, 0));
    }

    #[test]
    fn test_clear_empties_but_keeps_root() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("coverage/512px")).unwrap();
        fs::write(dir.path().join("coverage/512px/x.tif"), [1u8; 4]).unwrap();
        fs::write(dir.path().join("stray.tif"), [1u8; 4]).unwrap();

        clear(dir.path()).unwrap();
        assert!(dir.path().exists());
        assert_eq!(measure(dir.path()).unwrap(), (0, 0));
    }
}
