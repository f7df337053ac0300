//! Cache key derivation.
//!
//! Both cache tiers address entries through keys derived purely from the
//! request: a structured [`TextureKey`] for the in-memory tier and a
//! hierarchical file path for the disk tier. Derivation has no I/O and is
//! stable across process restarts; on-disk cache correctness depends on
//! that stability.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::coverage::{Coverage, CoverageRequest};

/// Characters that must not appear in cache path components.
const FORBIDDEN: &[char] = &['*', '.', ',', ':', '[', '|', ']', '"'];

/// Errors from key derivation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum KeyError {
    /// The request's MIME format has no known file extension. This is a
    /// configuration problem, not a runtime condition; it is never
    /// retried.
    #[error("no file extension mapped for MIME type '{0}'")]
    UnmappedMime(String),
}

/// Key for the in-memory texture cache.
///
/// A structured (source, band) pair rather than a concatenated string,
/// so distinct requests can never collide through ambiguous
/// concatenation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TextureKey {
    /// Source identifier; for pipeline entries this is the disk cache
    /// path of the request.
    pub source: String,
    /// Raster band (1-based).
    pub band: u32,
}

impl TextureKey {
    pub fn new(source: impl Into<String>, band: u32) -> Self {
        Self {
            source: source.into(),
            band,
        }
    }
}

/// Replaces characters that are unsafe in cache paths with `_`.
pub fn sanitize_identifier(id: &str) -> String {
    id.chars()
        .map(|c| if FORBIDDEN.contains(&c) { '_' } else { c })
        .collect()
}

/// Maps a response MIME type to its canonical three-letter extension.
pub fn extension_for(mime: &str) -> Result<&'static str, KeyError> {
    match mime {
        "image/tiff" => Ok("tif"),
        "image/png" => Ok("png"),
        "image/jpeg" => Ok("jpg"),
        other => Err(KeyError::UnmappedMime(other.to_string())),
    }
}

/// Derives the on-disk cache path for a request.
///
/// Layout:
///
/// ```text
/// {root}/{id}/{maxSize}px/[{year}/]{id}_Band_{band}_Layer_{layer}
///     _Bounds_{minLon}_{maxLon}_{minLat}_{maxLat}[{time}].{ext}
/// ```
///
/// where `{id}` is the sanitized coverage identifier, the year directory
/// exists only for time-varying requests, and `{time}` has `/` and `:`
/// replaced by `-`.
pub fn cache_path(
    root: &Path,
    coverage: &Coverage,
    request: &CoverageRequest,
) -> Result<PathBuf, KeyError> {
    let id = sanitize_identifier(&coverage.id);
    let extension = extension_for(request.format_or_default())?;

    let mut dir = root.join(&id).join(format!("{}px", request.max_size));
    if let Some(time) = &request.time {
        // Year subdirectory: everything before the first '-'.
        let year = time.split('-').next().unwrap_or(time);
        dir = dir.join(year);
    }

    let mut name = format!(
        "{}_Band_{}_Layer_{}_Bounds_{}_{}_{}_{}",
        id,
        request.band_or_default(),
        request.layer_or_default(),
        request.bounds.min_lon,
        request.bounds.max_lon,
        request.bounds.min_lat,
        request.bounds.max_lat,
    );
    if let Some(time) = &request.time {
        name.push_str(&time.replace(['/', ':'], "-"));
    }
    name.push('.');
    name.push_str(extension);

    Ok(dir.join(name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coverage::LonLatBounds;
    use proptest::prelude::*;

    fn test_coverage(id: &str) -> Coverage {
        Coverage {
            id: id.to_string(),
            bounds: LonLatBounds::new(-20.0, 40.0, -10.0, 50.0),
            axis_labels: ["Long".to_string(), "Lat".to_string()],
            axis_resolution: [1024, 1024],
            num_layers: 2,
        }
    }

    #[test]
    fn test_basic_layout() {
        let coverage = test_coverage("elevation");
        let mut request = CoverageRequest::new(LonLatBounds::new(-10.5, 20.0, 0.25, 30.0));
        request.max_size = 512;
        let path = cache_path(Path::new("/cache"), &coverage, &request).unwrap();
        assert_eq!(
            path,
            PathBuf::from(
                "/cache/elevation/512px/\
                 elevation_Band_1_Layer_1_Bounds_-10.5_20_0.25_30.tif"
            )
        );
    }

    #[test]
    fn test_time_adds_year_directory_and_suffix() {
        let coverage = test_coverage("sst");
        let mut request = CoverageRequest::new(LonLatBounds::new(0.0, 1.0, 0.0, 1.0));
        request.max_size = 1024;
        request.band = Some(2);
        request.layer = Some(3);
        request.time = Some("2024-01-15T12:30:00Z".to_string());
        let path = cache_path(Path::new("/cache"), &coverage, &request).unwrap();
        assert_eq!(
            path,
            PathBuf::from(
                "/cache/sst/1024px/2024/\
                 sst_Band_2_Layer_3_Bounds_0_1_0_12024-01-15T12-30-00Z.tif"
            )
        );
    }

    #[test]
    fn test_forbidden_characters_replaced() {
        let coverage = test_coverage("a.b:c|d");
        let request = CoverageRequest::new(LonLatBounds::new(0.0, 1.0, 0.0, 1.0));
        let path = cache_path(Path::new("/cache"), &coverage, &request).unwrap();
        let rendered = path.to_string_lossy();
        assert!(rendered.contains("a_b_c_d"));
    }

    #[test]
    fn test_unmapped_mime_is_an_error() {
        let coverage = test_coverage("elevation");
        let mut request = CoverageRequest::new(LonLatBounds::new(0.0, 1.0, 0.0, 1.0));
        request.format = Some("application/x-hdf".to_string());
        let err = cache_path(Path::new("/cache"), &coverage, &request).unwrap_err();
        assert_eq!(
            err,
            KeyError::UnmappedMime("application/x-hdf".to_string())
        );
    }

    #[test]
    fn test_extension_table() {
        assert_eq!(extension_for("image/tiff").unwrap(), "tif");
        assert_eq!(extension_for("image/png").unwrap(), "png");
        assert_eq!(extension_for("image/jpeg").unwrap(), "jpg");
        assert!(extension_for("application/xml").is_err());
    }

    #[test]
    fn test_texture_keys_do_not_collide_on_concatenation() {
        // "source1" + band 12 vs "source11" + band 2 would collide as
        // concatenated strings.
        let a = TextureKey::new("source1", 12);
        let b = TextureKey::new("source11", 2);
        assert_ne!(a, b);
    }

    proptest! {
        #[test]
        fn prop_sanitized_identifier_has_no_forbidden_chars(id in ".{0,64}") {
            let sanitized = sanitize_identifier(&id);
            for c in FORBIDDEN {
                prop_assert!(!sanitized.contains(*c));
            }
            prop_assert_eq!(sanitized.chars().count(), id.chars().count());
        }

        #[test]
        fn prop_cache_path_is_deterministic(
            id in "[a-zA-Z0-9.:*]{1,16}",
            band in proptest::option::of(1u32..8),
            layer in proptest::option::of(1i32..8),
            max_size in 0u32..4096,
            min_lon in -180.0f64..0.0,
            max_lon in 0.0f64..180.0,
        ) {
            let coverage = test_coverage(&id);
            let mut request = CoverageRequest::new(
                LonLatBounds::new(min_lon, max_lon, -10.0, 10.0));
            request.band = band;
            request.layer = layer;
            request.max_size = max_size;
            let first = cache_path(Path::new("/cache"), &coverage, &request).unwrap();
            let second = cache_path(Path::new("/cache"), &coverage, &request).unwrap();
            prop_assert_eq!(first, second);
        }

        #[test]
        fn prop_band_distinguishes_paths(band in 2u32..16) {
            let coverage = test_coverage("elevation");
            let base = CoverageRequest::new(LonLatBounds::new(0.0, 1.0, 0.0, 1.0));
            let mut other = base.clone();
            other.band = Some(band);
            let a = cache_path(Path::new("/cache"), &coverage, &base).unwrap();
            let b = cache_path(Path::new("/cache"), &coverage, &other).unwrap();
            prop_assert_ne!(a, b);
        }
    }
}
