//! Errors surfaced while decoding and warping source datasets.

use gdal::errors::GdalError;
use thiserror::Error;

/// Failures to turn a dataset into a texture.
///
/// Each variant is surfaced to the caller; a failed decode is never
/// silently replaced by a default image.
#[derive(Debug, Error)]
pub enum ReadError {
    /// The source could not be opened as a raster dataset.
    #[error("failed to open dataset '{source_name}': {source}")]
    OpenFailed {
        source_name: String,
        #[source]
        source: GdalError,
    },

    /// The source carries no spatial-reference metadata, so it cannot
    /// be warped.
    #[error("no projection defined for '{0}'")]
    NoProjection(String),

    /// The requested band does not exist in the source.
    #[error("band {band} out of range; dataset has {available} band(s)")]
    BandOutOfRange { band: usize, available: usize },

    /// The source stores a pixel type the texture pipeline cannot
    /// represent.
    #[error("unsupported pixel type {0}")]
    UnsupportedPixelType(String),

    /// Any other failure inside the raster library.
    #[error(transparent)]
    Gdal(#[from] GdalError),
}
