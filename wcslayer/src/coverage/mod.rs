//! Coverage and request model for Web Coverage Services.
//!
//! A [`Coverage`] describes one remote raster dataset as advertised by a
//! WCS endpoint: identifier, native bounds, axis metadata and layer count.
//! A [`CoverageRequest`] captures everything a caller may vary per fetch
//! (bounds, band, layer, output size cap, time slice, format) and is
//! immutable once constructed; it is only ever used to derive cache keys
//! and the GetCoverage URL.

mod url;

pub use url::request_url;

/// Geographic bounding box in degrees.
///
/// The default covers the whole globe; a request carrying the default
/// bounds is treated as "no spatial subset".
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LonLatBounds {
    pub min_lon: f64,
    pub max_lon: f64,
    pub min_lat: f64,
    pub max_lat: f64,
}

impl LonLatBounds {
    pub fn new(min_lon: f64, max_lon: f64, min_lat: f64, max_lat: f64) -> Self {
        Self {
            min_lon,
            max_lon,
            min_lat,
            max_lat,
        }
    }
}

impl Default for LonLatBounds {
    fn default() -> Self {
        Self {
            min_lon: -180.0,
            max_lon: 180.0,
            min_lat: -90.0,
            max_lat: 90.0,
        }
    }
}

/// A WCS endpoint.
///
/// The base URL is expected to already carry its query prefix (for
/// example `https://host/wcs?` or `https://host/ows?map=...`); request
/// parameters are appended with `&`.
#[derive(Debug, Clone)]
pub struct WebCoverageService {
    base_url: String,
}

impl WebCoverageService {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    /// The service base URL.
    pub fn url(&self) -> &str {
        &self.base_url
    }
}

/// Metadata for one coverage offered by a service.
///
/// This is the subset of a DescribeCoverage response the pipeline needs:
/// enough to decide whether a request subsets the native extent, how to
/// phrase a SCALESIZE clause, and how far RANGESUBSET may reach.
#[derive(Debug, Clone)]
pub struct Coverage {
    /// Coverage identifier as used in COVERAGEID.
    pub id: String,
    /// Native geographic extent, degrees.
    pub bounds: LonLatBounds,
    /// Axis labels in (x, y) order, used verbatim in SCALESIZE clauses.
    pub axis_labels: [String; 2],
    /// Native raster resolution in pixels, (x, y).
    pub axis_resolution: [u32; 2],
    /// Number of selectable layers (range components).
    pub num_layers: i32,
}

/// Parameters for one coverage acquisition.
///
/// Immutable once constructed. Band defaults to 1; `max_size == 0` means
/// the output resolution is unconstrained; the format defaults to
/// `image/tiff`.
#[derive(Debug, Clone, PartialEq)]
pub struct CoverageRequest {
    /// Requested geographic extent, degrees.
    pub bounds: LonLatBounds,
    /// Raster band to decode (1-based).
    pub band: Option<u32>,
    /// Layer for the RANGESUBSET clause.
    pub layer: Option<i32>,
    /// Maximum output dimension in pixels; 0 leaves the size unconstrained.
    pub max_size: u32,
    /// Optional time slice, ISO-8601-like.
    pub time: Option<String>,
    /// Optional MIME format of the response payload.
    pub format: Option<String>,
}

impl CoverageRequest {
    pub fn new(bounds: LonLatBounds) -> Self {
        Self {
            bounds,
            band: None,
            layer: None,
            max_size: 0,
            time: None,
            format: None,
        }
    }

    /// The requested band, defaulting to 1.
    pub fn band_or_default(&self) -> u32 {
        self.band.unwrap_or(1)
    }

    /// The requested layer, defaulting to 1.
    pub fn layer_or_default(&self) -> i32 {
        self.layer.unwrap_or(1)
    }

    /// The requested MIME format, defaulting to `image/tiff`.
    pub fn format_or_default(&self) -> &str {
        self.format.as_deref().unwrap_or("image/tiff")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_bounds_cover_globe() {
        let b = LonLatBounds::default();
        assert_eq!(b.min_lon, -180.0);
        assert_eq!(b.max_lon, 180.0);
        assert_eq!(b.min_lat, -90.0);
        assert_eq!(b.max_lat, 90.0);
    }

    #[test]
    fn test_request_defaults() {
        let request = CoverageRequest::new(LonLatBounds::default());
        assert_eq!(request.band_or_default(), 1);
        assert_eq!(request.layer_or_default(), 1);
        assert_eq!(request.format_or_default(), "image/tiff");
        assert_eq!(request.max_size, 0);
        assert!(request.time.is_none());
    }

    #[test]
    fn test_request_is_value_type() {
        let mut request = CoverageRequest::new(LonLatBounds::new(1.0, 2.0, 3.0, 4.0));
        request.band = Some(3);
        let copy = request.clone();
        assert_eq!(request, copy);
    }
}
