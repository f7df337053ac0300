//! GetCoverage URL construction.
//!
//! The URL is built deterministically from the service, coverage metadata
//! and request. Parentheses and the subsetting-CRS URI are percent-encoded
//! up front; some servlet containers (Tomcat in particular) reject them
//! raw.

use std::fmt::Write;

use super::{Coverage, CoverageRequest, LonLatBounds, WebCoverageService};

/// Builds the GetCoverage request URL for `request` against `coverage`.
///
/// Clauses are appended in a fixed order: operation parameters, spatial
/// subsets (only when the request bounds differ from both the coverage's
/// native bounds and the whole-globe default), an aspect-preserving
/// SCALESIZE clause (only when a native axis exceeds `max_size`), the
/// temporal subset, the subsetting CRS, the output format, and the
/// clamped RANGESUBSET.
pub fn request_url(
    service: &WebCoverageService,
    coverage: &Coverage,
    request: &CoverageRequest,
) -> String {
    let mut url = String::from(service.url());
    url.push_str("&SERVICE=WCS");
    url.push_str("&VERSION=2.0.1");
    url.push_str("&REQUEST=GetCoverage");
    let _ = write!(url, "&COVERAGEID={}", coverage.id);

    if request.bounds != coverage.bounds && request.bounds != LonLatBounds::default() {
        let _ = write!(
            url,
            "&SUBSET=Lat%28{},{}%29",
            request.bounds.min_lat, request.bounds.max_lat
        );
        let _ = write!(
            url,
            "&SUBSET=Long%28{},{}%29",
            request.bounds.min_lon, request.bounds.max_lon
        );
    }

    let native_width = coverage.axis_resolution[0];
    let native_height = coverage.axis_resolution[1];

    if request.max_size > 0 && (native_width > request.max_size || native_height > request.max_size)
    {
        let (width, height) = scaled_size(native_width, native_height, request.max_size);
        let _ = write!(
            url,
            "&SCALESIZE={}%28{}%29,{}%28{}%29",
            coverage.axis_labels[0], width, coverage.axis_labels[1], height
        );
    }

    if let Some(time) = &request.time {
        let _ = write!(url, "&SUBSET=time%28%22{}%22%29", time);
    }

    url.push_str("&SUBSETTINGCRS=http%3A%2F%2Fwww.opengis.net%2Fdef%2Fcrs%2FEPSG%2F0%2F4326");

    let _ = write!(
        url,
        "&FORMAT={}",
        request.format_or_default().replace('/', "%2F")
    );

    if let Some(layer) = request.layer {
        let _ = write!(url, "&RANGESUBSET={}", layer.clamp(1, coverage.num_layers));
    }

    url
}

/// Clamps the longer native axis to `max_size` and scales the shorter
/// axis proportionally, flooring to an integer.
fn scaled_size(width: u32, height: u32, max_size: u32) -> (u32, u32) {
    let aspect = width as f64 / height as f64;
    if aspect > 1.0 {
        (max_size, (max_size as f64 / aspect) as u32)
    } else {
        ((max_size as f64 * aspect) as u32, max_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_coverage() -> Coverage {
        Coverage {
            id: "dem.elevation".to_string(),
            bounds: LonLatBounds::new(-20.0, 40.0, -10.0, 50.0),
            axis_labels: ["Long".to_string(), "Lat".to_string()],
            axis_resolution: [1024, 2048],
            num_layers: 4,
        }
    }

    fn test_service() -> WebCoverageService {
        WebCoverageService::new("https://example.com/wcs?")
    }

    #[test]
    fn test_minimal_request_url() {
        let coverage = test_coverage();
        // Native bounds: no spatial subset clause.
        let request = CoverageRequest::new(coverage.bounds);
        let url = request_url(&test_service(), &coverage, &request);
        assert_eq!(
            url,
            "https://example.com/wcs?&SERVICE=WCS&VERSION=2.0.1&REQUEST=GetCoverage\
             &COVERAGEID=dem.elevation\
             &SUBSETTINGCRS=http%3A%2F%2Fwww.opengis.net%2Fdef%2Fcrs%2FEPSG%2F0%2F4326\
             &FORMAT=image%2Ftiff"
        );
    }

    #[test]
    fn test_spatial_subset_included_when_bounds_differ() {
        let coverage = test_coverage();
        let request = CoverageRequest::new(LonLatBounds::new(-10.5, 20.0, 0.25, 30.0));
        let url = request_url(&test_service(), &coverage, &request);
        assert!(url.contains("&SUBSET=Lat%280.25,30%29"));
        assert!(url.contains("&SUBSET=Long%28-10.5,20%29"));
        // Lat clause comes before Long.
        assert!(url.find("SUBSET=Lat").unwrap() < url.find("SUBSET=Long").unwrap());
    }

    #[test]
    fn test_default_bounds_omit_spatial_subset() {
        let coverage = test_coverage();
        let request = CoverageRequest::new(LonLatBounds::default());
        let url = request_url(&test_service(), &coverage, &request);
        assert!(!url.contains("SUBSET=Lat"));
        assert!(!url.contains("SUBSET=Long"));
    }

    #[test]
    fn test_scalesize_clamps_longer_axis() {
        let coverage = test_coverage();
        let mut request = CoverageRequest::new(coverage.bounds);
        request.max_size = 512;
        let url = request_url(&test_service(), &coverage, &request);
        // 1024x2048 with max 512: height clamps to 512, width scales to 256.
        assert!(url.contains("&SCALESIZE=Long%28256%29,Lat%28512%29"));
    }

    #[test]
    fn test_scalesize_omitted_when_within_limit() {
        let coverage = test_coverage();
        let mut request = CoverageRequest::new(coverage.bounds);
        request.max_size = 4096;
        let url = request_url(&test_service(), &coverage, &request);
        assert!(!url.contains("SCALESIZE"));
    }

    #[test]
    fn test_scalesize_wide_coverage() {
        let mut coverage = test_coverage();
        coverage.axis_resolution = [2048, 1024];
        let mut request = CoverageRequest::new(coverage.bounds);
        request.max_size = 512;
        let url = request_url(&test_service(), &coverage, &request);
        assert!(url.contains("&SCALESIZE=Long%28512%29,Lat%28256%29"));
    }

    #[test]
    fn test_time_subset_quoted() {
        let coverage = test_coverage();
        let mut request = CoverageRequest::new(coverage.bounds);
        request.time = Some("2024-01-15T12:00:00Z".to_string());
        let url = request_url(&test_service(), &coverage, &request);
        assert!(url.contains("&SUBSET=time%28%222024-01-15T12:00:00Z%22%29"));
    }

    #[test]
    fn test_rangesubset_clamped_into_layer_range() {
        let coverage = test_coverage();

        let mut request = CoverageRequest::new(coverage.bounds);
        request.layer = Some(99);
        let url = request_url(&test_service(), &coverage, &request);
        assert!(url.ends_with("&RANGESUBSET=4"));

        request.layer = Some(-3);
        let url = request_url(&test_service(), &coverage, &request);
        assert!(url.ends_with("&RANGESUBSET=1"));

        request.layer = Some(2);
        let url = request_url(&test_service(), &coverage, &request);
        assert!(url.ends_with("&RANGESUBSET=2"));
    }

    #[test]
    fn test_explicit_format_is_encoded() {
        let coverage = test_coverage();
        let mut request = CoverageRequest::new(coverage.bounds);
        request.format = Some("image/png".to_string());
        let url = request_url(&test_service(), &coverage, &request);
        assert!(url.contains("&FORMAT=image%2Fpng"));
    }

    #[test]
    fn test_url_is_deterministic() {
        let coverage = test_coverage();
        let mut request = CoverageRequest::new(LonLatBounds::new(-1.0, 1.0, -2.0, 2.0));
        request.max_size = 256;
        request.time = Some("2023-06-01".to_string());
        request.layer = Some(2);
        let a = request_url(&test_service(), &coverage, &request);
        let b = request_url(&test_service(), &coverage, &request);
        assert_eq!(a, b);
    }
}
