//! Decoding and reprojection of coverage payloads.
//!
//! [`build`] turns a source dataset (a file on disk or a raw byte
//! payload) into a [`Texture`]: it opens the dataset through GDAL,
//! validates projection and band, reads the band's value range, warps a
//! single band into a WGS84 in-memory dataset, and hands the typed
//! samples to the texture codec. The warp is CPU-bound and synchronous;
//! callers run it on worker threads.
//!
//! Byte payloads are presented to GDAL as `/vsimem/` virtual files with
//! unique names, unlinked when the guard drops, so concurrent decodes
//! never collide.

mod error;

pub use error::ReadError;

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

use gdal::raster::{reproject, GdalDataType, GdalType};
use gdal::spatial_ref::{AxisMappingStrategy, CoordTransform, SpatialRef};
use gdal::{Dataset, DriverManager, GeoTransform};
use tracing::debug;

use crate::texture::{RadianBounds, SampleBuffer, Texture};

/// A raster source the reprojector can open.
#[derive(Debug, Clone)]
pub enum DatasetSource {
    /// A dataset on the filesystem (typically a disk-cache entry).
    Path(PathBuf),
    /// A raw payload straight from the network.
    Bytes(Vec<u8>),
}

impl DatasetSource {
    /// Short description for logs and error messages.
    fn describe(&self) -> String {
        match self {
            DatasetSource::Path(path) => path.display().to_string(),
            DatasetSource::Bytes(bytes) => format!("<{} in-memory bytes>", bytes.len()),
        }
    }
}

/// Monotonic id for `/vsimem/` file names.
static NEXT_VSI_ID: AtomicU64 = AtomicU64::new(0);

/// Virtual in-memory file, unlinked on drop.
struct VsiMemFile {
    path: String,
}

impl VsiMemFile {
    fn register(bytes: &[u8]) -> Result<Self, gdal::errors::GdalError> {
        let path = format!(
            "/vsimem/wcslayer/{}",
            NEXT_VSI_ID.fetch_add(1, Ordering::Relaxed)
        );
        gdal::vsi::create_mem_file(&path, bytes.to_vec())?;
        Ok(Self { path })
    }
}

impl Drop for VsiMemFile {
    fn drop(&mut self) {
        let _ = gdal::vsi::unlink_mem_file(&self.path);
    }
}

/// An opened dataset plus the virtual file keeping its bytes alive.
struct OpenedSource {
    dataset: Dataset,
    _vsi: Option<VsiMemFile>,
}

fn open_source(source: &DatasetSource) -> Result<OpenedSource, ReadError> {
    match source {
        DatasetSource::Path(path) => {
            let dataset = Dataset::open(path).map_err(|e| ReadError::OpenFailed {
                source_name: source.describe(),
                source: e,
            })?;
            Ok(OpenedSource {
                dataset,
                _vsi: None,
            })
        }
        DatasetSource::Bytes(bytes) => {
            let vsi = VsiMemFile::register(bytes).map_err(|e| ReadError::OpenFailed {
                source_name: source.describe(),
                source: e,
            })?;
            let dataset = Dataset::open(&vsi.path).map_err(|e| ReadError::OpenFailed {
                source_name: source.describe(),
                source: e,
            })?;
            Ok(OpenedSource {
                dataset,
                _vsi: Some(vsi),
            })
        }
    }
}

/// Number of bands in a source dataset.
pub fn band_count(source: &DatasetSource) -> Result<usize, ReadError> {
    let opened = open_source(source)?;
    Ok(opened.dataset.raster_count())
}

/// Decodes one band of a source into a WGS84 texture.
///
/// `band` is 1-based. Fails with [`ReadError::NoProjection`] for sources
/// without spatial-reference metadata and [`ReadError::BandOutOfRange`]
/// for bands the source does not have.
pub fn build(source: &DatasetSource, band: usize) -> Result<Texture, ReadError> {
    let opened = open_source(source)?;
    let dataset = &opened.dataset;

    let projection = dataset.projection();
    if projection.is_empty() {
        return Err(ReadError::NoProjection(source.describe()));
    }

    let available = dataset.raster_count();
    if band == 0 || band > available {
        return Err(ReadError::BandOutOfRange { band, available });
    }

    // Value range of the source band. GDAL consults embedded statistics
    // first and falls back to scanning the band.
    let src_band = dataset.rasterband(band)?;
    let min_max = src_band.compute_raster_min_max(true)?;
    let value_range = (min_max.min, min_max.max);
    let pixel_type = src_band.band_type();

    let mut wgs84 = SpatialRef::from_epsg(4326)?;
    wgs84.set_axis_mapping_strategy(AxisMappingStrategy::TraditionalGisOrder);
    let wgs84_wkt = wgs84.to_wkt()?;

    // Suggested warp output: transform the source extent into WGS84 and
    // pick a square pixel size preserving the source's mean per-axis
    // resolution.
    let (src_width, src_height) = dataset.raster_size();
    let extent = geographic_extent(dataset, &projection, &wgs84)?;
    let extent_lon = extent[2] - extent[0];
    let extent_lat = extent[3] - extent[1];
    let pixel_size =
        0.5 * (extent_lon / src_width as f64 + extent_lat / src_height as f64);
    let width = ((extent_lon / pixel_size).round() as usize).max(1);
    let height = ((extent_lat / pixel_size).round() as usize).max(1);
    let dst_transform: GeoTransform = [extent[0], pixel_size, 0.0, extent[3], 0.0, -pixel_size];

    debug!(
        source = %source.describe(),
        band,
        width,
        height,
        "Warping coverage band to WGS84"
    );

    let samples = warp_band(
        dataset,
        band,
        width,
        height,
        &dst_transform,
        &wgs84_wkt,
        pixel_type,
    )?;
    let (data, kind) = samples.into_texels();

    // Extent of the warped raster, from the destination transform
    // applied to the corner pixels, converted to radians.
    let bounds = RadianBounds {
        west: dst_transform[0].to_radians(),
        north: dst_transform[3].to_radians(),
        east: (dst_transform[0] + width as f64 * dst_transform[1]).to_radians(),
        south: (dst_transform[3] + height as f64 * dst_transform[5]).to_radians(),
    };

    Ok(Texture {
        data,
        width,
        height,
        kind,
        normalization_max: kind.normalization_max(),
        value_range,
        bounds,
        bands: available,
    })
}

/// Source extent in WGS84 degrees as `[min_lon, min_lat, max_lon, max_lat]`.
fn geographic_extent(
    dataset: &Dataset,
    projection: &str,
    wgs84: &SpatialRef,
) -> Result<[f64; 4], ReadError> {
    let transform = dataset.geo_transform()?;
    let (width, height) = dataset.raster_size();

    let native_min_x = transform[0];
    let native_max_x = transform[0] + width as f64 * transform[1];
    let native_max_y = transform[3];
    let native_min_y = transform[3] + height as f64 * transform[5];

    let source_srs = SpatialRef::from_wkt(projection)?;
    if source_srs.is_geographic() {
        return Ok([native_min_x, native_min_y, native_max_x, native_max_y]);
    }

    let corner_transform = CoordTransform::new(&source_srs, wgs84)?;
    let mut xs = vec![native_min_x, native_max_x, native_min_x, native_max_x];
    let mut ys = vec![native_min_y, native_min_y, native_max_y, native_max_y];
    corner_transform.transform_coords(&mut xs, &mut ys, &mut [])?;

    let min_lon = xs.iter().cloned().fold(f64::INFINITY, f64::min);
    let max_lon = xs.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let min_lat = ys.iter().cloned().fold(f64::INFINITY, f64::min);
    let max_lat = ys.iter().cloned().fold(f64::NEG_INFINITY, f64::max);

    Ok([min_lon, min_lat, max_lon, max_lat])
}

/// Warps the dataset into an in-memory WGS84 target and reads `band`
/// in its native pixel type.
fn warp_band(
    src: &Dataset,
    band: usize,
    width: usize,
    height: usize,
    transform: &GeoTransform,
    wgs84_wkt: &str,
    pixel_type: GdalDataType,
) -> Result<SampleBuffer, ReadError> {
    match pixel_type {
        GdalDataType::UInt8 => Ok(SampleBuffer::UInt8(warp_typed::<u8>(
            src, band, width, height, transform, wgs84_wkt,
        )?)),
        GdalDataType::UInt16 => Ok(SampleBuffer::UInt16(warp_typed::<u16>(
            src, band, width, height, transform, wgs84_wkt,
        )?)),
        GdalDataType::Int16 => Ok(SampleBuffer::Int16(warp_typed::<i16>(
            src, band, width, height, transform, wgs84_wkt,
        )?)),
        GdalDataType::UInt32 => Ok(SampleBuffer::UInt32(warp_typed::<u32>(
            src, band, width, height, transform, wgs84_wkt,
        )?)),
        GdalDataType::Int32 => Ok(SampleBuffer::Int32(warp_typed::<i32>(
            src, band, width, height, transform, wgs84_wkt,
        )?)),
        GdalDataType::Float32 => Ok(SampleBuffer::Float32(warp_typed::<f32>(
            src, band, width, height, transform, wgs84_wkt,
        )?)),
        GdalDataType::Float64 => Ok(SampleBuffer::Float64(warp_typed::<f64>(
            src, band, width, height, transform, wgs84_wkt,
        )?)),
        other => Err(ReadError::UnsupportedPixelType(format!("{other:?}"))),
    }
}

fn warp_typed<T: GdalType + Copy>(
    src: &Dataset,
    band: usize,
    width: usize,
    height: usize,
    transform: &GeoTransform,
    wgs84_wkt: &str,
) -> Result<Vec<T>, ReadError> {
    let driver = DriverManager::get_driver_by_name("MEM")?;
    // The warp maps source band i to destination band i, so the target
    // mirrors the source's band count and the requested band is read
    // back afterwards.
    let mut dst = driver.create_with_band_type::<T, _>("", width, height, src.raster_count())?;
    dst.set_geo_transform(transform)?;
    dst.set_projection(wgs84_wkt)?;

    reproject(src, &dst)?;

    let warped = dst.rasterband(band)?;
    let buffer = warped.read_as::<T>((0, 0), (width, height), (width, height), None)?;
    Ok(buffer.data().to_vec())
}
