//! Decoded raster textures and the pixel-buffer codec.
//!
//! A [`Texture`] is the end product of the pipeline: a single band of a
//! coverage, warped to WGS84 and stored as a flat byte buffer that can be
//! uploaded to the GPU as-is. The numeric sample type survives the decode
//! ([`TexelKind`]), together with the normalization maximum a shader needs
//! to map raw samples into `[0, 1]`.
//!
//! The codec half ([`SampleBuffer`]) converts typed warp output into that
//! byte buffer. It is pure and synchronous; all I/O lives in
//! [`crate::reproject`] and [`crate::fetch`].

mod codec;

pub use codec::SampleBuffer;

/// Numeric type of a single texture sample.
///
/// These are the pixel types GPU texture formats in this domain support.
/// 64-bit floating point sources are narrowed to [`TexelKind::Float32`]
/// during decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TexelKind {
    UInt8,
    UInt16,
    Int16,
    UInt32,
    Int32,
    Float32,
}

impl TexelKind {
    /// Size of one sample in bytes.
    pub fn size_bytes(&self) -> usize {
        match self {
            TexelKind::UInt8 => 1,
            TexelKind::UInt16 | TexelKind::Int16 => 2,
            TexelKind::UInt32 | TexelKind::Int32 | TexelKind::Float32 => 4,
        }
    }

    /// Maximum used to normalize raw samples into `[0, 1]`.
    ///
    /// Integer kinds use their natural type maximum (cast to `f32` for the
    /// 32-bit kinds); floating-point data is treated as already normalized.
    pub fn normalization_max(&self) -> f32 {
        match self {
            TexelKind::UInt8 => u8::MAX as f32,
            TexelKind::UInt16 => u16::MAX as f32,
            TexelKind::Int16 => i16::MAX as f32,
            TexelKind::UInt32 => u32::MAX as f32,
            TexelKind::Int32 => i32::MAX as f32,
            TexelKind::Float32 => 1.0,
        }
    }
}

/// Geographic bounding box in radians.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RadianBounds {
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64,
}

/// A decoded, reprojected, single-band raster ready for GPU upload.
///
/// The buffer length is `width * height * kind.size_bytes()` by
/// construction; samples are stored in native byte order, row-major from
/// the north-west corner.
#[derive(Debug, Clone)]
pub struct Texture {
    /// Raw sample bytes.
    pub data: Vec<u8>,
    /// Width in pixels.
    pub width: usize,
    /// Height in pixels.
    pub height: usize,
    /// Numeric type of each sample.
    pub kind: TexelKind,
    /// Normalization maximum for `kind` (see [`TexelKind::normalization_max`]).
    pub normalization_max: f32,
    /// (min, max) of the source band's values.
    pub value_range: (f64, f64),
    /// Geographic extent of the warped raster, in radians.
    pub bounds: RadianBounds,
    /// Number of bands in the source dataset (not just the one decoded).
    pub bands: usize,
}

impl Texture {
    /// Size of the pixel buffer in bytes.
    pub fn buffer_len(&self) -> usize {
        self.data.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_texel_kind_sizes() {
        assert_eq!(TexelKind::UInt8.size_bytes(), 1);
        assert_eq!(TexelKind::UInt16.size_bytes(), 2);
        assert_eq!(TexelKind::Int16.size_bytes(), 2);
        assert_eq!(TexelKind::UInt32.size_bytes(), 4);
        assert_eq!(TexelKind::Int32.size_bytes(), 4);
        assert_eq!(TexelKind::Float32.size_bytes(), 4);
    }

    #[test]
    fn test_normalization_max_integer_kinds() {
        assert_eq!(TexelKind::UInt8.normalization_max(), 255.0);
        assert_eq!(TexelKind::UInt16.normalization_max(), 65535.0);
        assert_eq!(TexelKind::Int16.normalization_max(), 32767.0);
        assert_eq!(TexelKind::UInt32.normalization_max(), u32::MAX as f32);
        assert_eq!(TexelKind::Int32.normalization_max(), i32::MAX as f32);
    }

    #[test]
    fn test_normalization_max_float_is_unit() {
        assert_eq!(TexelKind::Float32.normalization_max(), 1.0);
    }
}
