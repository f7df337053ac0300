//! Conversion of typed warp output into canonical texture buffers.

use super::TexelKind;

/// Typed sample buffer produced by the warp step.
///
/// One variant per numeric raster type the pipeline accepts. `Float64`
/// exists only as an input: [`SampleBuffer::into_texels`] narrows it to
/// 32-bit floats because GPU texture formats in this domain have no
/// 64-bit float representation.
#[derive(Debug, Clone)]
pub enum SampleBuffer {
    UInt8(Vec<u8>),
    UInt16(Vec<u16>),
    Int16(Vec<i16>),
    UInt32(Vec<u32>),
    Int32(Vec<i32>),
    Float32(Vec<f32>),
    Float64(Vec<f64>),
}

impl SampleBuffer {
    /// Number of samples in the buffer.
    pub fn len(&self) -> usize {
        match self {
            SampleBuffer::UInt8(v) => v.len(),
            SampleBuffer::UInt16(v) => v.len(),
            SampleBuffer::Int16(v) => v.len(),
            SampleBuffer::UInt32(v) => v.len(),
            SampleBuffer::Int32(v) => v.len(),
            SampleBuffer::Float32(v) => v.len(),
            SampleBuffer::Float64(v) => v.len(),
        }
    }

    /// Returns true if the buffer holds no samples.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Converts the samples into a native-endian byte buffer plus the
    /// resulting [`TexelKind`].
    ///
    /// `Float64` input is narrowed to `Float32`; this is a lossy,
    /// intentional downcast. Every other variant maps to the matching
    /// kind, so the output length is always
    /// `sample count * kind.size_bytes()`.
    pub fn into_texels(self) -> (Vec<u8>, TexelKind) {
        match self {
            SampleBuffer::UInt8(v) => (v, TexelKind::UInt8),
            SampleBuffer::UInt16(v) => (bytes_of(&v), TexelKind::UInt16),
            SampleBuffer::Int16(v) => (bytes_of(&v), TexelKind::Int16),
            SampleBuffer::UInt32(v) => (bytes_of(&v), TexelKind::UInt32),
            SampleBuffer::Int32(v) => (bytes_of(&v), TexelKind::Int32),
            SampleBuffer::Float32(v) => (bytes_of(&v), TexelKind::Float32),
            SampleBuffer::Float64(v) => {
                let narrowed: Vec<f32> = v.into_iter().map(|s| s as f32).collect();
                (bytes_of(&narrowed), TexelKind::Float32)
            }
        }
    }
}

/// Trait for sample types that can be flattened to native-endian bytes.
trait Sample: Copy {
    const SIZE: usize;
    fn write_to(self, out: &mut Vec<u8>);
}

macro_rules! impl_sample {
    ($($ty:ty),*) => {
        $(impl Sample for $ty {
            const SIZE: usize = std::mem::size_of::<$ty>();
            fn write_to(self, out: &mut Vec<u8>) {
                out.extend_from_slice(&self.to_ne_bytes());
            }
        })*
    };
}

impl_sample!(u16, i16, u32, i32, f32);

fn bytes_of<T: Sample>(samples: &[T]) -> Vec<u8> {
    let mut out = Vec::with_capacity(samples.len() * T::SIZE);
    for &s in samples {
        s.write_to(&mut out);
    }
    out
}
