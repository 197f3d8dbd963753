//! Format-specific in-place scaling

use byte_slice_cast::{AsMutSliceOf, FromByteSlice};
use gst_audio::{AudioFormat, AUDIO_FORMAT_F32, AUDIO_FORMAT_F64};
use std::ops::MulAssign;

/// Scaling routine selected from the negotiated sample format
///
/// Resolved once per commit; the per-sample loop itself is monomorphic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SampleProcessor {
    /// No routine: only valid while the stream is in passthrough
    #[default]
    None,
    /// Native-endian 32-bit float
    F32,
    /// Native-endian 64-bit float
    F64,
}

impl SampleProcessor {
    /// Routine for a negotiated format, `None` when it cannot be scaled
    pub fn for_format(format: AudioFormat) -> Self {
        if format == AUDIO_FORMAT_F32 {
            Self::F32
        } else if format == AUDIO_FORMAT_F64 {
            Self::F64
        } else {
            Self::None
        }
    }

    /// Multiply every whole sample in `bytes` by `volume`
    ///
    /// Trailing bytes that do not form a full sample are left alone.
    pub fn process(self, bytes: &mut [u8], volume: f64) {
        match self {
            Self::None => {}
            Self::F32 => scale::<f32>(bytes, volume as f32),
            Self::F64 => scale::<f64>(bytes, volume),
        }
    }
}

trait Sample: Copy + MulAssign + FromByteSlice {
    const WIDTH: usize;

    fn read(bytes: &[u8]) -> Self;
    fn write(self, bytes: &mut [u8]);
}

impl Sample for f32 {
    const WIDTH: usize = 4;

    fn read(bytes: &[u8]) -> Self {
        let mut raw = [0u8; 4];
        raw.copy_from_slice(bytes);
        f32::from_ne_bytes(raw)
    }

    fn write(self, bytes: &mut [u8]) {
        bytes.copy_from_slice(&self.to_ne_bytes());
    }
}

impl Sample for f64 {
    const WIDTH: usize = 8;

    fn read(bytes: &[u8]) -> Self {
        let mut raw = [0u8; 8];
        raw.copy_from_slice(bytes);
        f64::from_ne_bytes(raw)
    }

    fn write(self, bytes: &mut [u8]) {
        bytes.copy_from_slice(&self.to_ne_bytes());
    }
}

fn scale<T: Sample>(bytes: &mut [u8], volume: T) {
    if let Ok(samples) = bytes.as_mut_slice_of::<T>() {
        for sample in samples {
            *sample *= volume;
        }
        return;
    }

    // Misaligned mapping or ragged length
    for chunk in bytes.chunks_exact_mut(T::WIDTH) {
        let mut sample = T::read(chunk);
        sample *= volume;
        sample.write(chunk);
    }
}
