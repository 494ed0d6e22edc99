//! Integer pixel transforms derived from a [`ToneLut`].
//!
//! A [`PixelTransform`] is the scaled form of a LUT for one sample type:
//! for every `v` in `[0, R]` it stores `round(lut[floor(v * 100 / R)] * R)`.
//! Precomputing all `R + 1` outputs turns the per-sample work of the
//! mapper into one indexed load.

use tracing::trace;

use crate::{LUT_SIZE, ToneLut};
use retouch_core::Sample;

/// How sample values between LUT entries are resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Interpolation {
    /// `lut[floor(v * 100 / R)]`, index clamped into `[0, 99]`.
    #[default]
    Floor,
    /// Linear blend between neighbouring entries. Reduces banding for
    /// 16-bit samples where 100 entries are coarse.
    Linear,
}

/// Dense lookup from input sample to output sample.
///
/// # Example
///
/// ```rust
/// use retouch_lut::{Interpolation, PixelTransform, ToneLut};
///
/// let lut = ToneLut::from_fn(|t| 1.0 - t);
/// let invert: PixelTransform<u8> = PixelTransform::new(&lut, Interpolation::Floor);
/// assert_eq!(invert.map(0), 255);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct PixelTransform<T: Sample> {
    table: Vec<T>,
}

impl<T: Sample> PixelTransform<T> {
    /// Scales `lut` to the value range of `T`.
    pub fn new(lut: &ToneLut, interpolation: Interpolation) -> Self {
        let max = T::MAX;
        trace!(max, ?interpolation, "PixelTransform::new");

        let table = (0..=max)
            .map(|v| {
                let y = match interpolation {
                    Interpolation::Floor => {
                        let idx = (v as u64 * LUT_SIZE as u64 / max as u64) as usize;
                        lut.samples()[idx.min(LUT_SIZE - 1)]
                    }
                    Interpolation::Linear => lut.lookup_linear(v as f32 / max as f32),
                };
                T::from_f32(y)
            })
            .collect();

        Self { table }
    }

    /// Maps one sample.
    #[inline]
    pub fn map(&self, value: T) -> T {
        // The table covers every value of T, so the index is always valid.
        self.table[value.to_u32() as usize]
    }

    /// Returns the precomputed output for every input value.
    #[inline]
    pub fn table(&self) -> &[T] {
        &self.table
    }

    /// Returns `true` if the transform leaves every value unchanged.
    pub fn is_identity(&self) -> bool {
        self.table
            .iter()
            .enumerate()
            .all(|(i, v)| v.to_u32() == i as u32)
    }
}
