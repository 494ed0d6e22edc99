//! Fixed-resolution tone lookup table.
//!
//! A [`ToneLut`] is the sampled form of a tone curve: exactly
//! [`LUT_SIZE`] values, sample `i` holding the curve at input fraction
//! `i / 100`. Every sample is clamped to `[0, 1]` on construction, so
//! spline overshoot never reaches pixel math.

use serde::{Deserialize, Serialize};

use crate::{Interpolation, LutError, LutResult, PixelTransform};
use retouch_core::Sample;

/// Number of samples in a [`ToneLut`].
pub const LUT_SIZE: usize = 100;

/// Sampled tone curve.
///
/// # Example
///
/// ```rust
/// use retouch_lut::ToneLut;
///
/// let lut = ToneLut::from_fn(|t| t * t);
/// assert_eq!(lut.samples().len(), 100);
/// assert!((lut.lookup(0.5) - 0.25).abs() < 1e-6);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f32>", into = "Vec<f32>")]
pub struct ToneLut {
    samples: Vec<f32>,
}

/// Clamps a curve value into `[0, 1]`; NaN collapses to 0.
#[inline]
fn clamp_unit(v: f32) -> f32 {
    if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) }
}

impl ToneLut {
    /// Creates the identity LUT, `lut[i] = i / 100`.
    pub fn identity() -> Self {
        Self::from_fn(|t| t)
    }

    /// Samples `curve` at `t = i / 100` for `i in 0..100`, clamping each value.
    pub fn from_fn(curve: impl Fn(f32) -> f32) -> Self {
        let samples = (0..LUT_SIZE)
            .map(|i| clamp_unit(curve(Self::input_at(i))))
            .collect();
        Self { samples }
    }

    /// Creates a LUT from raw samples.
    ///
    /// Finite values outside `[0, 1]` are clamped.
    ///
    /// # Errors
    ///
    /// [`LutError::InvalidSize`] unless exactly [`LUT_SIZE`] samples are given,
    /// [`LutError::NonFinite`] for NaN or infinite samples.
    pub fn from_samples(samples: Vec<f32>) -> LutResult<Self> {
        if samples.len() != LUT_SIZE {
            return Err(LutError::InvalidSize {
                expected: LUT_SIZE,
                got: samples.len(),
            });
        }
        if let Some((index, &value)) = samples.iter().enumerate().find(|(_, v)| !v.is_finite()) {
            return Err(LutError::NonFinite { index, value });
        }
        Ok(Self {
            samples: samples.into_iter().map(clamp_unit).collect(),
        })
    }

    /// Input fraction represented by sample `index`.
    #[inline]
    pub fn input_at(index: usize) -> f32 {
        index as f32 / LUT_SIZE as f32
    }

    /// Returns all samples.
    #[inline]
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Returns sample `index`, or `None` past the end.
    #[inline]
    pub fn get(&self, index: usize) -> Option<f32> {
        self.samples.get(index).copied()
    }

    /// Maps an input fraction to a sample index: `floor(fraction * 100)`
    /// clamped into `[0, 99]`.
    #[inline]
    pub fn index_for(fraction: f32) -> usize {
        if fraction.is_nan() || fraction <= 0.0 {
            return 0;
        }
        ((fraction * LUT_SIZE as f32).floor() as usize).min(LUT_SIZE - 1)
    }

    /// Looks up the sample for an input fraction without interpolation.
    #[inline]
    pub fn lookup(&self, fraction: f32) -> f32 {
        self.samples[Self::index_for(fraction)]
    }

    /// Looks up an input fraction with linear interpolation between samples.
    ///
    /// Past the last sample the final segment is extended, then clamped, so
    /// `lookup_linear(1.0)` of the identity LUT is `1.0`.
    pub fn lookup_linear(&self, fraction: f32) -> f32 {
        let f = if fraction.is_nan() { 0.0 } else { fraction.clamp(0.0, 1.0) };
        let idx_f = f * LUT_SIZE as f32;
        let idx0 = (idx_f.floor() as usize).min(LUT_SIZE - 2);
        let frac = idx_f - idx0 as f32;
        let a = self.samples[idx0];
        let b = self.samples[idx0 + 1];
        clamp_unit(a + (b - a) * frac)
    }

    /// Returns `true` if every sample is within `tolerance` of `i / 100`.
    pub fn is_identity(&self, tolerance: f32) -> bool {
        self.samples
            .iter()
            .enumerate()
            .all(|(i, &v)| (v - Self::input_at(i)).abs() <= tolerance)
    }

    /// `(input, output)` pairs for plotting the curve.
    pub fn plot_points(&self) -> impl Iterator<Item = (f32, f32)> + '_ {
        self.samples
            .iter()
            .enumerate()
            .map(|(i, &v)| (Self::input_at(i), v))
    }

    /// Builds the integer transform for sample type `T` with floor lookup.
    pub fn to_transform<T: Sample>(&self) -> PixelTransform<T> {
        PixelTransform::new(self, Interpolation::Floor)
    }
}

impl Default for ToneLut {
    fn default() -> Self {
        Self::identity()
    }
}

impl TryFrom<Vec<f32>> for ToneLut {
    type Error = LutError;

    fn try_from(samples: Vec<f32>) -> LutResult<Self> {
        Self::from_samples(samples)
    }
}

impl From<ToneLut> for Vec<f32> {
    fn from(lut: ToneLut) -> Self {
        lut.samples
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_identity() {
        let lut = ToneLut::identity();
        assert_eq!(lut.samples().len(), LUT_SIZE);
        assert_relative_eq!(lut.lookup(0.0), 0.0);
        assert_relative_eq!(lut.lookup(0.5), 0.5);
        assert_relative_eq!(lut.lookup(1.0), 0.99);
        assert!(lut.is_identity(1e-6));
    }

    #[test]
    fn test_from_fn_clamps() {
        let lut = ToneLut::from_fn(|t| t * 3.0 - 1.0);
        assert!(lut.samples().iter().all(|&v| (0.0..=1.0).contains(&v)));
        assert_eq!(lut.get(0), Some(0.0));
        assert_eq!(lut.get(99), Some(1.0));
        assert_eq!(lut.get(100), None);
    }

    #[test]
    fn test_from_samples_validation() {
        assert!(matches!(
            ToneLut::from_samples(vec![0.5; 10]),
            Err(LutError::InvalidSize { got: 10, .. })
        ));

        let mut bad = vec![0.5; LUT_SIZE];
        bad[42] = f32::NAN;
        assert!(matches!(
            ToneLut::from_samples(bad),
            Err(LutError::NonFinite { index: 42, .. })
        ));

        let mut loud = vec![0.5; LUT_SIZE];
        loud[0] = -2.0;
        loud[1] = 7.0;
        let lut = ToneLut::from_samples(loud).unwrap();
        assert_eq!(lut.get(0), Some(0.0));
        assert_eq!(lut.get(1), Some(1.0));
    }

    #[test]
    fn test_index_for_clamps() {
        assert_eq!(ToneLut::index_for(-0.5), 0);
        assert_eq!(ToneLut::index_for(f32::NAN), 0);
        assert_eq!(ToneLut::index_for(0.505), 50);
        assert_eq!(ToneLut::index_for(1.0), 99);
        assert_eq!(ToneLut::index_for(3.0), 99);
    }

    #[test]
    fn test_lookup_linear_reaches_end() {
        let lut = ToneLut::identity();
        assert_relative_eq!(lut.lookup_linear(0.255), 0.255, epsilon = 1e-5);
        assert_relative_eq!(lut.lookup_linear(1.0), 1.0, epsilon = 1e-5);
    }

    #[test]
    fn test_json_shape() {
        let lut = ToneLut::identity();
        let json = serde_json::to_string(&lut).unwrap();
        assert!(json.starts_with('['));
        let back: ToneLut = serde_json::from_str(&json).unwrap();
        assert_eq!(back, lut);
        assert!(serde_json::from_str::<ToneLut>("[0.1, 0.2]").is_err());
    }
}
