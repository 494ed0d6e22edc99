//! Per-channel tone curves.
//!
//! Red, green and blue each get their own LUT, then a master LUT is applied
//! to all three. Order: R curve, G curve, B curve, then Master. A fourth
//! channel is alpha and passes through unchanged.
//!
//! Single- and two-channel rasters (gray, gray + alpha) only see the master
//! curve on channel 0.

use retouch_core::{Raster, Sample};
use retouch_curve::{ControlPointSet, CurveBuilder, CurveResult};
use retouch_lut::{PixelTransform, ToneLut};
use tracing::trace;

/// Curve channel index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(usize)]
pub enum CurveChannel {
    /// Red channel curve.
    Red = 0,
    /// Green channel curve.
    Green = 1,
    /// Blue channel curve.
    Blue = 2,
    /// Master curve (applied to all color channels).
    Master = 3,
}

/// Number of curves in an [`RgbToneCurves`] set.
pub const NUM_CURVES: usize = 4;

/// Four tone curves: red, green, blue, master.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RgbToneCurves {
    luts: [ToneLut; NUM_CURVES],
}

impl RgbToneCurves {
    /// All four curves identity.
    pub fn identity() -> Self {
        Self::default()
    }

    /// Only the master curve set; R/G/B identity.
    pub fn master(lut: ToneLut) -> Self {
        let mut curves = Self::identity();
        curves.set(CurveChannel::Master, lut);
        curves
    }

    /// Creates a set from explicit LUTs.
    pub fn from_luts(red: ToneLut, green: ToneLut, blue: ToneLut, master: ToneLut) -> Self {
        Self {
            luts: [red, green, blue, master],
        }
    }

    /// Fits one control point set per channel, in `[R, G, B, Master]` order.
    pub fn from_points(
        builder: &CurveBuilder,
        sets: [&ControlPointSet; NUM_CURVES],
    ) -> CurveResult<Self> {
        let [r, g, b, m] = sets;
        Ok(Self::from_luts(
            builder.build(r.as_slice())?,
            builder.build(g.as_slice())?,
            builder.build(b.as_slice())?,
            builder.build(m.as_slice())?,
        ))
    }

    /// LUT for `channel`.
    #[inline]
    pub fn get(&self, channel: CurveChannel) -> &ToneLut {
        &self.luts[channel as usize]
    }

    /// Replaces the LUT for `channel`.
    pub fn set(&mut self, channel: CurveChannel, lut: ToneLut) {
        self.luts[channel as usize] = lut;
    }

    /// `true` if every curve is exactly identity.
    pub fn is_identity(&self) -> bool {
        self.luts.iter().all(|l| l.is_identity(0.0))
    }

    /// Precomputes integer tables for sample type `T`.
    pub fn transform<T: Sample>(&self) -> RgbTransform<T> {
        RgbTransform {
            tables: [
                self.luts[0].to_transform(),
                self.luts[1].to_transform(),
                self.luts[2].to_transform(),
                self.luts[3].to_transform(),
            ],
        }
    }

    /// Maps `src` into a new raster. An all-identity set returns a plain copy.
    pub fn apply<T: Sample>(&self, src: &Raster<T>) -> Raster<T> {
        if self.is_identity() {
            trace!("RgbToneCurves::apply bypass");
            return src.clone();
        }
        trace!(channels = src.channels(), "RgbToneCurves::apply");
        let transform = self.transform::<T>();
        let f = |s: &[T], d: &mut [T]| transform.map_pixel(s, d);
        #[cfg(feature = "parallel")]
        {
            crate::parallel::apply_pixels(src, f)
        }
        #[cfg(not(feature = "parallel"))]
        {
            crate::mapper::apply_pixels(src, f)
        }
    }
}

/// Integer tables for an [`RgbToneCurves`] set.
#[derive(Debug, Clone)]
pub struct RgbTransform<T: Sample> {
    tables: [PixelTransform<T>; NUM_CURVES],
}

impl<T: Sample> RgbTransform<T> {
    /// Maps one pixel. `src` and `dst` must have the same length.
    #[inline]
    pub fn map_pixel(&self, src: &[T], dst: &mut [T]) {
        let master = &self.tables[CurveChannel::Master as usize];
        let color = if src.len() >= 3 { 3 } else { 1 };
        for (c, (s, d)) in src.iter().zip(dst.iter_mut()).enumerate() {
            *d = if c >= color {
                *s
            } else if color == 3 {
                master.map(self.tables[c].map(*s))
            } else {
                master.map(*s)
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_identity_leaves_pixels() {
        let src: Raster<u8> = Raster::filled(4, 4, &[0, 255, 0, 200]).unwrap();
        let out = RgbToneCurves::identity().apply(&src);
        assert_eq!(out, src);
        assert!(RgbToneCurves::identity().is_identity());
    }

    #[test]
    fn test_single_channel_edit() {
        let mut curves = RgbToneCurves::identity();
        curves.set(CurveChannel::Red, ToneLut::from_fn(|_| 0.0));
        let src: Raster<u8> = Raster::filled(3, 3, &[200, 200, 200, 77]).unwrap();
        let out = curves.apply(&src);
        let px = out.pixel(1, 1).unwrap();
        assert_eq!(px[0], 0);
        assert_eq!(px[3], 77);
        // identity via floor-indexed table stays within a few steps
        assert!((px[1] as i32 - 200).abs() <= 3);
        assert_eq!(px[1], px[2]);
    }

    #[test]
    fn test_master_after_channel() {
        // red: x -> 1 - x, master: x -> 0 below half, 1 above
        let curves = RgbToneCurves::from_luts(
            ToneLut::from_fn(|t| 1.0 - t),
            ToneLut::identity(),
            ToneLut::identity(),
            ToneLut::from_fn(|t| if t < 0.5 { 0.0 } else { 1.0 }),
        );
        let src: Raster<u8> = Raster::filled(1, 1, &[20, 20, 240]).unwrap();
        let out = curves.apply(&src);
        assert_eq!(out.pixel(0, 0), Some(&[255u8, 0, 255][..]));
    }

    #[test]
    fn test_gray_uses_master_only() {
        let mut curves = RgbToneCurves::master(ToneLut::from_fn(|_| 1.0));
        curves.set(CurveChannel::Red, ToneLut::from_fn(|_| 0.0));
        let src: Raster<u16> = Raster::filled(2, 1, &[100, 5]).unwrap();
        let out = curves.apply(&src);
        assert_eq!(out.pixel(0, 0), Some(&[u16::MAX, 5][..]));
    }

    #[test]
    fn test_from_points() {
        let (lifted, _) = ControlPointSet::new().with_added(0.5, 0.8).unwrap();
        let identity = ControlPointSet::new();
        let curves = RgbToneCurves::from_points(
            &CurveBuilder::natural(),
            [&identity, &identity, &identity, &lifted],
        )
        .unwrap();
        assert!(curves.get(CurveChannel::Red).is_identity(1e-6));
        assert_abs_diff_eq!(curves.get(CurveChannel::Master).lookup(0.5), 0.8, epsilon = 1e-6);
    }
}
