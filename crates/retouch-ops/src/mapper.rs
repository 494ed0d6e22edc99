//! Pixel Mapper.
//!
//! Every function here takes the source raster by reference and returns a
//! new one; the source is never written. The output buffer is walked row by
//! row as a flat slice, with no per-pixel allocation.
//!
//! Two granularities:
//!
//! - **scalar** - `Fn(T) -> T` applied to every channel of every pixel
//! - **vector** - `Fn(&[T], &mut [T])` receives a whole source pixel and
//!   writes the matching output pixel
//!
//! # Example
//!
//! ```rust
//! use retouch_core::Raster;
//! use retouch_lut::ToneLut;
//! use retouch_ops::mapper;
//!
//! let src: Raster<u8> = Raster::filled(4, 4, &[200, 200, 200]).unwrap();
//! let inverted = mapper::apply_lut(&src, &ToneLut::from_fn(|t| 1.0 - t));
//! assert_eq!(src.sample(0, 0, 0), Some(200));
//! assert!(inverted.sample(0, 0, 0).unwrap() < 128);
//! ```

use retouch_core::{Raster, Sample};
use retouch_curve::{ControlPoint, CurveBuilder};
use retouch_lut::{PixelTransform, ToneLut};
use tracing::trace;

use crate::OpsResult;

/// Applies `f` to every sample of `src`.
pub fn apply_samples<T, F>(src: &Raster<T>, f: F) -> Raster<T>
where
    T: Sample,
    F: Fn(T) -> T,
{
    trace!(
        width = src.width(),
        height = src.height(),
        channels = src.channels(),
        "mapper::apply_samples"
    );
    let mut out = src.clone();
    let row_len = out.row_len();
    for row in out.data_mut().chunks_exact_mut(row_len) {
        for v in row.iter_mut() {
            *v = f(*v);
        }
    }
    out
}

/// Applies `f` to every pixel of `src`.
///
/// `f` gets the source pixel and the output pixel, both `channels` long.
/// The output pixel starts zeroed.
pub fn apply_pixels<T, F>(src: &Raster<T>, f: F) -> Raster<T>
where
    T: Sample,
    F: Fn(&[T], &mut [T]),
{
    trace!(
        width = src.width(),
        height = src.height(),
        channels = src.channels(),
        "mapper::apply_pixels"
    );
    let mut out = src.blank_like();
    let channels = src.channels();
    let row_len = src.row_len();
    for (src_row, dst_row) in src
        .data()
        .chunks_exact(row_len)
        .zip(out.data_mut().chunks_exact_mut(row_len))
    {
        for (s, d) in src_row.chunks_exact(channels).zip(dst_row.chunks_exact_mut(channels)) {
            f(s, d);
        }
    }
    out
}

/// Maps every sample through a precomputed transform.
pub fn apply_transform<T: Sample>(src: &Raster<T>, transform: &PixelTransform<T>) -> Raster<T> {
    apply_samples(src, |v| transform.map(v))
}

/// Builds the floor-indexed transform for `lut` and maps every sample.
///
/// Uses the row-parallel path when the `parallel` feature is on.
pub fn apply_lut<T: Sample>(src: &Raster<T>, lut: &ToneLut) -> Raster<T> {
    let transform = lut.to_transform::<T>();
    #[cfg(feature = "parallel")]
    {
        crate::parallel::apply_transform(src, &transform)
    }
    #[cfg(not(feature = "parallel"))]
    {
        apply_transform(src, &transform)
    }
}

/// Fits `points` with `builder` and maps `src` through the resulting LUT.
pub fn apply_curve<T: Sample>(
    src: &Raster<T>,
    builder: &CurveBuilder,
    points: &[ControlPoint],
) -> OpsResult<Raster<T>> {
    let lut = builder.build(points)?;
    Ok(apply_lut(src, &lut))
}

/// Maps a raw interleaved buffer, validating its size first.
///
/// # Errors
///
/// [`crate::OpsError::Core`] if `data.len()` does not match the layout.
pub fn apply_lut_raw<T: Sample>(
    width: u32,
    height: u32,
    channels: usize,
    data: Vec<T>,
    lut: &ToneLut,
) -> OpsResult<Vec<T>> {
    let src = Raster::from_data(width, height, channels, data)?;
    Ok(apply_lut(&src, lut).into_data())
}

/// Returns `lut[floor(v * 100 / R)]` scaled back to `[0, R]`, computed
/// directly rather than through a table.
///
/// Matches [`PixelTransform::map`] for floor interpolation; useful when
/// mapping only a handful of values.
pub fn map_value<T: Sample>(lut: &ToneLut, v: T) -> T {
    let idx = (v.to_u32() as u64 * retouch_lut::LUT_SIZE as u64 / T::MAX as u64) as usize;
    let y = lut.get(idx).or_else(|| lut.samples().last().copied()).unwrap_or(0.0);
    T::from_f32(y)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient() -> Raster<u8> {
        let data: Vec<u8> = (0..=255u8).flat_map(|v| [v, v / 2, 255 - v]).collect();
        Raster::from_data(16, 16, 3, data).unwrap()
    }

    #[test]
    fn test_identity_lut_preserves_pixels() {
        let src = gradient();
        let out = apply_lut(&src, &ToneLut::identity());
        for (a, b) in src.data().iter().zip(out.data()) {
            assert!((*a as i32 - *b as i32).abs() <= 3, "{a} -> {b}");
        }
        assert_eq!(out.sample(0, 0, 0), Some(0));
        assert_eq!(out.dimensions(), src.dimensions());
    }

    #[test]
    fn test_source_untouched_and_reapply_independent() {
        let src = gradient();
        let before = src.clone();

        let dark = apply_lut(&src, &ToneLut::from_fn(|_| 0.0));
        let bright = apply_lut(&src, &ToneLut::from_fn(|_| 1.0));
        assert_eq!(src, before);
        assert!(dark.data().iter().all(|&v| v == 0));
        assert!(bright.data().iter().all(|&v| v == 255));
    }

    #[test]
    fn test_max_input_in_range() {
        let src: Raster<u8> = Raster::filled(2, 2, &[255]).unwrap();
        let lut = ToneLut::from_fn(|t| t + 0.02);
        let out = apply_lut(&src, &lut);
        assert!(out.data().iter().all(|&v| v == 255));

        let src: Raster<u16> = Raster::filled(2, 2, &[u16::MAX]).unwrap();
        let out = apply_lut(&src, &lut);
        assert!(out.data().iter().all(|&v| v == u16::MAX));
    }

    #[test]
    fn test_vector_swaps_channels() {
        let src: Raster<u8> = Raster::filled(3, 2, &[10, 20, 30, 40]).unwrap();
        let out = apply_pixels(&src, |s, d| {
            d[0] = s[2];
            d[1] = s[1];
            d[2] = s[0];
            d[3] = s[3];
        });
        assert!(out.pixels().all(|(_, _, px)| px == [30, 20, 10, 40]));
        assert_eq!(src.pixel(0, 0), Some(&[10u8, 20, 30, 40][..]));
    }

    #[test]
    fn test_apply_curve_mid_gray() {
        let (points, _) = retouch_curve::ControlPointSet::new().with_added(0.5, 0.8).unwrap();
        let src: Raster<u8> = Raster::filled(5, 5, &[128, 128, 128]).unwrap();
        let out = apply_curve(&src, &CurveBuilder::natural(), points.as_slice()).unwrap();
        assert!(out.data().iter().all(|&v| v == 204));
    }

    #[test]
    fn test_apply_lut_raw_checks_size() {
        let lut = ToneLut::identity();
        assert!(apply_lut_raw::<u8>(2, 2, 3, vec![0; 11], &lut).is_err());
        let out = apply_lut_raw::<u8>(2, 2, 1, vec![0, 0, 0, 0], &lut).unwrap();
        assert_eq!(out, vec![0; 4]);
    }

    #[test]
    fn test_map_value_matches_transform() {
        let lut = ToneLut::from_fn(|t| t.sqrt());
        let table = lut.to_transform::<u8>();
        for v in 0..=255u8 {
            assert_eq!(map_value(&lut, v), table.map(v));
        }
    }

    #[test]
    fn test_inverse_uses_floor_index() {
        let invert = ToneLut::from_fn(|t| 1.0 - t);
        // floor(128 * 100 / 255) = 50 -> 1 - 0.5
        assert_eq!(map_value(&invert, 128u8), 128);
        // floor(200 * 100 / 255) = 78 -> round(0.22 * 255)
        assert_eq!(map_value(&invert, 200u8), 56);

        let src: Raster<u8> = Raster::filled(2, 2, &[200, 128, 0]).unwrap();
        let out = apply_lut(&src, &invert);
        assert!(out.pixels().all(|(_, _, px)| px == [56, 128, 255]));
    }
}
