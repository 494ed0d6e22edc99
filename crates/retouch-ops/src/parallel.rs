//! Row-parallel mapping using Rayon.
//!
//! Same contracts as [`crate::mapper`]: the source is read-only and the
//! result is a fresh raster. Work is split by output rows, so results are
//! identical to the sequential versions.
//!
//! # Example
//!
//! ```rust
//! use retouch_core::Raster;
//! use retouch_ops::parallel;
//!
//! let src: Raster<u16> = Raster::filled(1920, 1080, &[1000, 2000, 3000]).unwrap();
//! let out = parallel::apply_samples(&src, |v| v / 2);
//! assert_eq!(out.sample(0, 0, 2), Some(1500));
//! ```

use rayon::prelude::*;
use retouch_core::{Raster, Sample};
use retouch_lut::PixelTransform;
use tracing::trace;

/// Parallel [`crate::mapper::apply_samples`].
pub fn apply_samples<T, F>(src: &Raster<T>, f: F) -> Raster<T>
where
    T: Sample,
    F: Fn(T) -> T + Sync,
{
    trace!(
        width = src.width(),
        height = src.height(),
        threads = rayon::current_num_threads(),
        "parallel::apply_samples"
    );
    let mut out = src.clone();
    let row_len = out.row_len();
    out.data_mut().par_chunks_mut(row_len).for_each(|row| {
        for v in row.iter_mut() {
            *v = f(*v);
        }
    });
    out
}

/// Parallel [`crate::mapper::apply_pixels`].
pub fn apply_pixels<T, F>(src: &Raster<T>, f: F) -> Raster<T>
where
    T: Sample,
    F: Fn(&[T], &mut [T]) + Sync,
{
    trace!(
        width = src.width(),
        height = src.height(),
        threads = rayon::current_num_threads(),
        "parallel::apply_pixels"
    );
    let mut out = src.blank_like();
    let channels = src.channels();
    let row_len = src.row_len();
    out.data_mut()
        .par_chunks_mut(row_len)
        .zip(src.data().par_chunks(row_len))
        .for_each(|(dst_row, src_row)| {
            for (s, d) in src_row.chunks_exact(channels).zip(dst_row.chunks_exact_mut(channels)) {
                f(s, d);
            }
        });
    out
}

/// Parallel [`crate::mapper::apply_transform`].
pub fn apply_transform<T: Sample>(src: &Raster<T>, transform: &PixelTransform<T>) -> Raster<T> {
    apply_samples(src, |v| transform.map(v))
}
