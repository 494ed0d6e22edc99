//! # retouch-ops
//!
//! Pixel mapping for tone curves.
//!
//! # Modules
//!
//! - [`mapper`] - Scalar and per-pixel mapping into a fresh raster
//! - [`parallel`] - Row-parallel versions (feature `parallel`, on by default)
//! - [`RgbToneCurves`] - Red/green/blue curves followed by a master curve
//! - [`MappingWorker`] - Background thread that only delivers the newest result
//!
//! # Example
//!
//! ```rust
//! use retouch_core::Raster;
//! use retouch_curve::{ControlPointSet, CurveBuilder};
//! use retouch_ops::mapper;
//!
//! let (points, _) = ControlPointSet::new().with_added(0.5, 0.8).unwrap();
//! let lut = CurveBuilder::natural().build(points.as_slice()).unwrap();
//!
//! let gray: Raster<u8> = Raster::filled(8, 8, &[128, 128, 128]).unwrap();
//! let lifted = mapper::apply_lut(&gray, &lut);
//! assert_eq!(lifted.sample(3, 3, 1), Some(204));
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod error;
pub mod mapper;
mod messages;
#[cfg(feature = "parallel")]
pub mod parallel;
mod rgb_curves;
mod worker;

pub use error::{OpsError, OpsResult};
pub use messages::{Generation, MapJob, MappedImage};
pub use rgb_curves::{CurveChannel, NUM_CURVES, RgbToneCurves, RgbTransform};
pub use worker::MappingWorker;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::mapper::{apply_lut, apply_pixels, apply_samples, apply_transform};
    pub use crate::{MapJob, MappingWorker, OpsError, OpsResult, RgbToneCurves};
}
