//! # retouch-core
//!
//! Core types shared by the retouch crates.
//!
//! - [`Raster`] - Flat, row-major image buffer with interleaved channels
//! - [`Sample`] - Trait for integer sample types (`u8`, `u16`)
//! - [`Error`] - Errors for buffer construction and access
//!
//! ## Crate Structure
//!
//! ```text
//! retouch-core (this crate)
//!    ^
//!    |
//!    +-- retouch-lut (ToneLut, PixelTransform)
//!    +-- retouch-curve (control points, splines, editing session)
//!    +-- retouch-ops (pixel mapper, background worker)
//! ```
//!
//! ## Example
//!
//! ```rust
//! use retouch_core::Raster;
//!
//! let mut img: Raster<u8> = Raster::new(4, 2, 3).unwrap();
//! img.set_pixel(1, 1, &[255, 128, 0]).unwrap();
//! assert_eq!(img.sample(1, 1, 1), Some(128));
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod error;
pub mod raster;
pub mod sample;

pub use error::{Error, Result};
pub use raster::Raster;
pub use sample::Sample;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::raster::Raster;
    pub use crate::sample::Sample;
}
