//! # retouch-lut
//!
//! Lookup tables for tone curves.
//!
//! - [`ToneLut`] - 100 samples of a tone curve over `t = 0.00, 0.01, ..., 0.99`
//! - [`PixelTransform`] - Dense integer table mapping `[0, R]` to `[0, R]`
//!
//! # Usage
//!
//! ```rust
//! use retouch_lut::{PixelTransform, ToneLut};
//!
//! let lut = ToneLut::identity();
//! let transform: PixelTransform<u8> = lut.to_transform();
//! assert_eq!(transform.map(128), 128);
//! ```
//!
//! # Index policy
//!
//! A sample `v` in `[0, R]` reads `lut[floor(v * 100 / R)]`, with the index
//! clamped into `[0, 99]` because `v == R` lands one past the end.

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod error;
mod tone_lut;
mod transform;

pub use error::{LutError, LutResult};
pub use tone_lut::{LUT_SIZE, ToneLut};
pub use transform::{Interpolation, PixelTransform};
