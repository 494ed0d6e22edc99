//! Integer sample formats.
//!
//! A tone curve maps an integer sample in `[0, MAX]` back into the same
//! range. [`Sample`] abstracts the two depths the mapper supports:
//!
//! - `u8` - 8-bit, `MAX = 255`
//! - `u16` - 16-bit, `MAX = 65535`
//!
//! ```
//! use retouch_core::Sample;
//!
//! assert_eq!(<u8 as Sample>::MAX, 255);
//! assert_eq!(u8::from_u32(300), 255);
//! assert!((128u8.to_f32() - 0.502).abs() < 0.01);
//! ```

use std::fmt;

/// Trait for integer sample types stored in a [`crate::Raster`].
pub trait Sample: Copy + Default + Send + Sync + PartialOrd + fmt::Debug + 'static {
    /// Maximum representable value (`R` in `[0, R]`).
    const MAX: u32;

    /// Widen to `u32`.
    fn to_u32(self) -> u32;

    /// Narrow from `u32`, saturating at [`Sample::MAX`].
    fn from_u32(v: u32) -> Self;

    /// Normalize to `[0.0, 1.0]`.
    #[inline]
    fn to_f32(self) -> f32 {
        self.to_u32() as f32 / Self::MAX as f32
    }

    /// Convert from a normalized value, clamping to `[0.0, 1.0]` and rounding.
    #[inline]
    fn from_f32(v: f32) -> Self {
        let v = if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) };
        Self::from_u32((v * Self::MAX as f32).round() as u32)
    }

    /// Zero value.
    #[inline]
    fn zero() -> Self {
        Self::default()
    }
}

impl Sample for u8 {
    const MAX: u32 = u8::MAX as u32;

    #[inline]
    fn to_u32(self) -> u32 {
        self as u32
    }

    #[inline]
    fn from_u32(v: u32) -> Self {
        v.min(<Self as Sample>::MAX) as u8
    }
}

impl Sample for u16 {
    const MAX: u32 = u16::MAX as u32;

    #[inline]
    fn to_u32(self) -> u32 {
        self as u32
    }

    #[inline]
    fn from_u32(v: u32) -> Self {
        v.min(<Self as Sample>::MAX) as u16
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_u8_saturates() {
        assert_eq!(u8::from_u32(255), 255);
        assert_eq!(u8::from_u32(1000), 255);
        assert_eq!(u8::from_f32(2.0), 255);
        assert_eq!(u8::from_f32(-1.0), 0);
        assert_eq!(u8::from_f32(f32::NAN), 0);
    }

    #[test]
    fn test_u16_normalize() {
        assert_relative_eq!(65535u16.to_f32(), 1.0);
        assert_relative_eq!(0u16.to_f32(), 0.0);
        assert_eq!(<u16 as Sample>::from_f32(0.5), 32768);
    }

    #[test]
    fn test_u16_saturates() {
        assert_eq!(u16::from_u32(65535), 65535);
        assert_eq!(u16::from_u32(70_000), 65535);
        assert_eq!(u16::from_u32(u32::MAX), 65535);
        assert_eq!(<u16 as Sample>::MAX, 65535);
    }
}
