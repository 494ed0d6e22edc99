//! Flat image buffer.
//!
//! [`Raster`] stores samples in **row-major** order, top-to-bottom, with
//! channels interleaved:
//!
//! ```text
//! Memory: [R G B R G B R G B ...]  <- Row 0
//!         [R G B R G B R G B ...]  <- Row 1
//!         ...
//! ```
//!
//! The buffer is a single `Vec<T>`; `clone()` is a deep copy, so a mapped
//! copy never aliases the source.
//!
//! # Usage
//!
//! ```rust
//! use retouch_core::Raster;
//!
//! let img: Raster<u8> = Raster::filled(8, 4, &[10, 20, 30, 255]).unwrap();
//! assert_eq!(img.channels(), 4);
//! assert_eq!(img.pixel(7, 3), Some(&[10, 20, 30, 255][..]));
//! assert_eq!(img.pixel(8, 0), None);
//! ```

use crate::{Error, Result, Sample};

/// Maximum supported channels per pixel.
pub const MAX_CHANNELS: usize = 4;

/// Owned, contiguous image buffer with `channels` interleaved samples per pixel.
#[derive(Debug, Clone, PartialEq)]
pub struct Raster<T: Sample> {
    data: Vec<T>,
    width: u32,
    height: u32,
    channels: usize,
}

/// Computes `width * height * channels`, rejecting zero sizes and overflow.
fn buffer_len(width: u32, height: u32, channels: usize) -> Result<usize> {
    if width == 0 || height == 0 {
        return Err(Error::invalid_dimensions(
            width,
            height,
            "width and height must be > 0",
        ));
    }
    if channels == 0 || channels > MAX_CHANNELS {
        return Err(Error::invalid_dimensions(
            width,
            height,
            format!("channel count {channels} outside 1..={MAX_CHANNELS}"),
        ));
    }
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|v| v.checked_mul(channels))
        .ok_or_else(|| Error::invalid_dimensions(width, height, "image dimensions overflow"))
}

impl<T: Sample> Raster<T> {
    /// Creates a zero-filled raster.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDimensions`] for zero sizes, unsupported channel
    /// counts or overflowing buffer sizes.
    pub fn new(width: u32, height: u32, channels: usize) -> Result<Self> {
        let len = buffer_len(width, height, channels)?;
        Ok(Self {
            data: vec![T::zero(); len],
            width,
            height,
            channels,
        })
    }

    /// Creates a raster from existing interleaved samples.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDimensions`] if `data.len()` differs from
    /// `width * height * channels`.
    pub fn from_data(width: u32, height: u32, channels: usize, data: Vec<T>) -> Result<Self> {
        let expected = buffer_len(width, height, channels)?;
        if data.len() != expected {
            return Err(Error::invalid_dimensions(
                width,
                height,
                format!("expected {} samples, got {}", expected, data.len()),
            ));
        }
        Ok(Self {
            data,
            width,
            height,
            channels,
        })
    }

    /// Creates a raster where every pixel equals `pixel`.
    ///
    /// The channel count is taken from `pixel.len()`.
    pub fn filled(width: u32, height: u32, pixel: &[T]) -> Result<Self> {
        let len = buffer_len(width, height, pixel.len())?;
        let mut data = Vec::with_capacity(len);
        for _ in 0..len / pixel.len() {
            data.extend_from_slice(pixel);
        }
        Ok(Self {
            data,
            width,
            height,
            channels: pixel.len(),
        })
    }

    /// Creates a zero-filled raster with the same layout as `self`.
    pub fn blank_like(&self) -> Self {
        Self {
            data: vec![T::zero(); self.data.len()],
            width: self.width,
            height: self.height,
            channels: self.channels,
        }
    }

    /// Returns the image width in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Returns the image height in pixels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Returns the image dimensions as (width, height).
    #[inline]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Returns the number of channels per pixel.
    #[inline]
    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Returns the total number of pixels.
    #[inline]
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Returns the number of samples in one row.
    #[inline]
    pub fn row_len(&self) -> usize {
        self.width as usize * self.channels
    }

    /// Returns the raw interleaved samples.
    #[inline]
    pub fn data(&self) -> &[T] {
        &self.data
    }

    /// Returns the raw interleaved samples mutably.
    #[inline]
    pub fn data_mut(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Consumes the raster and returns its sample buffer.
    #[inline]
    pub fn into_data(self) -> Vec<T> {
        self.data
    }

    #[inline]
    fn offset(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * self.channels
    }

    #[inline]
    fn in_bounds(&self, x: u32, y: u32) -> bool {
        x < self.width && y < self.height
    }

    /// Returns the channel samples of pixel (x, y), or `None` if out of bounds.
    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> Option<&[T]> {
        if !self.in_bounds(x, y) {
            return None;
        }
        let offset = self.offset(x, y);
        Some(&self.data[offset..offset + self.channels])
    }

    /// Overwrites pixel (x, y).
    ///
    /// # Errors
    ///
    /// [`Error::OutOfBounds`] for bad coordinates, [`Error::ChannelMismatch`]
    /// if `pixel.len()` differs from the channel count.
    pub fn set_pixel(&mut self, x: u32, y: u32, pixel: &[T]) -> Result<()> {
        if !self.in_bounds(x, y) {
            return Err(Error::out_of_bounds(x, y, self.width, self.height));
        }
        if pixel.len() != self.channels {
            return Err(Error::channel_mismatch(self.channels, pixel.len()));
        }
        let offset = self.offset(x, y);
        self.data[offset..offset + self.channels].copy_from_slice(pixel);
        Ok(())
    }

    /// Returns one sample, or `None` if (x, y, channel) is out of range.
    #[inline]
    pub fn sample(&self, x: u32, y: u32, channel: usize) -> Option<T> {
        if channel >= self.channels {
            return None;
        }
        self.pixel(x, y).map(|px| px[channel])
    }

    /// Overwrites one sample.
    pub fn set_sample(&mut self, x: u32, y: u32, channel: usize, value: T) -> Result<()> {
        if !self.in_bounds(x, y) {
            return Err(Error::out_of_bounds(x, y, self.width, self.height));
        }
        if channel >= self.channels {
            return Err(Error::channel_mismatch(self.channels, channel + 1));
        }
        let offset = self.offset(x, y);
        self.data[offset + channel] = value;
        Ok(())
    }

    /// Returns row `y`, or `None` if out of bounds.
    #[inline]
    pub fn row(&self, y: u32) -> Option<&[T]> {
        if y >= self.height {
            return None;
        }
        let start = y as usize * self.row_len();
        Some(&self.data[start..start + self.row_len()])
    }

    /// Iterates over rows.
    pub fn rows(&self) -> impl Iterator<Item = &[T]> {
        self.data.chunks_exact(self.row_len())
    }

    /// Iterates over pixels with their coordinates.
    pub fn pixels(&self) -> impl Iterator<Item = (u32, u32, &[T])> {
        let width = self.width;
        self.data
            .chunks_exact(self.channels)
            .enumerate()
            .map(move |(i, px)| ((i % width as usize) as u32, (i / width as usize) as u32, px))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_zeroed() {
        let img: Raster<u8> = Raster::new(3, 2, 3).unwrap();
        assert_eq!(img.data().len(), 18);
        assert!(img.data().iter().all(|&v| v == 0));
    }

    #[test]
    fn test_rejects_bad_dimensions() {
        assert!(Raster::<u8>::new(0, 10, 3).is_err());
        assert!(Raster::<u8>::new(10, 10, 0).is_err());
        assert!(Raster::<u8>::new(10, 10, 5).is_err());
        assert!(Raster::<u8>::from_data(2, 2, 3, vec![0; 11]).is_err());
    }

    #[test]
    fn test_pixel_access() {
        let mut img: Raster<u16> = Raster::new(4, 4, 3).unwrap();
        img.set_pixel(2, 3, &[1, 2, 3]).unwrap();
        assert_eq!(img.pixel(2, 3), Some(&[1u16, 2, 3][..]));
        assert_eq!(img.sample(2, 3, 2), Some(3));
        assert_eq!(img.sample(2, 3, 3), None);
        assert!(img.set_pixel(4, 0, &[0, 0, 0]).is_err());
        assert!(img.set_pixel(0, 0, &[0, 0]).is_err());
    }

    #[test]
    fn test_rows_and_pixels() {
        let data: Vec<u8> = (0..12).collect();
        let img = Raster::from_data(2, 3, 2, data).unwrap();
        assert_eq!(img.row(1), Some(&[4u8, 5, 6, 7][..]));
        assert_eq!(img.rows().count(), 3);

        let (x, y, px) = img.pixels().nth(3).unwrap();
        assert_eq!((x, y), (1, 1));
        assert_eq!(px, &[6, 7]);
    }

    #[test]
    fn test_clone_is_deep() {
        let src: Raster<u8> = Raster::filled(2, 2, &[7]).unwrap();
        let mut copy = src.clone();
        copy.set_sample(0, 0, 0, 9).unwrap();
        assert_eq!(src.sample(0, 0, 0), Some(7));
        assert_eq!(copy.sample(0, 0, 0), Some(9));
    }
}
