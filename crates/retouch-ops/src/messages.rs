//! Message types for caller <-> mapping worker communication.
//!
//! The caller sends commands, the worker sends back mapped images tagged
//! with the generation they were computed for.

use std::sync::Arc;

use retouch_core::{Raster, Sample};
use retouch_lut::ToneLut;

use crate::RgbToneCurves;

/// Generation counter for invalidating stale results.
pub type Generation = u64;

/// What to map the source image with.
#[derive(Debug, Clone, PartialEq)]
pub enum MapJob {
    /// One LUT for every sample.
    Lut(ToneLut),
    /// Per-channel curves plus master.
    Rgb(RgbToneCurves),
}

impl MapJob {
    /// Maps `src` into a new raster.
    pub fn run<T: Sample>(&self, src: &Raster<T>) -> Raster<T> {
        match self {
            Self::Lut(lut) => crate::mapper::apply_lut(src, lut),
            Self::Rgb(curves) => curves.apply(src),
        }
    }
}

impl From<ToneLut> for MapJob {
    fn from(lut: ToneLut) -> Self {
        Self::Lut(lut)
    }
}

impl From<RgbToneCurves> for MapJob {
    fn from(curves: RgbToneCurves) -> Self {
        Self::Rgb(curves)
    }
}

/// Messages from caller to worker thread.
#[derive(Debug)]
pub(crate) enum WorkerMsg<T: Sample> {
    /// Map the current source for `generation`.
    Map {
        /// Generation this job belongs to.
        generation: Generation,
        /// Mapping to run.
        job: MapJob,
    },

    /// Replace the source image.
    SetSource(Arc<Raster<T>>),

    /// Stop the worker.
    Close,
}

/// A mapped image produced by the worker.
#[derive(Debug, Clone, PartialEq)]
pub struct MappedImage<T: Sample> {
    /// Generation the image was computed for.
    pub generation: Generation,
    /// Mapped pixels.
    pub image: Raster<T>,
}
