//! Error types for curve fitting and editing.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for curve operations.
pub type CurveResult<T> = Result<T, CurveError>;

/// Errors that can occur while fitting or editing a tone curve.
#[derive(Debug, Error)]
pub enum CurveError {
    /// Control points cannot be fitted (fewer than 2, or degenerate spacing).
    #[error("invalid control set: {reason}")]
    InvalidControlSet {
        /// What is wrong with the set
        reason: String,
    },

    /// Two control points would share the same x.
    #[error("duplicate control point x = {x}")]
    DuplicateX {
        /// The colliding input position
        x: f32,
    },

    /// A coordinate is NaN or infinite.
    #[error("non-finite control point ({x}, {y})")]
    NonFinite {
        /// Requested x
        x: f32,
        /// Requested y
        y: f32,
    },

    /// Cardinal tension is NaN or infinite.
    #[error("invalid spline tension: {0}")]
    InvalidTension(f32),

    /// Preset file not found.
    #[error("preset file not found: {path}")]
    PresetNotFound {
        /// Path that was read
        path: PathBuf,
    },

    /// YAML parsing error.
    #[error("preset parse error: {0}")]
    Preset(#[from] serde_yaml::Error),

    /// I/O error reading a preset.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CurveError {
    /// Creates a [`CurveError::InvalidControlSet`] error.
    #[inline]
    pub fn invalid_set(reason: impl Into<String>) -> Self {
        Self::InvalidControlSet {
            reason: reason.into(),
        }
    }
}
