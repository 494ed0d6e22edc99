//! LUT error types.

use thiserror::Error;

/// Result type for LUT operations.
pub type LutResult<T> = Result<T, LutError>;

/// Errors that can occur during LUT operations.
#[derive(Debug, Error)]
pub enum LutError {
    /// Wrong number of samples.
    #[error("invalid LUT size: expected {expected}, got {got}")]
    InvalidSize {
        /// Required sample count
        expected: usize,
        /// Supplied sample count
        got: usize,
    },

    /// A sample is NaN or infinite.
    #[error("non-finite LUT sample {value} at index {index}")]
    NonFinite {
        /// Index of the offending sample
        index: usize,
        /// Offending value
        value: f32,
    },
}
