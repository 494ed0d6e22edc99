//! Error types for pixel mapping.

use thiserror::Error;

/// Error type for mapping operations.
#[derive(Error, Debug)]
pub enum OpsError {
    /// Raster construction or layout error.
    #[error(transparent)]
    Core(#[from] retouch_core::Error),

    /// Curve fitting error.
    #[error(transparent)]
    Curve(#[from] retouch_curve::CurveError),

    /// Worker thread could not be started.
    #[error("failed to spawn mapping worker: {0}")]
    Spawn(#[source] std::io::Error),

    /// Worker thread is gone.
    #[error("mapping worker disconnected")]
    WorkerClosed,
}

/// Result type for mapping operations.
pub type OpsResult<T> = Result<T, OpsError>;
