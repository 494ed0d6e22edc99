//! Tone curves from control points.
//!
//! - [`ControlPointSet`] - copy-on-write, id-keyed point editing
//! - [`CurveBuilder`] - natural or cardinal spline fit, sampled into a
//!   100-entry [`ToneLut`](retouch_lut::ToneLut)
//! - [`CurveSession`] - editing session that rebuilds and notifies on change
//! - [`CurvePreset`] - YAML presets
//!
//! # Example
//!
//! ```rust
//! use retouch_curve::{ControlPointSet, CurveBuilder};
//!
//! let (points, _) = ControlPointSet::new().with_added(0.5, 0.8).unwrap();
//! let lut = CurveBuilder::natural().build(points.as_slice()).unwrap();
//! assert!((lut.lookup(0.5) - 0.8).abs() < 1e-6);
//! ```

#![warn(missing_docs)]

mod builder;
mod cardinal;
mod error;
mod natural;
mod point;
mod preset;
mod session;

pub use builder::{Curve, CurveBuilder, FittedCurve, SplineKind};
pub use cardinal::CardinalSpline;
pub use error::{CurveError, CurveResult};
pub use natural::NaturalSpline;
pub use point::{ControlPoint, ControlPointSet, MIN_X_SPACING, PointId};
pub use preset::{CurvePreset, PresetPoint, SplineName};
pub use session::{ChangeListener, CurveSession};
