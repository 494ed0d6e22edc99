//! Curve Builder: control points to [`ToneLut`].

use std::fmt;
use std::str::FromStr;

use retouch_lut::ToneLut;
use tracing::trace;

use crate::cardinal::CardinalSpline;
use crate::natural::NaturalSpline;
use crate::point::{ControlPoint, MIN_X_SPACING};
use crate::{CurveError, CurveResult};

/// A fitted, continuous tone curve.
pub trait Curve {
    /// Evaluates the curve at input fraction `x`, unclamped.
    fn eval(&self, x: f32) -> f32;

    /// Samples the curve into a 100-entry LUT, clamping every value.
    fn sample(&self) -> ToneLut {
        ToneLut::from_fn(|t| self.eval(t))
    }
}

/// Interpolation strategy.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum SplineKind {
    /// Global natural cubic spline, linear tails.
    #[default]
    Natural,
    /// Per-segment cardinal spline, flat tails. `tension = 0` is Catmull-Rom.
    Cardinal {
        /// Tangent scale is `1 - tension`.
        tension: f32,
    },
}

impl SplineKind {
    /// Catmull-Rom, the zero-tension cardinal spline.
    pub const CATMULL_ROM: Self = Self::Cardinal { tension: 0.0 };

    /// Short lowercase name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Natural => "natural",
            Self::Cardinal { .. } => "cardinal",
        }
    }
}

impl fmt::Display for SplineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Natural => f.write_str("natural"),
            Self::Cardinal { tension } => write!(f, "cardinal(tension={tension})"),
        }
    }
}

impl FromStr for SplineKind {
    type Err = String;

    /// Parses `natural`, `cardinal`, `catmull-rom` or `cardinal:<tension>`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        match lower.as_str() {
            "natural" => Ok(Self::Natural),
            "cardinal" | "catmull-rom" | "catmullrom" => Ok(Self::CATMULL_ROM),
            other => match other.strip_prefix("cardinal:") {
                Some(t) => t
                    .parse::<f32>()
                    .map(|tension| Self::Cardinal { tension })
                    .map_err(|e| format!("invalid tension '{t}': {e}")),
                None => Err(format!("unknown spline '{s}'")),
            },
        }
    }
}

/// A spline fitted by [`CurveBuilder::fit`].
#[derive(Debug, Clone, PartialEq)]
pub enum FittedCurve {
    /// Natural cubic fit.
    Natural(NaturalSpline),
    /// Cardinal fit.
    Cardinal(CardinalSpline),
}

impl Curve for FittedCurve {
    #[inline]
    fn eval(&self, x: f32) -> f32 {
        match self {
            Self::Natural(s) => s.eval(x),
            Self::Cardinal(s) => s.eval(x),
        }
    }
}

/// Fits control points and samples them into a [`ToneLut`].
///
/// Stateless apart from the chosen [`SplineKind`]; equal point sets in any
/// order produce bit-identical LUTs.
///
/// # Example
///
/// ```rust
/// use retouch_curve::{ControlPoint, CurveBuilder};
///
/// let points = [
///     ControlPoint::new("a", 1.0, 1.0),
///     ControlPoint::new("b", 0.0, 0.0),
/// ];
/// let lut = CurveBuilder::natural().build(&points).unwrap();
/// assert!(lut.is_identity(1e-6));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CurveBuilder {
    kind: SplineKind,
}

impl CurveBuilder {
    /// Creates a builder for `kind`.
    pub fn new(kind: SplineKind) -> Self {
        Self { kind }
    }

    /// Natural cubic builder.
    pub fn natural() -> Self {
        Self::new(SplineKind::Natural)
    }

    /// Cardinal builder with `tension`.
    pub fn cardinal(tension: f32) -> Self {
        Self::new(SplineKind::Cardinal { tension })
    }

    /// Current strategy.
    #[inline]
    pub fn kind(&self) -> SplineKind {
        self.kind
    }

    /// Fits a curve through `points`.
    ///
    /// # Errors
    ///
    /// [`CurveError::InvalidControlSet`] for fewer than two points or
    /// duplicate `x`, [`CurveError::NonFinite`] for NaN/infinite
    /// coordinates, [`CurveError::InvalidTension`] for a non-finite tension.
    pub fn fit(&self, points: &[ControlPoint]) -> CurveResult<FittedCurve> {
        let knots = knots(points)?;
        Ok(match self.kind {
            SplineKind::Natural => FittedCurve::Natural(NaturalSpline::fit(&knots)),
            SplineKind::Cardinal { tension } => {
                FittedCurve::Cardinal(CardinalSpline::fit(&knots, tension)?)
            }
        })
    }

    /// Builds the 100-sample LUT for `points`.
    pub fn build(&self, points: &[ControlPoint]) -> CurveResult<ToneLut> {
        trace!(kind = %self.kind, points = points.len(), "CurveBuilder::build");
        Ok(self.fit(points)?.sample())
    }

    /// Evaluates the fitted curve at one `x` without clamping.
    pub fn evaluate(&self, points: &[ControlPoint], x: f32) -> CurveResult<f32> {
        Ok(self.fit(points)?.eval(x))
    }
}

/// Validates `points` and returns `(x, y)` knots sorted by `x`.
fn knots(points: &[ControlPoint]) -> CurveResult<Vec<(f32, f32)>> {
    if points.len() < 2 {
        return Err(CurveError::invalid_set(format!(
            "need at least 2 control points, got {}",
            points.len()
        )));
    }
    if let Some(p) = points.iter().find(|p| !p.x.is_finite() || !p.y.is_finite()) {
        return Err(CurveError::NonFinite { x: p.x, y: p.y });
    }

    let mut knots: Vec<(f32, f32)> = points.iter().map(|p| (p.x, p.y)).collect();
    // Tie-break on y so equal sets in any order sort identically.
    knots.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.total_cmp(&b.1)));

    if let Some(w) = knots.windows(2).find(|w| w[1].0 - w[0].0 < MIN_X_SPACING) {
        return Err(CurveError::invalid_set(format!(
            "duplicate x = {} in control points",
            w[1].0
        )));
    }
    Ok(knots)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use retouch_lut::LUT_SIZE;

    fn pts(raw: &[(f32, f32)]) -> Vec<ControlPoint> {
        raw.iter()
            .enumerate()
            .map(|(i, &(x, y))| ControlPoint::new(format!("p{i}").as_str(), x, y))
            .collect()
    }

    #[test]
    fn test_identity_both_kinds() {
        let points = pts(&[(0.0, 0.0), (1.0, 1.0)]);
        for builder in [CurveBuilder::natural(), CurveBuilder::new(SplineKind::CATMULL_ROM)] {
            let lut = builder.build(&points).unwrap();
            assert_eq!(lut.samples().len(), LUT_SIZE);
            assert!(lut.is_identity(1e-6), "{:?}", builder.kind());
        }
    }

    #[test]
    fn test_overshoot_is_clamped() {
        let points = pts(&[(0.0, 0.0), (0.1, 1.0), (0.2, 0.0), (1.0, 1.0)]);
        let lut = CurveBuilder::natural().build(&points).unwrap();
        assert!(lut.samples().iter().all(|v| (0.0..=1.0).contains(v)));
        let raw_min = (0..LUT_SIZE)
            .map(|i| CurveBuilder::natural().evaluate(&points, ToneLut::input_at(i)).unwrap())
            .fold(f32::INFINITY, f32::min);
        assert!(raw_min < 0.0, "fixture should overshoot");
    }

    #[test]
    fn test_order_independent() {
        let a = pts(&[(0.0, 0.0), (0.3, 0.5), (0.7, 0.6), (1.0, 1.0)]);
        let mut b = a.clone();
        b.reverse();
        for builder in [CurveBuilder::natural(), CurveBuilder::cardinal(0.3)] {
            let la = builder.build(&a).unwrap();
            let lb = builder.build(&b).unwrap();
            assert_eq!(la.samples(), lb.samples());
        }
    }

    #[test]
    fn test_invalid_sets() {
        let builder = CurveBuilder::natural();
        assert!(matches!(
            builder.build(&pts(&[(0.5, 0.5)])),
            Err(CurveError::InvalidControlSet { .. })
        ));
        assert!(matches!(
            builder.build(&pts(&[(0.0, 0.0), (0.5, 0.2), (0.5, 0.9)])),
            Err(CurveError::InvalidControlSet { .. })
        ));
        assert!(matches!(
            builder.build(&pts(&[(0.0, f32::NAN), (1.0, 1.0)])),
            Err(CurveError::NonFinite { .. })
        ));
    }

    #[test]
    fn test_evaluate_hits_control_point() {
        let points = pts(&[(0.0, 0.0), (0.5, 0.8), (1.0, 1.0)]);
        let y = CurveBuilder::natural().evaluate(&points, 0.5).unwrap();
        assert_relative_eq!(y, 0.8, epsilon = 1e-6);
    }

    #[test]
    fn test_spline_kind_parse() {
        assert_eq!("natural".parse::<SplineKind>(), Ok(SplineKind::Natural));
        assert_eq!("Catmull-Rom".parse::<SplineKind>(), Ok(SplineKind::CATMULL_ROM));
        assert_eq!(
            "cardinal:0.5".parse::<SplineKind>(),
            Ok(SplineKind::Cardinal { tension: 0.5 })
        );
        assert!("bezier".parse::<SplineKind>().is_err());
    }
}
