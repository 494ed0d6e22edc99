//! Per-segment cardinal (Catmull-Rom family) spline.
//!
//! Each segment is a cubic Hermite polynomial. The tangent at interior knot
//! `k` is `(1 - tension) * (y[k+1] - y[k-1]) / (x[k+1] - x[k-1])`; the first
//! and last knot use the one-sided secant scaled the same way. Beyond the
//! knot span the curve is held flat at the end value.

use crate::{Curve, CurveError, CurveResult};

/// Fitted cardinal spline.
#[derive(Debug, Clone, PartialEq)]
pub struct CardinalSpline {
    xs: Vec<f32>,
    ys: Vec<f32>,
    tangents: Vec<f32>,
    tension: f32,
}

impl CardinalSpline {
    /// Fits a spline through sorted, distinct-x knots.
    ///
    /// # Errors
    ///
    /// [`CurveError::InvalidTension`] if `tension` is not finite.
    pub(crate) fn fit(knots: &[(f32, f32)], tension: f32) -> CurveResult<Self> {
        if !tension.is_finite() {
            return Err(CurveError::InvalidTension(tension));
        }
        let xs: Vec<f32> = knots.iter().map(|&(x, _)| x).collect();
        let ys: Vec<f32> = knots.iter().map(|&(_, y)| y).collect();
        let n = xs.len();
        let scale = 1.0 - tension;

        let tangents = (0..n)
            .map(|k| {
                let lo = k.saturating_sub(1);
                let hi = (k + 1).min(n - 1);
                scale * (ys[hi] - ys[lo]) / (xs[hi] - xs[lo])
            })
            .collect();

        Ok(Self {
            xs,
            ys,
            tangents,
            tension,
        })
    }

    /// Tension used for the fit.
    pub fn tension(&self) -> f32 {
        self.tension
    }
}

impl Curve for CardinalSpline {
    fn eval(&self, x: f32) -> f32 {
        let last = self.xs.len() - 1;
        if x <= self.xs[0] {
            return self.ys[0];
        }
        if x >= self.xs[last] {
            return self.ys[last];
        }

        let seg = self.xs.partition_point(|&k| k <= x).saturating_sub(1).min(last - 1);
        let h = self.xs[seg + 1] - self.xs[seg];
        let t = (x - self.xs[seg]) / h;
        let t2 = t * t;
        let t3 = t2 * t;

        let h00 = 2.0 * t3 - 3.0 * t2 + 1.0;
        let h10 = t3 - 2.0 * t2 + t;
        let h01 = -2.0 * t3 + 3.0 * t2;
        let h11 = t3 - t2;

        h00 * self.ys[seg]
            + h10 * h * self.tangents[seg]
            + h01 * self.ys[seg + 1]
            + h11 * h * self.tangents[seg + 1]
    }
}
