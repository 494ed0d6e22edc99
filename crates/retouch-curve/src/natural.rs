//! Global natural cubic spline.
//!
//! Solves for the second derivatives `m` at every knot with `m[0] = m[n] = 0`
//! (tridiagonal system, Thomas algorithm). Outside the knot span the curve
//! continues along the end tangent, which is the "linear-like" tail of a
//! natural spline.

use crate::Curve;

/// Fitted natural cubic spline.
#[derive(Debug, Clone, PartialEq)]
pub struct NaturalSpline {
    xs: Vec<f64>,
    ys: Vec<f64>,
    /// Second derivative at each knot.
    m: Vec<f64>,
}

impl NaturalSpline {
    /// Fits a spline through `(x, y)` knots.
    ///
    /// Knots must be sorted by strictly increasing `x` and number at least
    /// two; [`crate::CurveBuilder`] validates this before fitting.
    pub(crate) fn fit(knots: &[(f32, f32)]) -> Self {
        let xs: Vec<f64> = knots.iter().map(|&(x, _)| x as f64).collect();
        let ys: Vec<f64> = knots.iter().map(|&(_, y)| y as f64).collect();
        let n = xs.len();
        let mut m = vec![0.0; n];

        if n > 2 {
            // Interior equations i = 1..n-1:
            // h[i-1] m[i-1] + 2 (h[i-1] + h[i]) m[i] + h[i] m[i+1] = 6 (d[i] - d[i-1])
            let h: Vec<f64> = xs.windows(2).map(|w| w[1] - w[0]).collect();
            let d: Vec<f64> = (0..n - 1).map(|i| (ys[i + 1] - ys[i]) / h[i]).collect();

            let size = n - 2;
            let mut diag = vec![0.0; size];
            let mut rhs = vec![0.0; size];
            for k in 0..size {
                let i = k + 1;
                diag[k] = 2.0 * (h[i - 1] + h[i]);
                rhs[k] = 6.0 * (d[i] - d[i - 1]);
            }

            // Forward sweep; sub- and super-diagonal of row k are h[k] and h[k+1].
            for k in 1..size {
                let w = h[k] / diag[k - 1];
                diag[k] -= w * h[k];
                rhs[k] -= w * rhs[k - 1];
            }
            // Back substitution
            m[size] = rhs[size - 1] / diag[size - 1];
            for k in (0..size - 1).rev() {
                m[k + 1] = (rhs[k] - h[k + 1] * m[k + 2]) / diag[k];
            }
        }

        Self { xs, ys, m }
    }

    fn start_slope(&self) -> f64 {
        let h = self.xs[1] - self.xs[0];
        (self.ys[1] - self.ys[0]) / h - h * (2.0 * self.m[0] + self.m[1]) / 6.0
    }

    fn end_slope(&self) -> f64 {
        let n = self.xs.len() - 1;
        let h = self.xs[n] - self.xs[n - 1];
        (self.ys[n] - self.ys[n - 1]) / h + h * (self.m[n - 1] + 2.0 * self.m[n]) / 6.0
    }
}

impl Curve for NaturalSpline {
    fn eval(&self, x: f32) -> f32 {
        let x = x as f64;
        let last = self.xs.len() - 1;

        if x <= self.xs[0] {
            return (self.ys[0] + (x - self.xs[0]) * self.start_slope()) as f32;
        }
        if x >= self.xs[last] {
            return (self.ys[last] + (x - self.xs[last]) * self.end_slope()) as f32;
        }

        // First knot strictly greater than x, minus one.
        let seg = self.xs.partition_point(|&k| k <= x).saturating_sub(1).min(last - 1);
        let h = self.xs[seg + 1] - self.xs[seg];
        let a = (self.xs[seg + 1] - x) / h;
        let b = (x - self.xs[seg]) / h;
        let y = a * self.ys[seg]
            + b * self.ys[seg + 1]
            + ((a * a * a - a) * self.m[seg] + (b * b * b - b) * self.m[seg + 1]) * h * h / 6.0;
        y as f32
    }
}
