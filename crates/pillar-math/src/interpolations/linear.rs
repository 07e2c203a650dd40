//! Linear and log-linear interpolation.

use pillar_core::errors::Result;
use pillar_core::{ensure, Real};

use super::{check_nodes, check_update, locate, Interpolation1D};

// ── Linear ────────────────────────────────────────────────────────────────────

/// Linear interpolation.
///
/// `f(x) = y[i] + (y[i+1] - y[i]) * (x - x[i]) / (x[i+1] - x[i])`,
/// continued with the end slopes outside the node range.
#[derive(Debug, Clone)]
pub struct LinearInterpolation {
    xs: Vec<Real>,
    ys: Vec<Real>,
    slopes: Vec<Real>,
    // integral from xs[0] to xs[i]
    primitive: Vec<Real>,
}

impl LinearInterpolation {
    /// Construct a linear interpolation from sorted `xs` and corresponding `ys`.
    ///
    /// # Errors
    /// Returns an error if the slices have different lengths, fewer than 2
    /// points, or non-increasing abscissae.
    pub fn new(xs: &[Real], ys: &[Real]) -> Result<Self> {
        check_nodes(xs, ys, 2)?;
        let mut interp = Self {
            xs: xs.to_vec(),
            ys: ys.to_vec(),
            slopes: vec![0.0; xs.len() - 1],
            primitive: vec![0.0; xs.len()],
        };
        for i in 0..xs.len() - 1 {
            interp.refresh_slope(i);
        }
        interp.refresh_primitive(1);
        Ok(interp)
    }

    fn refresh_slope(&mut self, i: usize) {
        self.slopes[i] = (self.ys[i + 1] - self.ys[i]) / (self.xs[i + 1] - self.xs[i]);
    }

    fn refresh_primitive(&mut self, from: usize) {
        for i in from.max(1)..self.xs.len() {
            let dx = self.xs[i] - self.xs[i - 1];
            self.primitive[i] = self.primitive[i - 1] + dx * (self.ys[i - 1] + 0.5 * self.slopes[i - 1] * dx);
        }
    }
}

impl Interpolation1D for LinearInterpolation {
    fn xs(&self) -> &[Real] {
        &self.xs
    }

    fn ys(&self) -> &[Real] {
        &self.ys
    }

    fn value_at(&self, x: Real) -> Real {
        let i = locate(&self.xs, x);
        self.ys[i] + (x - self.xs[i]) * self.slopes[i]
    }

    fn derivative_at(&self, x: Real) -> Real {
        self.slopes[locate(&self.xs, x)]
    }

    fn primitive_at(&self, x: Real) -> Real {
        let i = locate(&self.xs, x);
        let dx = x - self.xs[i];
        self.primitive[i] + dx * (self.ys[i] + 0.5 * self.slopes[i] * dx)
    }

    /// O(1) for the slopes; the running integral is refreshed from `index`
    /// on, which is O(1) when the last node moves.
    fn update(&mut self, index: usize, y: Real) -> Result<()> {
        check_update(self.ys.len(), index, y)?;
        self.ys[index] = y;
        if index > 0 {
            self.refresh_slope(index - 1);
        }
        if index + 1 < self.xs.len() {
            self.refresh_slope(index);
        }
        self.refresh_primitive(index);
        Ok(())
    }
}

// ── Log-linear ────────────────────────────────────────────────────────────────

/// Log-linear interpolation.
///
/// Interpolates `ln(y)` linearly and exponentiates the result, so the
/// function is piecewise exponential. All ordinates must be positive.
#[derive(Debug, Clone)]
pub struct LogLinearInterpolation {
    ys: Vec<Real>,
    logs: LinearInterpolation,
    // integral from xs[0] to xs[i]
    primitive: Vec<Real>,
}

impl LogLinearInterpolation {
    /// Construct a log-linear interpolation.
    ///
    /// # Errors
    /// All `ys` values must be strictly positive.
    pub fn new(xs: &[Real], ys: &[Real]) -> Result<Self> {
        check_nodes(xs, ys, 2)?;
        ensure!(
            ys.iter().all(|&y| y > 0.0),
            "all y values must be positive for log-linear interpolation"
        );
        let log_ys: Vec<Real> = ys.iter().map(|&y| y.ln()).collect();
        let mut interp = Self {
            ys: ys.to_vec(),
            logs: LinearInterpolation::new(xs, &log_ys)?,
            primitive: vec![0.0; xs.len()],
        };
        interp.refresh_primitive(1);
        Ok(interp)
    }

    // ∫ exp(a + b·s) ds over [0, dx]
    fn segment_integral(&self, i: usize, dx: Real) -> Real {
        let b = self.logs.slopes[i];
        let start = self.ys[i];
        if (b * dx).abs() < 1e-10 {
            start * dx * (1.0 + 0.5 * b * dx)
        } else {
            start * ((b * dx).exp_m1()) / b
        }
    }

    fn refresh_primitive(&mut self, from: usize) {
        let xs = &self.logs.xs;
        for i in from.max(1)..xs.len() {
            let dx = xs[i] - xs[i - 1];
            self.primitive[i] = self.primitive[i - 1] + self.segment_integral(i - 1, dx);
        }
    }
}

impl Interpolation1D for LogLinearInterpolation {
    fn xs(&self) -> &[Real] {
        self.logs.xs()
    }

    fn ys(&self) -> &[Real] {
        &self.ys
    }

    fn value_at(&self, x: Real) -> Real {
        self.logs.value_at(x).exp()
    }

    fn derivative_at(&self, x: Real) -> Real {
        self.value_at(x) * self.logs.derivative_at(x)
    }

    fn primitive_at(&self, x: Real) -> Real {
        let i = locate(self.logs.xs(), x);
        self.primitive[i] + self.segment_integral(i, x - self.logs.xs[i])
    }

    fn update(&mut self, index: usize, y: Real) -> Result<()> {
        check_update(self.ys.len(), index, y)?;
        ensure!(y > 0.0, "log-linear interpolation needs positive values, got {y}");
        self.logs.update(index, y.ln())?;
        self.ys[index] = y;
        self.refresh_primitive(index);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn linear_interpolation() {
        let xs = [0.0, 1.0, 2.0];
        let ys = [0.0, 1.0, 4.0];
        let interp = LinearInterpolation::new(&xs, &ys).unwrap();
        assert_abs_diff_eq!(interp.value_at(0.5), 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(interp.value_at(1.5), 2.5, epsilon = 1e-12);
        assert_abs_diff_eq!(interp.derivative_at(1.5), 3.0, epsilon = 1e-12);
        // ∫0^2 = 0.5 + 2.5
        assert_abs_diff_eq!(interp.primitive_at(2.0), 3.0, epsilon = 1e-12);
        // extrapolation continues the end slope
        assert_abs_diff_eq!(interp.value_at(3.0), 7.0, epsilon = 1e-12);
    }

    #[test]
    fn log_linear_interpolation() {
        let xs = [0.0, 1.0];
        let ys = [1.0, std::f64::consts::E];
        let interp = LogLinearInterpolation::new(&xs, &ys).unwrap();
        let expected = std::f64::consts::E.sqrt();
        assert_abs_diff_eq!(interp.value_at(0.5), expected, epsilon = 1e-12);
        assert_abs_diff_eq!(interp.derivative_at(0.5), expected, epsilon = 1e-12);
        assert_abs_diff_eq!(
            interp.primitive_at(1.0),
            std::f64::consts::E - 1.0,
            epsilon = 1e-12
        );
    }

    #[test]
    fn log_linear_of_discount_factors_gives_flat_forwards() {
        let xs = [0.0, 1.0, 3.0];
        let ys = [1.0, (-0.02_f64).exp(), (-0.08_f64).exp()];
        let interp = LogLinearInterpolation::new(&xs, &ys).unwrap();
        // -d ln P / dt is 2% then 3%
        assert_abs_diff_eq!(-interp.derivative_at(0.5) / interp.value_at(0.5), 0.02, epsilon = 1e-12);
        assert_abs_diff_eq!(-interp.derivative_at(2.0) / interp.value_at(2.0), 0.03, epsilon = 1e-12);
    }

    #[test]
    fn log_linear_update_rejects_non_positive() {
        let mut interp = LogLinearInterpolation::new(&[0.0, 1.0], &[1.0, 0.9]).unwrap();
        assert!(interp.update(1, 0.0).is_err());
        assert!(interp.update(1, 0.95).is_ok());
        assert_abs_diff_eq!(interp.value_at(1.0), 0.95, epsilon = 1e-15);
    }
}
