//! Natural cubic spline.
//!
//! The spline is C² with zero second derivative at both end nodes. Its
//! second derivatives solve a tridiagonal system coupling every node, so a
//! change to any ordinate moves the whole curve: this is the global scheme
//! that makes one-pillar-at-a-time bootstrapping inconsistent and needs
//! repeated sweeps or a joint solve.

use pillar_core::errors::Result;
use pillar_core::Real;

use super::{check_nodes, check_update, locate, Interpolation1D};

/// Natural cubic spline through `(xs, ys)`.
///
/// On `[x_i, x_{i+1}]` with `t = x - x_i` the spline is
/// `y_i + t·(b_i + t·(c_i + t·d_i))`. Outside the node range the end
/// polynomials are continued.
#[derive(Debug, Clone)]
pub struct CubicNaturalSpline {
    xs: Vec<Real>,
    ys: Vec<Real>,
    b: Vec<Real>,
    c: Vec<Real>,
    d: Vec<Real>,
    primitive: Vec<Real>,
}

impl CubicNaturalSpline {
    /// Fit a natural spline. Two points give a straight line.
    pub fn new(xs: &[Real], ys: &[Real]) -> Result<Self> {
        check_nodes(xs, ys, 2)?;
        let n = xs.len();
        let mut spline = Self {
            xs: xs.to_vec(),
            ys: ys.to_vec(),
            b: vec![0.0; n - 1],
            c: vec![0.0; n - 1],
            d: vec![0.0; n - 1],
            primitive: vec![0.0; n],
        };
        spline.fit();
        Ok(spline)
    }

    /// Second derivatives at the nodes (Thomas algorithm).
    fn second_derivatives(&self) -> Vec<Real> {
        let n = self.xs.len();
        let mut m = vec![0.0; n];
        if n < 3 {
            return m;
        }
        let h: Vec<Real> = self.xs.windows(2).map(|w| w[1] - w[0]).collect();
        let s: Vec<Real> = (0..n - 1)
            .map(|i| (self.ys[i + 1] - self.ys[i]) / h[i])
            .collect();

        // interior equations i = 1..n-2:
        // h[i-1] m[i-1] + 2 (h[i-1] + h[i]) m[i] + h[i] m[i+1] = 6 (s[i] - s[i-1])
        let k = n - 2;
        let mut diag = vec![0.0; k];
        let mut rhs = vec![0.0; k];
        for j in 0..k {
            let i = j + 1;
            diag[j] = 2.0 * (h[i - 1] + h[i]);
            rhs[j] = 6.0 * (s[i] - s[i - 1]);
        }
        for j in 1..k {
            let w = h[j] / diag[j - 1];
            diag[j] -= w * h[j];
            rhs[j] -= w * rhs[j - 1];
        }
        m[k] = rhs[k - 1] / diag[k - 1];
        for j in (0..k - 1).rev() {
            m[j + 1] = (rhs[j] - h[j + 1] * m[j + 2]) / diag[j];
        }
        m
    }

    fn fit(&mut self) {
        let m = self.second_derivatives();
        for i in 0..self.xs.len() - 1 {
            let h = self.xs[i + 1] - self.xs[i];
            let slope = (self.ys[i + 1] - self.ys[i]) / h;
            self.b[i] = slope - h * (2.0 * m[i] + m[i + 1]) / 6.0;
            self.c[i] = 0.5 * m[i];
            self.d[i] = (m[i + 1] - m[i]) / (6.0 * h);
        }
        for i in 1..self.xs.len() {
            let h = self.xs[i] - self.xs[i - 1];
            self.primitive[i] = self.primitive[i - 1] + self.segment_primitive(i - 1, h);
        }
    }

    fn segment_primitive(&self, i: usize, t: Real) -> Real {
        t * (self.ys[i] + t * (self.b[i] / 2.0 + t * (self.c[i] / 3.0 + t * self.d[i] / 4.0)))
    }
}

impl Interpolation1D for CubicNaturalSpline {
    fn xs(&self) -> &[Real] {
        &self.xs
    }

    fn ys(&self) -> &[Real] {
        &self.ys
    }

    fn value_at(&self, x: Real) -> Real {
        let i = locate(&self.xs, x);
        let t = x - self.xs[i];
        self.ys[i] + t * (self.b[i] + t * (self.c[i] + t * self.d[i]))
    }

    fn derivative_at(&self, x: Real) -> Real {
        let i = locate(&self.xs, x);
        let t = x - self.xs[i];
        self.b[i] + t * (2.0 * self.c[i] + 3.0 * t * self.d[i])
    }

    fn primitive_at(&self, x: Real) -> Real {
        let i = locate(&self.xs, x);
        self.primitive[i] + self.segment_primitive(i, x - self.xs[i])
    }

    /// Full O(n) refit.
    fn update(&mut self, index: usize, y: Real) -> Result<()> {
        check_update(self.ys.len(), index, y)?;
        self.ys[index] = y;
        self.fit();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn reproduces_straight_lines() {
        let xs = [0.0, 1.0, 2.5, 4.0];
        let ys: Vec<Real> = xs.iter().map(|x| 1.0 + 2.0 * x).collect();
        let spline = CubicNaturalSpline::new(&xs, &ys).unwrap();
        for x in [0.3, 1.7, 3.9] {
            assert_abs_diff_eq!(spline.value_at(x), 1.0 + 2.0 * x, epsilon = 1e-12);
            assert_abs_diff_eq!(spline.derivative_at(x), 2.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn natural_end_conditions_and_continuity() {
        let xs = [0.0, 1.0, 2.0, 3.0, 5.0];
        let ys = [0.02, 0.03, 0.025, 0.035, 0.04];
        let spline = CubicNaturalSpline::new(&xs, &ys).unwrap();
        // zero curvature at the first node
        assert_abs_diff_eq!(spline.c[0], 0.0, epsilon = 1e-15);
        // first derivative is continuous across interior nodes
        for &x in &xs[1..4] {
            let left = spline.derivative_at(x - 1e-9);
            let right = spline.derivative_at(x + 1e-9);
            assert_abs_diff_eq!(left, right, epsilon = 1e-7);
        }
        // zero curvature at the last node
        let i = xs.len() - 2;
        let h = xs[i + 1] - xs[i];
        assert_abs_diff_eq!(2.0 * spline.c[i] + 6.0 * spline.d[i] * h, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn moving_one_node_moves_distant_intervals() {
        let xs = [0.0, 1.0, 2.0, 3.0, 4.0];
        let ys = [0.02, 0.021, 0.022, 0.023, 0.024];
        let mut spline = CubicNaturalSpline::new(&xs, &ys).unwrap();
        let before = spline.value_at(0.5);
        spline.update(4, 0.03).unwrap();
        assert!((spline.value_at(0.5) - before).abs() > 1e-6);
    }
}
