//! Hagan–West monotone-convex interpolation.
//!
//! The ordinates are zero rates `z_i` at times `x_i`. The scheme builds a
//! continuous instantaneous-forward curve whose average over every interval
//! matches the discrete forward implied by the adjacent zero rates, then
//! reads zero rates back as `z(x) = (1/x) ∫ f`. Node forwards are weighted
//! averages of the neighbouring discrete forwards; inside each interval the
//! forward departs from its discrete value by a quadratic or a piecewise
//! quadratic, chosen so that it stays between its end values where
//! possible.
//!
//! Every node's forward depends on both neighbouring intervals, so a change
//! to one zero rate reshapes three intervals and the refit is done in full.

use pillar_core::errors::Result;
use pillar_core::Real;

use super::{check_nodes, check_update, locate, Interpolation1D};

const SIMPSON_PANELS: usize = 32;

/// Monotone-convex interpolation of zero rates.
#[derive(Debug, Clone)]
pub struct ConvexMonotoneInterpolation {
    xs: Vec<Real>,
    ys: Vec<Real>,
    // discrete forward on (x[i-1], x[i]], index 0 unused
    discrete: Vec<Real>,
    // instantaneous forward at each node
    node_forwards: Vec<Real>,
    // ∫ z from x[0] to x[i]
    primitive: Vec<Real>,
}

impl ConvexMonotoneInterpolation {
    /// Fit the scheme to zero rates `ys` at times `xs`.
    pub fn new(xs: &[Real], ys: &[Real]) -> Result<Self> {
        check_nodes(xs, ys, 2)?;
        let n = xs.len();
        let mut interp = Self {
            xs: xs.to_vec(),
            ys: ys.to_vec(),
            discrete: vec![0.0; n],
            node_forwards: vec![0.0; n],
            primitive: vec![0.0; n],
        };
        interp.fit();
        Ok(interp)
    }

    fn fit(&mut self) {
        let n = self.xs.len();
        let (xs, ys) = (&self.xs, &self.ys);
        for i in 1..n {
            self.discrete[i] = (ys[i] * xs[i] - ys[i - 1] * xs[i - 1]) / (xs[i] - xs[i - 1]);
        }

        let fd = &self.discrete;
        let f = &mut self.node_forwards;
        if n == 2 {
            f[0] = fd[1];
            f[1] = fd[1];
        } else {
            let m = n - 1;
            for i in 1..m {
                let h_left = xs[i] - xs[i - 1];
                let h_right = xs[i + 1] - xs[i];
                f[i] = (h_left * fd[i + 1] + h_right * fd[i]) / (h_left + h_right);
            }
            f[0] = fd[1] - 0.5 * (f[1] - fd[1]);
            f[m] = fd[m] - 0.5 * (f[m - 1] - fd[m]);
        }

        for i in 1..n {
            let segment = self.simpson(xs[i - 1], xs[i]);
            self.primitive[i] = self.primitive[i - 1] + segment;
        }
    }

    /// `∫ f` from 0 to `x`, i.e. `z(x)·x`.
    fn integrated_forward(&self, x: Real) -> Real {
        let n = self.xs.len();
        let (xs, ys) = (&self.xs, &self.ys);
        if x >= xs[n - 1] {
            return ys[n - 1] * xs[n - 1] + self.node_forwards[n - 1] * (x - xs[n - 1]);
        }
        let i = locate(xs, x) + 1;
        let h = xs[i] - xs[i - 1];
        let u = ((x - xs[i - 1]) / h).clamp(0.0, 1.0);
        let (_, big_g) = self.shape(i, u);
        ys[i - 1] * xs[i - 1] + (x - xs[i - 1]) * self.discrete[i] + h * big_g
    }

    /// Instantaneous forward at `x`.
    fn forward(&self, x: Real) -> Real {
        let n = self.xs.len();
        if x >= self.xs[n - 1] {
            return self.node_forwards[n - 1];
        }
        let i = locate(&self.xs, x) + 1;
        let h = self.xs[i] - self.xs[i - 1];
        let u = ((x - self.xs[i - 1]) / h).clamp(0.0, 1.0);
        self.discrete[i] + self.shape(i, u).0
    }

    /// Departure `g(u)` of the forward from the discrete forward on interval
    /// `i` and its integral `G(u) = ∫₀ᵘ g`, with `u ∈ [0, 1]`.
    fn shape(&self, i: usize, u: Real) -> (Real, Real) {
        let g0 = self.node_forwards[i - 1] - self.discrete[i];
        let g1 = self.node_forwards[i] - self.discrete[i];

        if g0 == 0.0 && g1 == 0.0 {
            return (0.0, 0.0);
        }

        // (i) plain quadratic
        if (g0 < 0.0 && -0.5 * g0 <= g1 && g1 <= -2.0 * g0)
            || (g0 > 0.0 && -0.5 * g0 >= g1 && g1 >= -2.0 * g0)
        {
            let g = g0 * (1.0 - 4.0 * u + 3.0 * u * u) + g1 * (-2.0 * u + 3.0 * u * u);
            let big_g = g0 * (u - 2.0 * u * u + u * u * u) + g1 * (-u * u + u * u * u);
            return (g, big_g);
        }

        // (ii) flat, then quadratic up to g1
        if (g0 <= 0.0 && g1 > -2.0 * g0) || (g0 >= 0.0 && g1 < -2.0 * g0) {
            let eta = (g1 + 2.0 * g0) / (g1 - g0);
            if u <= eta {
                return (g0, g0 * u);
            }
            let w = (u - eta) / (1.0 - eta);
            let g = g0 + (g1 - g0) * w * w;
            let big_g = g0 * u + (g1 - g0) * (u - eta).powi(3) / (3.0 * (1.0 - eta).powi(2));
            return (g, big_g);
        }

        // (iii) quadratic from g0, then flat
        if (g0 > 0.0 && -0.5 * g0 < g1 && g1 <= 0.0) || (g0 < 0.0 && 0.0 <= g1 && g1 < -0.5 * g0) {
            let eta = 3.0 * g1 / (g1 - g0);
            if u < eta {
                let w = (eta - u) / eta;
                let g = g1 + (g0 - g1) * w * w;
                let big_g = g1 * u + (g0 - g1) * eta / 3.0 * (1.0 - w * w * w);
                return (g, big_g);
            }
            return (g1, g1 * u + (g0 - g1) * eta / 3.0);
        }

        // (iv) g0 and g1 share a sign: two quadratics meeting at a turning point
        let a = -g0 * g1 / (g0 + g1);
        let eta = g1 / (g0 + g1);
        if u <= eta && eta > 0.0 {
            let w = (eta - u) / eta;
            let g = a + (g0 - a) * w * w;
            let big_g = a * u + (g0 - a) * eta / 3.0 * (1.0 - w * w * w);
            return (g, big_g);
        }
        let w = (u - eta) / (1.0 - eta);
        let g = a + (g1 - a) * w * w;
        let big_g =
            a * u + (g0 - a) * eta / 3.0 + (g1 - a) * (u - eta).powi(3) / (3.0 * (1.0 - eta).powi(2));
        (g, big_g)
    }

    fn simpson(&self, a: Real, b: Real) -> Real {
        if b <= a {
            return 0.0;
        }
        let h = (b - a) / SIMPSON_PANELS as Real;
        let mut sum = self.value_at(a) + self.value_at(b);
        for k in 1..SIMPSON_PANELS {
            let weight = if k % 2 == 1 { 4.0 } else { 2.0 };
            sum += weight * self.value_at(a + k as Real * h);
        }
        sum * h / 3.0
    }
}

impl Interpolation1D for ConvexMonotoneInterpolation {
    fn xs(&self) -> &[Real] {
        &self.xs
    }

    fn ys(&self) -> &[Real] {
        &self.ys
    }

    fn value_at(&self, x: Real) -> Real {
        if x <= self.xs[0] {
            return self.ys[0];
        }
        self.integrated_forward(x) / x
    }

    fn derivative_at(&self, x: Real) -> Real {
        if x <= self.xs[0] {
            return 0.0;
        }
        (self.forward(x) - self.value_at(x)) / x
    }

    fn primitive_at(&self, x: Real) -> Real {
        let x0 = self.xs[0];
        if x <= x0 {
            return self.ys[0] * (x - x0);
        }
        let i = if x >= self.xs[self.xs.len() - 1] {
            self.xs.len() - 1
        } else {
            locate(&self.xs, x)
        };
        self.primitive[i] + self.simpson(self.xs[i], x)
    }

    fn update(&mut self, index: usize, y: Real) -> Result<()> {
        check_update(self.ys.len(), index, y)?;
        self.ys[index] = y;
        self.fit();
        Ok(())
    }
}
