//! Backward-flat (piecewise constant) interpolation.

use pillar_core::errors::Result;
use pillar_core::Real;

use super::{check_nodes, check_update, Interpolation1D};

/// Piecewise-constant interpolation where `y[i]` holds on `(x[i-1], x[i]]`.
///
/// Left of `x[0]` the value is `y[0]`; right of the last node it is the last
/// value. Applied to instantaneous forwards this gives the classic
/// piecewise-flat forward curve.
#[derive(Debug, Clone)]
pub struct BackwardFlatInterpolation {
    xs: Vec<Real>,
    ys: Vec<Real>,
    primitive: Vec<Real>,
}

impl BackwardFlatInterpolation {
    /// Construct a backward-flat interpolation.
    pub fn new(xs: &[Real], ys: &[Real]) -> Result<Self> {
        check_nodes(xs, ys, 2)?;
        let mut interp = Self {
            xs: xs.to_vec(),
            ys: ys.to_vec(),
            primitive: vec![0.0; xs.len()],
        };
        interp.refresh_primitive(1);
        Ok(interp)
    }

    /// Index of the node whose value applies at `x`.
    fn node_for(&self, x: Real) -> usize {
        let n = self.xs.len();
        if x <= self.xs[0] {
            return 0;
        }
        if x > self.xs[n - 1] {
            return n - 1;
        }
        // first node with xs[i] >= x
        self.xs.partition_point(|&xi| xi < x)
    }

    fn refresh_primitive(&mut self, from: usize) {
        for i in from.max(1)..self.xs.len() {
            self.primitive[i] = self.primitive[i - 1] + self.ys[i] * (self.xs[i] - self.xs[i - 1]);
        }
    }
}

impl Interpolation1D for BackwardFlatInterpolation {
    fn xs(&self) -> &[Real] {
        &self.xs
    }

    fn ys(&self) -> &[Real] {
        &self.ys
    }

    fn value_at(&self, x: Real) -> Real {
        self.ys[self.node_for(x)]
    }

    fn derivative_at(&self, _x: Real) -> Real {
        0.0
    }

    fn primitive_at(&self, x: Real) -> Real {
        let n = self.xs.len();
        if x <= self.xs[0] {
            return self.ys[0] * (x - self.xs[0]);
        }
        if x > self.xs[n - 1] {
            return self.primitive[n - 1] + self.ys[n - 1] * (x - self.xs[n - 1]);
        }
        let i = self.node_for(x);
        self.primitive[i - 1] + self.ys[i] * (x - self.xs[i - 1])
    }

    fn update(&mut self, index: usize, y: Real) -> Result<()> {
        check_update(self.ys.len(), index, y)?;
        self.ys[index] = y;
        self.refresh_primitive(index);
        Ok(())
    }
}
