//! Uniform structured grid and dense node fields.
//!
//! Nodes are addressed `(i, j)` with `i` along x and `j` along y. Storage is a
//! single flat allocation in i-major order (`offset = i * jmax + j`), so one
//! "row" of the backing store is a fixed-`i` column of the physical grid.
//! Accessors bounds-check with `debug_assert!` so test builds catch stray
//! stencil reads; release builds rely on the slice check alone.

use crate::error::{CfError, CfResult};
use crate::numeric::Real;
use core::ops::{Index, IndexMut, Range};

/// Number of coupled equations / channels per node (mass, x-momentum, y-momentum).
pub const NEQ: usize = 3;

/// Smallest grid the one-sided wall extrapolation can be evaluated on.
pub const MIN_NODES: usize = 3;

/// Primitive variable stored in one channel of a [`Field3`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Channel {
    Pressure = 0,
    XVelocity = 1,
    YVelocity = 2,
}

impl Channel {
    pub const ALL: [Channel; NEQ] = [Channel::Pressure, Channel::XVelocity, Channel::YVelocity];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }
}

/// Rectangular domain sampled by `imax × jmax` equally spaced nodes.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GridGeometry {
    pub imax: usize,
    pub jmax: usize,
    pub xmin: Real,
    pub xmax: Real,
    pub ymin: Real,
    pub ymax: Real,
}

impl GridGeometry {
    pub fn new(
        imax: usize,
        jmax: usize,
        (xmin, xmax): (Real, Real),
        (ymin, ymax): (Real, Real),
    ) -> CfResult<Self> {
        if imax < MIN_NODES || jmax < MIN_NODES {
            return Err(CfError::GridTooSmall {
                what: "grid dimensions",
                imax,
                jmax,
                min: MIN_NODES,
            });
        }
        if !(xmax - xmin).is_finite() || xmax <= xmin {
            return Err(CfError::InvalidArg {
                what: "x extent must be finite and positive",
            });
        }
        if !(ymax - ymin).is_finite() || ymax <= ymin {
            return Err(CfError::InvalidArg {
                what: "y extent must be finite and positive",
            });
        }
        Ok(Self {
            imax,
            jmax,
            xmin,
            xmax,
            ymin,
            ymax,
        })
    }

    #[inline]
    pub fn dx(&self) -> Real {
        (self.xmax - self.xmin) / (self.imax - 1) as Real
    }

    #[inline]
    pub fn dy(&self) -> Real {
        (self.ymax - self.ymin) / (self.jmax - 1) as Real
    }

    #[inline]
    pub fn x(&self, i: usize) -> Real {
        self.xmin + self.dx() * i as Real
    }

    #[inline]
    pub fn y(&self, j: usize) -> Real {
        self.ymin + self.dy() * j as Real
    }

    pub fn node_count(&self) -> usize {
        self.imax * self.jmax
    }

    /// Interior node range along x: `1..imax-1`.
    pub fn interior_i(&self) -> Range<usize> {
        1..self.imax - 1
    }

    /// Interior node range along y: `1..jmax-1`.
    pub fn interior_j(&self) -> Range<usize> {
        1..self.jmax - 1
    }

    /// Node nearest the domain centre (exact centre for odd counts).
    pub fn center(&self) -> (usize, usize) {
        ((self.imax - 1) / 2, (self.jmax - 1) / 2)
    }
}

/// One scalar per node.
#[derive(Clone, Debug, PartialEq)]
pub struct Field2 {
    imax: usize,
    jmax: usize,
    data: Vec<Real>,
}

impl Field2 {
    pub fn new(imax: usize, jmax: usize) -> Self {
        Self::filled(imax, jmax, 0.0)
    }

    pub fn filled(imax: usize, jmax: usize, value: Real) -> Self {
        Self {
            imax,
            jmax,
            data: vec![value; imax * jmax],
        }
    }

    pub fn for_grid(grid: &GridGeometry) -> Self {
        Self::new(grid.imax, grid.jmax)
    }

    #[inline]
    pub fn dims(&self) -> (usize, usize) {
        (self.imax, self.jmax)
    }

    #[inline]
    fn offset(&self, i: usize, j: usize) -> usize {
        debug_assert!(
            i < self.imax && j < self.jmax,
            "Field2 index ({i}, {j}) out of bounds for {}x{}",
            self.imax,
            self.jmax
        );
        i * self.jmax + j
    }

    pub fn fill(&mut self, value: Real) {
        self.data.fill(value);
    }

    pub fn as_slice(&self) -> &[Real] {
        &self.data
    }
}

impl Index<(usize, usize)> for Field2 {
    type Output = Real;

    #[inline]
    fn index(&self, (i, j): (usize, usize)) -> &Real {
        &self.data[self.offset(i, j)]
    }
}

impl IndexMut<(usize, usize)> for Field2 {
    #[inline]
    fn index_mut(&mut self, (i, j): (usize, usize)) -> &mut Real {
        let k = self.offset(i, j);
        &mut self.data[k]
    }
}

/// `NEQ` scalars per node, ordered `[p, u, v]`.
#[derive(Clone, Debug, PartialEq)]
pub struct Field3 {
    imax: usize,
    jmax: usize,
    data: Vec<[Real; NEQ]>,
}

impl Field3 {
    pub fn new(imax: usize, jmax: usize) -> Self {
        Self::filled(imax, jmax, [0.0; NEQ])
    }

    pub fn filled(imax: usize, jmax: usize, node: [Real; NEQ]) -> Self {
        Self {
            imax,
            jmax,
            data: vec![node; imax * jmax],
        }
    }

    pub fn for_grid(grid: &GridGeometry) -> Self {
        Self::new(grid.imax, grid.jmax)
    }

    /// Build a field by evaluating `f(i, j)` at every node.
    pub fn from_fn(imax: usize, jmax: usize, mut f: impl FnMut(usize, usize) -> [Real; NEQ]) -> Self {
        let mut data = Vec::with_capacity(imax * jmax);
        for i in 0..imax {
            for j in 0..jmax {
                data.push(f(i, j));
            }
        }
        Self { imax, jmax, data }
    }

    #[inline]
    pub fn dims(&self) -> (usize, usize) {
        (self.imax, self.jmax)
    }

    pub fn same_shape(&self, other: &Field3) -> bool {
        self.dims() == other.dims()
    }

    #[inline]
    fn offset(&self, i: usize, j: usize) -> usize {
        debug_assert!(
            i < self.imax && j < self.jmax,
            "Field3 index ({i}, {j}) out of bounds for {}x{}",
            self.imax,
            self.jmax
        );
        i * self.jmax + j
    }

    #[inline]
    pub fn p(&self, i: usize, j: usize) -> Real {
        self[(i, j)][0]
    }

    #[inline]
    pub fn u(&self, i: usize, j: usize) -> Real {
        self[(i, j)][1]
    }

    #[inline]
    pub fn v(&self, i: usize, j: usize) -> Real {
        self[(i, j)][2]
    }

    pub fn nodes(&self) -> &[[Real; NEQ]] {
        &self.data
    }

    pub fn nodes_mut(&mut self) -> &mut [[Real; NEQ]] {
        &mut self.data
    }

    pub fn add_to_channel(&mut self, channel: Channel, delta: Real) {
        let k = channel.index();
        for node in &mut self.data {
            node[k] += delta;
        }
    }

    pub fn is_finite(&self) -> bool {
        self.data.iter().flatten().all(|v| v.is_finite())
    }

    /// Per-channel maximum absolute difference against `other`.
    pub fn max_abs_diff(&self, other: &Field3) -> [Real; NEQ] {
        debug_assert!(self.same_shape(other));
        let mut out: [Real; NEQ] = [0.0; NEQ];
        for (a, b) in self.data.iter().zip(&other.data) {
            for k in 0..NEQ {
                out[k] = out[k].max((a[k] - b[k]).abs());
            }
        }
        out
    }
}

impl Index<(usize, usize)> for Field3 {
    type Output = [Real; NEQ];

    #[inline]
    fn index(&self, (i, j): (usize, usize)) -> &[Real; NEQ] {
        &self.data[self.offset(i, j)]
    }
}

impl IndexMut<(usize, usize)> for Field3 {
    #[inline]
    fn index_mut(&mut self, (i, j): (usize, usize)) -> &mut [Real; NEQ] {
        let k = self.offset(i, j);
        &mut self.data[k]
    }
}

impl Index<(usize, usize, Channel)> for Field3 {
    type Output = Real;

    #[inline]
    fn index(&self, (i, j, c): (usize, usize, Channel)) -> &Real {
        &self.data[self.offset(i, j)][c.index()]
    }
}

impl IndexMut<(usize, usize, Channel)> for Field3 {
    #[inline]
    fn index_mut(&mut self, (i, j, c): (usize, usize, Channel)) -> &mut Real {
        let k = self.offset(i, j);
        &mut self.data[k][c.index()]
    }
}
