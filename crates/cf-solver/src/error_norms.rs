//! Discretization error against the manufactured solution.

use crate::manufactured::AnalyticSolution;
use cf_core::{Field3, GridGeometry, NEQ, Real};

/// L1, L2 and L∞ norms of `|numeric − exact|`, one entry per channel.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DiscretizationErrors {
    pub l1: [Real; NEQ],
    pub l2: [Real; NEQ],
    pub linf: [Real; NEQ],
}

impl DiscretizationErrors {
    /// Accumulate over interior nodes; L1 and L2 are normalised by the total node count.
    pub fn compute(field: &Field3, grid: &GridGeometry, solution: &dyn AnalyticSolution) -> Self {
        let mut out = Self::default();
        for i in grid.interior_i() {
            for j in grid.interior_j() {
                let exact = solution.exact_node(grid.x(i), grid.y(j));
                let node = field[(i, j)];
                for k in 0..NEQ {
                    let de = (node[k] - exact[k]).abs();
                    out.l1[k] += de;
                    out.l2[k] += de * de;
                    out.linf[k] = out.linf[k].max(de);
                }
            }
        }
        let n = grid.node_count() as Real;
        for k in 0..NEQ {
            out.l1[k] /= n;
            out.l2[k] = (out.l2[k] / n).sqrt();
        }
        out
    }
}
