//! 2x2 packed linear solve and box-constrained quadratic program.
//!
//! Used internally by the step-length subproblems at the trust-region
//! boundary when two directions must be blended subject to box bounds.

use crate::dense::{ijtokp, itok};
use crate::types::Real;

/// Solves a 2x2 system in packed upper-triangular storage (`a = [A11, A12,
/// A22]`) via Gaussian elimination with pivoting, assuming the system is
/// nonsingular.
pub fn solve2x2<A: Real>(mut a: [A; 3], mut b: [A; 2]) -> [A; 2] {
    // Pick the pivot: mirrors the reference implementation's row/column
    // permutation table for the three cases `i in {0, 1, 2}`.
    let mut i = 0usize;
    let mut val = a[0].abs();
    for j in 1..=2 {
        if a[j].abs() < val {
            i = j;
            val = a[j].abs();
        }
    }
    // `p`/`q` hold 1-based indices at positions 1 and 2; position 0 is
    // unused, matching the indexing convention of `ijtokp`/`itok`.
    let (p, q): ([usize; 3], [usize; 3]) = match i {
        0 => ([0, 1, 2], [0, 1, 2]),
        1 => ([0, 2, 1], [0, 1, 2]),
        _ => ([0, 2, 1], [0, 2, 1]),
    };

    let alpha = -a[ijtokp(p[2], q[1])] / a[ijtokp(p[1], q[1])];
    a[ijtokp(p[2], q[2])] = a[ijtokp(p[2], q[2])] + alpha * a[ijtokp(p[1], q[2])];
    b[itok(p[2])] = b[itok(p[2])] + alpha * b[itok(p[1])];

    let mut x = [A::zero(); 2];
    x[itok(p[2])] = b[itok(p[2])] / a[ijtokp(p[2], q[2])];
    x[itok(p[1])] =
        (b[itok(p[1])] - a[ijtokp(p[1], q[2])] * x[itok(p[2])]) / a[ijtokp(p[1], q[1])];
    x
}

/// `f(x) = x'*A*x + g'*x` for `A` in packed storage `[A11, A12, A22]`.
pub fn obj2x2<A: Real>(a: &[A; 3], g: &[A; 2], x: &[A; 2]) -> A {
    let two = A::from(2.0).unwrap();
    (a[0] * x[0] + g[0]) * x[0] + (a[2] * x[1] + g[1]) * x[1] + two * a[1] * x[0] * x[1]
}

/// Minimizes `<Ax,x> + <g,x>` subject to `lb <= x <= ub` by brute force:
/// evaluate the unconstrained minimizer, every edge-constrained stationary
/// point, and every corner, then keep the best feasible candidate.
///
/// The edge candidates solve `d/dx_j f = 0` for the free coordinate with
/// the other pinned to a bound, i.e. `2*A12*x_pinned + 2*A_jj*x_free + g_j
/// = 0`. (A symbolic check of this step against the reference
/// implementation is recorded in the design notes.)
pub fn quad2x2<A: Real>(a: &[A; 3], g: &[A; 2], lb: &[A; 2], ub: &[A; 2]) -> [A; 2] {
    let two = A::from(2.0).unwrap();
    let mut best = [A::zero(); 2];
    let mut f_best = A::infinity();

    let mut candidates: Vec<[A; 2]> = Vec::with_capacity(9);

    // Unconstrained minimum.
    candidates.push(solve2x2(*a, [-g[0], -g[1]]));

    // x0 pinned to each bound, x1 solved from d f / d x1 = 0.
    for &x0 in &[lb[0], ub[0]] {
        let x1 = -(g[1] + two * a[1] * x0) / (two * a[2]);
        candidates.push([x0, x1]);
    }
    // x1 pinned to each bound, x0 solved from d f / d x0 = 0.
    for &x1 in &[lb[1], ub[1]] {
        let x0 = -(g[0] + two * a[1] * x1) / (two * a[0]);
        candidates.push([x0, x1]);
    }
    // Corners.
    candidates.push([lb[0], lb[1]]);
    candidates.push([ub[0], lb[1]]);
    candidates.push([ub[0], ub[1]]);
    candidates.push([lb[0], ub[1]]);

    for z in candidates {
        if z[0] >= lb[0] && z[1] >= lb[1] && z[0] <= ub[0] && z[1] <= ub[1] {
            let f_z = obj2x2(a, g, &z);
            if f_z < f_best {
                best = z;
                f_best = f_z;
            }
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn solve2x2_matches_direct_elimination() {
        // A = [[4,1],[1,3]], b = [1,2].
        let x = solve2x2([4.0, 1.0, 3.0], [1.0, 2.0]);
        assert!((x[0] - 0.0909090909).abs() < 1e-9);
        assert!((x[1] - 0.6363636364).abs() < 1e-9);
    }

    #[test]
    fn quad2x2_unconstrained_minimum_is_interior() {
        // f(x) = x0^2 + x1^2, minimized at the origin, well within bounds.
        let a = [1.0, 0.0, 1.0];
        let g = [0.0, 0.0];
        let lb = [-10.0, -10.0];
        let ub = [10.0, 10.0];
        let x = quad2x2(&a, &g, &lb, &ub);
        assert!(x[0].abs() < 1e-9 && x[1].abs() < 1e-9);
    }

    #[test]
    fn quad2x2_respects_active_bounds() {
        // f(x) = x0^2 + x1^2 - 4x0 - 4x1, unconstrained min at (2,2), but
        // bounds clip it to the corner (1,1).
        let a = [1.0, 0.0, 1.0];
        let g = [-4.0, -4.0];
        let lb = [-1.0, -1.0];
        let ub = [1.0, 1.0];
        let x = quad2x2(&a, &g, &lb, &ub);
        assert!((x[0] - 1.0).abs() < 1e-9 && (x[1] - 1.0).abs() < 1e-9);
    }

    #[test]
    fn quad2x2_active_bound_uses_the_corrected_edge_formula() {
        // Nonzero cross term (a[1] != 0) so the edge-candidate formula
        // x1 = -(g1 + 2*a1*x0) / (2*a2) actually exercises a[1]. The
        // unconstrained minimum of this problem sits at x0 = 4.8, outside
        // ub[0] = 2, so the optimum is pinned at x0 = 2 with x1 solved from
        // that formula: x1 = -(0 + 2*1*2) / (2*2) = -1.0. The original's
        // buggy coefficient (2*a0*a1 instead of 2*a1) would instead compute
        // x1 = -(0 + 2*3*1*2) / (2*2) = -3.0, a different point entirely.
        let a = [3.0, 1.0, 2.0];
        let g = [-12.0, 0.0];
        let lb = [-5.0, -5.0];
        let ub = [2.0, 5.0];
        let x = quad2x2(&a, &g, &lb, &ub);
        assert!((x[0] - 2.0).abs() < 1e-9, "x0={}", x[0]);
        assert!((x[1] - (-1.0)).abs() < 1e-9, "x1={}", x[1]);
    }
}
