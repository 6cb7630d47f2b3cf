//! Sylvester equation solver given a symmetric eigendecomposition of `A`.

use ndarray::{Array1, Array2};

use crate::types::Real;

/// Solves `A*X + X*A = B` given `A = V*D*V^T` (a symmetric eigendecomposition:
/// `V` orthogonal, `D` the diagonal of eigenvalues), for symmetric `B`.
///
/// Forms `M = V^T*B*V`, solves the diagonal system entrywise
/// (`X_tilde[i,j] = M[i,j] / (D[i] + D[j])`), and transforms back:
/// `X = V*X_tilde*V^T`. Undefined (produces non-finite entries) whenever
/// any `D[i] + D[j] == 0`; callers guarantee `A` is positive definite.
pub fn sylvester<A: Real>(v: &Array2<A>, d: &Array1<A>, b: &Array2<A>) -> Array2<A> {
    let m = v.nrows();
    let vt_b_v = v.t().dot(b).dot(v);

    let mut x_tilde = Array2::<A>::zeros((m, m));
    for j in 0..m {
        for i in 0..=j {
            let val = vt_b_v[[i, j]] / (d[i] + d[j]);
            x_tilde[[i, j]] = val;
            x_tilde[[j, i]] = val;
        }
    }

    v.dot(&x_tilde).dot(&v.t())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray_linalg::{Eigh, UPLO};

    #[test]
    fn recovers_b_from_its_own_decomposition() {
        let a = ndarray::array![[4.0, 1.0], [1.0, 3.0]];
        let b = ndarray::array![[2.0, 0.5], [0.5, 1.0]];
        let (d, v) = a.eigh(UPLO::Upper).unwrap();

        let x = sylvester(&v, &d, &b);
        let lhs = a.dot(&x) + x.dot(&a);
        let resid = (&lhs - &b).mapv(|e: f64| e * e).sum().sqrt();
        let norm_b = b.mapv(|e: f64| e * e).sum().sqrt();
        assert!(resid <= 1e-9 * norm_b.max(1.0));
    }
}
