//! Classical (Paige) Lanczos bound on the smallest eigenvalue of a dense
//! symmetric matrix.

use ndarray::{Array1, Array2};
use ndarray_linalg::{Eigh, UPLO};

use crate::types::Real;

/// Cheap bound `lambda_min(a) < theta_min` via classical Lanczos.
///
/// Reorthogonalizes each new Lanczos vector against the immediately
/// preceding vector only (the classical Paige formulation, not full
/// reorthogonalization). At every step the smallest Ritz value of the
/// growing tridiagonal projection is extracted by a dense symmetric
/// eigendecomposition of the (tiny) tridiagonal matrix, and iteration stops
/// once the Kaniel-Paige error estimate `beta_{k+1} * |z_min[k]|` drops
/// below `tol`.
pub fn lanczos<A: Real>(a: &Array2<A>, max_iter: usize, tol: A) -> A {
    let m = a.nrows();
    let start = A::one() / A::from(m).unwrap().sqrt();
    let mut v = Array1::from_elem(m, start);

    let mut w = a.dot(&v);
    let mut alpha = vec![w.dot(&v)];
    w = &w - &(v.mapv(|e| e * alpha[0]));
    let mut beta = vec![w.dot(&w).sqrt()];

    let mut theta_min = alpha[0];

    for _ in 0..max_iter {
        let v_old = v.clone();
        let last_beta = beta[beta.len() - 1];
        v = w.mapv(|e| e / last_beta);
        w = a.dot(&v);
        w = &w - &(v_old.mapv(|e| e * last_beta));

        let a_k = w.dot(&v);
        alpha.push(a_k);
        w = &w - &(v.mapv(|e| e * a_k));
        beta.push(w.dot(&w).sqrt());

        let k = alpha.len();
        let mut t = Array2::<A>::zeros((k, k));
        for i in 0..k {
            t[[i, i]] = alpha[i];
            if i + 1 < k {
                t[[i, i + 1]] = beta[i];
                t[[i + 1, i]] = beta[i];
            }
        }
        let (w_eig, z_eig) =
            t.eigh(UPLO::Upper).expect("dense tridiagonal eigendecomposition");
        theta_min = w_eig[0];

        let err_est = z_eig[[k - 1, 0]].abs() * beta[k - 1];
        if err_est < tol {
            break;
        }
    }

    theta_min
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn bounds_smallest_eigenvalue_of_diagonal_matrix() {
        let a = Array2::from_diag(&array![-2.0, 1.0, 3.0, 5.0, 7.0]);
        let theta = lanczos(&a, 10, 1e-10);
        assert!(theta <= -2.0 + 1e-6, "theta={theta}");
    }
}
