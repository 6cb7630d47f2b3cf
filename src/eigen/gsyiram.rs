//! Generalized symmetric eigenproblem `A x = lambda B x`, reduced to the
//! standard form consumed by [`syiram`] via a Cholesky factorization of `B`.

use ndarray::Array2;
use ndarray_linalg::{Cholesky, Diag, SolveTriangular, UPLO};

use super::{pack_upper, syiram};
use crate::error::{KrylovError, Result};
use crate::types::Real;

/// Solves `A x = lambda B x` for the leftmost eigenvalue, `B` positive
/// definite.
///
/// Standardizes via `A' = U^-T A U^-1` where `B = U^T U` is the upper
/// Cholesky factor (computed on a copy; the caller's `b` is left intact),
/// then delegates to [`syiram`]. Returns [`KrylovError::NotPositiveDefinite`]
/// if `B`'s Cholesky factorization does not exist.
pub fn gsyiram<A: Real>(
    a: &Array2<A>,
    b: &Array2<A>,
    iter_innr_max: usize,
    iter_outr_max: usize,
    tol: A,
) -> Result<(A, A)> {
    let m = a.nrows();
    let u = b
        .cholesky(UPLO::Upper)
        .map_err(|_| KrylovError::NotPositiveDefinite)?;

    let ident = Array2::<A>::eye(m);
    let u_inv = u
        .solve_triangular(UPLO::Upper, Diag::NonUnit, &ident)
        .map_err(|_| KrylovError::NotPositiveDefinite)?;

    let a_prime = u_inv.t().dot(a).dot(&u_inv);
    let ap = pack_upper(&a_prime);
    Ok(syiram(&ap, m, iter_innr_max, iter_outr_max, tol))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reduces_to_standard_form_for_identity_b() {
        let a = Array2::from_diag(&ndarray::array![-2.0f64, 1.0, 3.0, 5.0, 7.0]);
        let b = Array2::<f64>::eye(5);
        let (theta, err) = gsyiram(&a, &b, 3, 50, 1e-10).unwrap();
        assert!((theta - (-2.0)).abs() <= 1e-6, "theta={theta}");
        assert!(err <= 1e-6);
    }

    #[test]
    fn rejects_indefinite_b() {
        let a = Array2::<f64>::eye(2);
        let b = Array2::from_diag(&ndarray::array![1.0f64, -1.0]);
        assert!(gsyiram(&a, &b, 1, 10, 1e-10).is_err());
    }
}
