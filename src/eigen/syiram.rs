//! Implicitly restarted Arnoldi method (IRAM) for the leftmost eigenvalue
//! of a dense symmetric matrix held in packed upper-triangular storage.

use ndarray::{s, Array2};
use ndarray_linalg::{Eigh, UPLO};
use rand::distr::{Distribution, Uniform};
use rand::SeedableRng;
use rand_pcg::Pcg64;

use super::unpack_upper;
use crate::dense::ijtokp;
use crate::types::Real;

/// Fixed RNG seed for the starting Krylov vector, required for
/// reproducibility across platforms and dense-kernel providers. A caller
/// wanting a different starting vector must build a seed-injected variant
/// of this routine rather than relying on this one to vary.
const STARTING_SEED: u64 = 1;

fn smallest_eigenpair<A: Real>(ap: &[A], m: usize) -> A {
    let a = unpack_upper(ap, m);
    let (w, _) = a.eigh(UPLO::Upper).expect("dense symmetric eigendecomposition");
    w[0]
}

/// Implicitly restarted Arnoldi method for the leftmost eigenvalue of a
/// symmetric matrix of order `m` supplied in packed upper-triangular
/// storage `ap`.
///
/// Short-circuits to a direct dense eigensolver when `m <= iter_innr_max`.
/// Otherwise maintains an `iter_innr_max`-step Arnoldi factorization with
/// Daniel-Gragg-Kaufman-Stewart (DGKS) double reorthogonalization, and
/// compresses it each outer iteration by diagonalizing the projected
/// (tridiagonal) matrix directly rather than by explicit Wilkinson-shifted
/// QR sweeps: since the projected matrix is symmetric, applying
/// `iter_innr_max - 1` shifted QR steps using the other exact Ritz values
/// as shifts is, in exact arithmetic, equivalent to a full
/// eigendecomposition of the projected matrix (see design notes).
///
/// Returns `(theta, err)` where `theta` approximates `lambda_min(a)` and
/// `err` bounds the residual (`0` on the short-circuit path).
pub fn syiram<A: Real>(
    ap: &[A],
    m: usize,
    iter_innr_max: usize,
    iter_outr_max: usize,
    tol: A,
) -> (A, A) {
    if m <= iter_innr_max {
        return (smallest_eigenpair(ap, m), A::zero());
    }

    let k = iter_innr_max;
    let a_dense = unpack_upper(ap, m);

    let mut v = Array2::<A>::zeros((m, k + 1));
    let mut rng = Pcg64::seed_from_u64(STARTING_SEED);
    let unif = Uniform::new(0.0f64, 1.0).expect("valid uniform range");
    for i in 0..m {
        v[[i, 0]] = A::from(unif.sample(&mut rng)).unwrap();
    }
    let norm0 = v.column(0).dot(&v.column(0)).sqrt();
    {
        let mut c0 = v.column_mut(0);
        c0 /= norm0;
    }

    let mut hp = vec![A::zero(); k * (k + 1) / 2];
    let mut norm_v = A::zero();
    let mut theta = A::zero();

    for iter_outr in 1..=iter_outr_max {
        let gs_start = if iter_outr == 1 { 1 } else { 2 };

        // Arnoldi expansion to `k` steps with DGKS reorthogonalization.
        for kk in gs_start..=k {
            let mut next = a_dense.dot(&v.column(kk - 1));
            for _dgks_pass in 0..2 {
                for i in 1..=kk {
                    let alpha = next.dot(&v.column(i - 1));
                    hp[ijtokp(i, kk)] = hp[ijtokp(i, kk)] + alpha;
                    next = &next - &v.column(i - 1).mapv(|e| e * alpha);
                }
            }
            norm_v = next.dot(&next).sqrt();
            v.column_mut(kk).assign(&next.mapv(|e| e / norm_v));
        }

        // Implicit restart: diagonalize the projected matrix directly.
        let h_dense = unpack_upper(&hp, k);
        let (w, z) = h_dense
            .eigh(UPLO::Upper)
            .expect("dense symmetric eigendecomposition");

        let h21 = hp[ijtokp(1, 2)];
        let v_cols = v.slice(s![.., ..k]).to_owned();
        let v1 = v_cols.dot(&z.column(0));
        let mut v2 = v_cols.dot(&z.column(1));
        v2.mapv_inplace(|e| e * h21);
        let last_v = v.column(k).to_owned();
        let coeff = norm_v * z[[k - 1, 0]];
        v2 = &v2 + &last_v.mapv(|e| e * coeff);

        theta = w[0];
        let new_norm_v = v2.dot(&v2).sqrt();

        hp = vec![A::zero(); k * (k + 1) / 2];
        hp[ijtokp(1, 1)] = theta;

        v.column_mut(0).assign(&v1);
        v.column_mut(1).assign(&v2.mapv(|e| e / new_norm_v));
        norm_v = new_norm_v;

        if norm_v < tol {
            return (theta, norm_v);
        }
    }

    (theta, norm_v)
}
