//! Eigen-core: cheap eigenvalue bounds and restarted Arnoldi/Lanczos
//! eigensolvers used to detect indefiniteness and tighten trust-region
//! bounds.

pub mod gsyiram;
pub mod lanczos;
pub mod syiram;

pub use gsyiram::gsyiram;
pub use lanczos::lanczos;
pub use syiram::syiram;

use ndarray::Array2;

use crate::dense::ijtokp;
use crate::types::Real;

/// Expands packed upper-triangular storage of order `m` into a dense
/// symmetric matrix.
pub(crate) fn unpack_upper<A: Real>(ap: &[A], m: usize) -> Array2<A> {
    let mut a = Array2::<A>::zeros((m, m));
    for j in 1..=m {
        for i in 1..=j {
            let v = ap[ijtokp(i, j)];
            a[[i - 1, j - 1]] = v;
            a[[j - 1, i - 1]] = v;
        }
    }
    a
}

/// Packs the upper triangle of a dense symmetric matrix of order `m`.
pub(crate) fn pack_upper<A: Real>(a: &Array2<A>) -> Vec<A> {
    let m = a.nrows();
    let mut ap = vec![A::zero(); m * (m + 1) / 2];
    for j in 1..=m {
        for i in 1..=j {
            ap[ijtokp(i, j)] = a[[i - 1, j - 1]];
        }
    }
    ap
}
