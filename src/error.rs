//! Error type for the dense-kernel boundary.
//!
//! Most of this crate's routines never fail: TPCG, GMRES, and the Arnoldi
//! iterations report their own termination state as data rather than as an
//! error (see [`crate::tpcg::TruncatedStop`]). The one place a caller can
//! hand this crate mathematically invalid input is the generalized
//! eigenproblem, where `B` is required to be positive definite.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, KrylovError>;

/// Failure modes surfaced from the dense-kernel provider.
#[derive(Debug, Error)]
pub enum KrylovError {
    /// `B` in `gsyiram`'s `A x = lambda B x` was not positive definite, so
    /// its Cholesky factorization does not exist.
    #[error("matrix is not positive definite")]
    NotPositiveDefinite,
}
