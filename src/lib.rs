//! `krylov-core` provides the iterative Krylov-subspace solvers shared by a
//! trust-region and interior-point optimization stack.
//!
//! Three solvers sit at the center:
//! - [`tpcg::truncated_cg`]: truncated, projected conjugate gradient for the
//!   trust-region subproblem `min <g,x> + 1/2<x,Ax>` subject to
//!   `||x + x_offset|| <= delta`.
//! - [`gmres::gmres`]: restarted GMRES with left/right preconditioning for
//!   general (possibly nonsymmetric) linear systems.
//! - [`eigen::syiram`]/[`eigen::gsyiram`]: implicitly restarted Arnoldi
//!   iteration bounding the leftmost eigenvalue of a symmetric (or symmetric
//!   generalized) matrix, used to detect indefiniteness.
//!
//! None of these touch concrete array storage directly: every routine is
//! generic over a [`vector_space::VectorSpace`] capability and the
//! [`operator::Operator`]/[`operator::Safeguard`]/[`operator::GmresManipulator`]
//! traits, so a caller can swap in a distributed- or GPU-resident vector
//! type without touching the solver bodies. The blanket implementation over
//! [`ndarray::Array1`] covers the common in-process dense case.
//!
//! Dense kernels (eigendecomposition, Cholesky, triangular solves) are
//! delegated to [`ndarray_linalg`], which in turn links a BLAS/LAPACK
//! provider selected through this crate's Cargo features.

#![allow(clippy::too_many_arguments, clippy::many_single_char_names)]

pub mod dense;
pub mod eigen;
pub mod error;
pub mod gmres;
pub mod operator;
pub mod quad2x2;
pub mod quadratic;
pub mod rel_err;
pub mod sylvester;
pub mod tpcg;
pub mod types;
pub mod vector_space;

pub use crate::dense::{ijtok, ijtokp, itok};
pub use crate::eigen::{gsyiram, lanczos, syiram};
pub use crate::error::{KrylovError, Result};
pub use crate::gmres::{gmres, GmresResult};
pub use crate::operator::{
    clamp01, EmptyGmresManipulator, GmresManipulator, NoSafeguard, Operator, Safeguard,
};
pub use crate::quad2x2::{obj2x2, quad2x2, solve2x2};
pub use crate::quadratic::quad_equation;
pub use crate::rel_err::rel_err_cached;
pub use crate::sylvester::sylvester;
pub use crate::tpcg::{truncated_cg, ParseTruncatedStopError, TpcgResult, TruncatedStop};
pub use crate::types::Real;
pub use crate::vector_space::VectorSpace;
