//! Scalar type used throughout the Krylov core.

pub use ndarray_linalg::Scalar;
use ndarray_linalg::Lapack;
use num_traits::Float;

/// Floating-point scalar usable as the core's working precision.
///
/// Both `f32` and `f64` satisfy this bound; nothing in this crate
/// specializes on one over the other. `Lapack` gives access to the
/// dense-kernel provider (eigendecomposition, Cholesky, triangular solves);
/// `Float` gives the elementary real arithmetic the algorithms need
/// (`sqrt`, `abs`, `is_nan`, comparisons).
pub trait Real: Scalar<Real = Self> + Lapack + Float + 'static {}

impl Real for f32 {}
impl Real for f64 {}
