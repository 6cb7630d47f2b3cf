//! The vector-space capability injected into every Krylov routine.
//!
//! None of the solvers in this crate touch concrete array storage directly;
//! they are parameterized over this small set of operations so that a
//! caller can swap in a distributed- or GPU-resident vector type without
//! touching the solver bodies. The capability carries no ordering on
//! elements and no assumption about where the underlying storage lives.

use ndarray::Array1;

use crate::types::Real;

/// `init`/`copy`/`scal`/`axpy`/`innr`/`zero` over a scalar type `A`.
///
/// `innr` defines the norm `||.|| = sqrt(<.,.>)` used throughout TPCG,
/// GMRES, and the eigen-core.
pub trait VectorSpace<A: Real>: Clone {
    /// Allocates a zero-initialized vector shaped like `template`.
    fn init(template: &Self) -> Self;

    /// `x <- 0`.
    fn zero(x: &mut Self);

    /// `dst <- src`.
    fn copy(src: &Self, dst: &mut Self);

    /// `x <- alpha * x`.
    fn scal(alpha: A, x: &mut Self);

    /// `y <- alpha * x + y`.
    fn axpy(alpha: A, x: &Self, y: &mut Self);

    /// `<x, y>`.
    fn innr(x: &Self, y: &Self) -> A;

    /// `sqrt(<x, x>)`.
    fn norm(x: &Self) -> A {
        Self::innr(x, x).sqrt()
    }
}

impl<A: Real> VectorSpace<A> for Array1<A> {
    fn init(template: &Self) -> Self {
        Array1::zeros(template.len())
    }

    fn zero(x: &mut Self) {
        x.fill(A::zero());
    }

    fn copy(src: &Self, dst: &mut Self) {
        dst.assign(src);
    }

    fn scal(alpha: A, x: &mut Self) {
        x.mapv_inplace(|v| v * alpha);
    }

    fn axpy(alpha: A, x: &Self, y: &mut Self) {
        ndarray::Zip::from(&mut *y).and(x).for_each(|y, &x| *y = *y + alpha * x);
    }

    fn innr(x: &Self, y: &Self) -> A {
        x.iter().zip(y.iter()).fold(A::zero(), |acc, (&a, &b)| acc + a * b)
    }
}
