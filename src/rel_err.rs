//! Relative-error-to-cache check used by the outer optimizer to decide
//! whether a memoized operator application is still valid.

use crate::types::Real;
use crate::vector_space::VectorSpace;

/// `+inf` if `cached` is `None`, else `||x - cached|| / (eps_machine + ||x||)`.
pub fn rel_err_cached<A: Real, X: VectorSpace<A>>(x: &X, cached: Option<&X>) -> A {
    match cached {
        None => A::infinity(),
        Some(xp) => {
            let mut diff = X::init(x);
            X::copy(x, &mut diff);
            X::axpy(-A::one(), xp, &mut diff);
            X::norm(&diff) / (A::epsilon() + X::norm(x))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn uncached_is_infinite() {
        let x = array![1.0, 2.0, 3.0];
        assert_eq!(rel_err_cached(&x, None), f64::INFINITY);
    }

    #[test]
    fn identical_cache_is_zero() {
        let x = array![1.0, 2.0, 3.0];
        let cached = x.clone();
        assert!(rel_err_cached(&x, Some(&cached)) < 1e-14);
    }
}
