//! Numerically stable real quadratic root finder.

use crate::types::Real;

/// Solves `a*x^2 + b*x + c = 0`, `(a, b, c)` not all zero.
///
/// Avoids subtracting two nearly-equal numbers: when `b < 0` the root
/// `(-b + sqrt(disc)) / (2a)` is well conditioned and the other root is
/// recovered from the product-of-roots identity `r1*r2 = c/a`, and
/// vice-versa when `b >= 0`.
///
/// - `a != 0`: two roots (possibly complex-valued in exact arithmetic, but
///   this crate only calls it where a real discriminant is guaranteed).
/// - `a == 0, b != 0`: one root, `-c/b`.
/// - `a == 0, b == 0`: no roots (degenerate constant).
pub fn quad_equation<A: Real>(a: A, b: A, c: A) -> Vec<A> {
    let zero = A::zero();
    let two = A::from(2.0).unwrap();
    let four = A::from(4.0).unwrap();

    if a != zero {
        let disc = (b * b - four * a * c).sqrt();
        let (r1, r2) = if b < zero {
            ((-b + disc) / (two * a), (two * c) / (-b - disc))
        } else {
            ((two * c) / (-b + disc), (-b - disc) / (two * a))
        };
        vec![r1, r2]
    } else if b != zero {
        vec![-c / b]
    } else {
        Vec::new()
    }
}
