//! Restarted GMRES with left/right preconditioning.

use crate::dense::ijtokp;
use crate::operator::{GmresManipulator, Operator};
use crate::types::Real;
use crate::vector_space::VectorSpace;

/// Outcome of a `gmres` call.
pub struct GmresResult<A> {
    pub norm_rtrue: A,
    pub iter: usize,
}

/// Generates `(c, s)` such that `[[c, s], [-s, c]] * [a, b]' = [r, 0]'`.
///
/// Mirrors the BLAS `rotg` convention used by the dense-kernel provider.
fn givens_rotation<A: Real>(a: A, b: A) -> (A, A) {
    if b == A::zero() {
        (A::one(), A::zero())
    } else if a == A::zero() {
        (A::zero(), A::one())
    } else {
        let r = (a * a + b * b).sqrt();
        (a / r, b / r)
    }
}

/// Applies the rotation `(c, s)` to the pair `(x, y)` in place.
fn apply_givens<A: Real>(c: A, s: A, x: &mut A, y: &mut A) {
    let xn = c * *x + s * *y;
    let yn = c * *y - s * *x;
    *x = xn;
    *y = yn;
}

/// Back-substitution against the packed upper-triangular factor `r` of
/// order `m`, solving `R*y = rhs`.
///
/// The original wraps a general banded `tpsv` BLAS call here, whose
/// descending-stride branch only ever executes once regardless of `n` (see
/// design notes). Rather than replicate that, this solves the small
/// triangular system directly.
fn solve_packed_upper<A: Real>(m: usize, r: &[A], rhs: &[A]) -> Vec<A> {
    let mut y = rhs[..m].to_vec();
    for i in (1..=m).rev() {
        let mut s = y[i - 1];
        for j in (i + 1)..=m {
            s = s - r[ijtokp(i, j)] * y[j - 1];
        }
        y[i - 1] = s / r[ijtokp(i, i)];
    }
    y
}

/// State carried across GMRES restarts.
struct GmresState<A, X> {
    v: X,
    vs: Vec<X>,
    r: X,
    norm_r: A,
    qt_e1: Vec<A>,
    qts: Vec<(A, A)>,
}

/// Flushes GMRES's between-restart state: preconditions the true residual,
/// records its norm, seeds the Krylov basis, and resets the RHS/rotations.
fn reset_gmres<A, X, OpMl>(rtrue: &X, ml_inv: &OpMl, rst_freq: usize, state: &mut GmresState<A, X>)
where
    A: Real,
    X: VectorSpace<A>,
    OpMl: Operator<A, X>,
{
    ml_inv.eval(rtrue, &mut state.r);
    state.norm_r = X::norm(&state.r);

    X::copy(&state.r, &mut state.v);
    X::scal(A::one() / state.norm_r, &mut state.v);

    state.vs.clear();
    state.vs.push(state.v.clone());

    state.qt_e1.iter_mut().for_each(|e| *e = A::zero());
    state.qt_e1[0] = state.norm_r;

    state.qts.clear();
}

/// Forms `dx = Mr_inv * (V * y)` where `y` solves the current triangular
/// least-squares system.
fn solve_in_krylov<A, X, OpMr>(
    m: usize,
    r: &[A],
    qt_e1: &[A],
    vs: &[X],
    mr_inv: &OpMr,
    x: &X,
) -> X
where
    A: Real,
    X: VectorSpace<A>,
    OpMr: Operator<A, X>,
{
    let y = solve_packed_upper(m, r, qt_e1);

    let mut v_y = X::init(x);
    X::zero(&mut v_y);
    for (yj, vj) in y.iter().zip(vs.iter()) {
        X::axpy(*yj, vj, &mut v_y);
    }

    let mut dx = X::init(x);
    mr_inv.eval(&v_y, &mut dx);
    dx
}

/// Restarted GMRES for `A*x = b` with left/right preconditioners `ml_inv`,
/// `mr_inv`, solving for and updating `x` in place.
///
/// `rst_freq == 0` means no restarting (clamped to `iter_max`). `gmanip` is
/// invoked after every sub-iteration with the opportunity to shrink or grow
/// `eps`. Returns the final true (non-preconditioned) residual norm and the
/// total iteration count.
#[allow(clippy::too_many_arguments)]
pub fn gmres<A, X, OpA, OpMl, OpMr, Gm>(
    a_op: &OpA,
    b: &X,
    mut eps: A,
    iter_max: usize,
    rst_freq: usize,
    ml_inv: &OpMl,
    mr_inv: &OpMr,
    gmanip: &Gm,
    x: &mut X,
) -> GmresResult<A>
where
    A: Real,
    X: VectorSpace<A>,
    OpA: Operator<A, X>,
    OpMl: Operator<A, X>,
    OpMr: Operator<A, X>,
    Gm: GmresManipulator<A, X>,
{
    let rst_freq = if rst_freq > iter_max { iter_max } else { rst_freq };
    let rst_freq = if rst_freq == 0 { iter_max } else { rst_freq };

    let mut rtrue = X::init(x);
    a_op.eval(x, &mut rtrue);
    X::scal(-A::one(), &mut rtrue);
    X::axpy(A::one(), b, &mut rtrue);
    let mut norm_rtrue = X::norm(&rtrue);

    let mut state = GmresState {
        v: X::init(x),
        vs: Vec::new(),
        r: X::init(x),
        norm_r: A::zero(),
        qt_e1: vec![A::zero(); rst_freq + 1],
        qts: Vec::new(),
    };
    reset_gmres(&rtrue, ml_inv, rst_freq, &mut state);

    let mut r_fac = vec![A::zero(); rst_freq * (rst_freq + 1) / 2];

    gmanip.eval(0, x, b, &mut eps);
    let mut iter_max = iter_max;
    if norm_rtrue <= eps {
        iter_max = 0;
    }

    let mut i = 0usize;
    let mut iter = 1usize;
    let mut dx = X::init(x);
    let mut x_p_dx = X::init(x);

    while iter <= iter_max {
        i = iter % rst_freq;
        if i == 0 {
            i = rst_freq;
        }

        let mut w = X::init(x);
        mr_inv.eval(&state.v, &mut w);
        let mut a_mrinv_v = X::init(x);
        a_op.eval(&w, &mut a_mrinv_v);
        ml_inv.eval(&a_mrinv_v, &mut w);

        let col = (i - 1) * i / 2;
        for (j, vj) in state.vs.iter().enumerate() {
            let beta = X::innr(vj, &w);
            X::axpy(-beta, vj, &mut w);
            r_fac[col + j] = beta;
        }

        let mut norm_w = X::norm(&w);

        X::copy(&w, &mut state.v);
        X::scal(A::one() / norm_w, &mut state.v);
        state.vs.push(state.v.clone());

        for (j, (c, s)) in state.qts.iter().enumerate() {
            let (mut a_j, mut a_j1) = (r_fac[col + j], r_fac[col + j + 1]);
            apply_givens(*c, *s, &mut a_j, &mut a_j1);
            r_fac[col + j] = a_j;
            r_fac[col + j + 1] = a_j1;
        }

        let diag_idx = col + (i - 1);
        let (c, s) = givens_rotation(r_fac[diag_idx], norm_w);
        apply_givens(c, s, &mut r_fac[diag_idx], &mut norm_w);
        state.qts.push((c, s));

        let (mut e0, mut e1) = (state.qt_e1[i - 1], state.qt_e1[i]);
        apply_givens(c, s, &mut e0, &mut e1);
        state.qt_e1[i - 1] = e0;
        state.qt_e1[i] = e1;
        state.norm_r = state.qt_e1[i].abs();

        dx = solve_in_krylov(i, &r_fac, &state.qt_e1, &state.vs, mr_inv, x);

        X::copy(x, &mut x_p_dx);
        X::axpy(A::one(), &dx, &mut x_p_dx);
        a_op.eval(&x_p_dx, &mut rtrue);
        X::scal(-A::one(), &mut rtrue);
        X::axpy(A::one(), b, &mut rtrue);
        norm_rtrue = X::norm(&rtrue);

        gmanip.eval(i, &x_p_dx, b, &mut eps);

        if norm_rtrue <= eps {
            break;
        }

        if i % rst_freq == 0 {
            X::copy(&x_p_dx, x);
            reset_gmres(&rtrue, ml_inv, rst_freq, &mut state);
            i = 0;
        }

        iter += 1;
    }

    let iter = if iter > iter_max { iter_max } else { iter };

    if i > 0 {
        dx = solve_in_krylov(i, &r_fac, &state.qt_e1, &state.vs, mr_inv, x);
        X::axpy(A::one(), &dx, x);
    }

    GmresResult { norm_rtrue, iter }
}
