use std::cell::Cell;

use ndarray::{array, Array1};

use krylov_core::{truncated_cg, NoSafeguard, Operator, Safeguard, TruncatedStop};

#[test]
fn cg_on_2x2_spd() {
    let a = array![[4.0, 1.0], [1.0, 3.0]];
    let a_op = |x: &Array1<f64>, y: &mut Array1<f64>| y.assign(&a.dot(x));
    let identity = |x: &Array1<f64>, y: &mut Array1<f64>| y.assign(x);
    let b = array![1.0, 2.0];
    let x_offset = Array1::zeros(2);

    let result = truncated_cg(
        &a_op,
        &b,
        &identity,
        1e-12,
        10,
        3,
        f64::INFINITY,
        &x_offset,
        false,
        10,
        &NoSafeguard,
    );

    assert_eq!(result.stop, TruncatedStop::RelativeErrorSmall);
    assert_eq!(result.iter, 2);
    assert!((result.x[0] - 0.0909091).abs() < 1e-5, "x0={}", result.x[0]);
    assert!((result.x[1] - 0.6363636).abs() < 1e-5, "x1={}", result.x[1]);
}

#[test]
fn tpcg_hits_trust_region() {
    let a = array![[4.0, 1.0], [1.0, 3.0]];
    let a_op = |x: &Array1<f64>, y: &mut Array1<f64>| y.assign(&a.dot(x));
    let identity = |x: &Array1<f64>, y: &mut Array1<f64>| y.assign(x);
    let b = array![1.0, 2.0];
    let x_offset = Array1::zeros(2);

    let result = truncated_cg(
        &a_op,
        &b,
        &identity,
        1e-12,
        10,
        3,
        0.1,
        &x_offset,
        false,
        10,
        &NoSafeguard,
    );

    assert_eq!(result.stop, TruncatedStop::TrustRegionViolated);
    let norm_x = (result.x[0] * result.x[0] + result.x[1] * result.x[1]).sqrt();
    assert!((norm_x - 0.1).abs() < 1e-10, "norm_x={norm_x}");
}

#[test]
fn negative_curvature_truncates_to_the_boundary() {
    let a = array![[1.0, 0.0], [0.0, -1.0]];
    let a_op = |x: &Array1<f64>, y: &mut Array1<f64>| y.assign(&a.dot(x));
    let identity = |x: &Array1<f64>, y: &mut Array1<f64>| y.assign(x);
    let b = array![1.0, 1.0];
    let x_offset = Array1::zeros(2);

    let result = truncated_cg(
        &a_op,
        &b,
        &identity,
        1e-12,
        10,
        1,
        5.0,
        &x_offset,
        false,
        10,
        &NoSafeguard,
    );

    assert_eq!(result.stop, TruncatedStop::NegativeCurvature);
    let norm_x = (result.x[0] * result.x[0] + result.x[1] * result.x[1]).sqrt();
    assert!((norm_x - 5.0).abs() < 1e-8, "norm_x={norm_x}");
}

#[test]
fn invalid_trust_region_offset_is_rejected_immediately() {
    let identity = |x: &Array1<f64>, y: &mut Array1<f64>| y.assign(x);
    let b: Array1<f64> = Array1::zeros(3);
    let x_offset = array![2.0, 0.0, 0.0];

    let result = truncated_cg(
        &identity,
        &b,
        &identity,
        1e-12,
        10,
        1,
        1.0,
        &x_offset,
        false,
        10,
        &NoSafeguard,
    );

    assert_eq!(result.stop, TruncatedStop::InvalidTrustRegionOffset);
    assert_eq!(result.iter, 0);
    assert!(result.x.iter().all(|&v| v == 0.0));
}

/// A safeguard that fails (returns `0.5`) on its first call and passes
/// (`1.0`) on every call after, independent of the vectors it's handed.
struct FlakySafeguard {
    call: Cell<usize>,
}

impl Safeguard<f64, Array1<f64>> for FlakySafeguard {
    fn eval(&self, _x_base: &Array1<f64>, _x_dir: &Array1<f64>) -> f64 {
        let call = self.call.get();
        self.call.set(call + 1);
        if call == 0 {
            0.5
        } else {
            1.0
        }
    }
}

/// A preconditioner that behaves as the identity except on its second
/// call, where it poisons its output with `NaN`.
struct NanOnSecondCall {
    call: Cell<usize>,
}

impl Operator<f64, Array1<f64>> for NanOnSecondCall {
    fn eval(&self, x: &Array1<f64>, y: &mut Array1<f64>) {
        let call = self.call.get();
        self.call.set(call + 1);
        if call == 1 {
            y.fill(f64::NAN);
        } else {
            y.assign(x);
        }
    }
}

#[test]
fn nan_preconditioner_output_rolls_back_to_the_last_safe_step() {
    // Mirrors the original implementation's dedicated `tcg_nan_preconditioner`
    // regression: a preconditioner that returns a NaN residual after a safe
    // iteration must not corrupt `x`. `truncated_cg` should detect the NaN
    // on the following iteration, then roll back to the last checkpoint
    // before retaking a single guarded step from there.
    let a = array![[4.0, 1.0], [1.0, 3.0]];
    let a_op = |x: &Array1<f64>, y: &mut Array1<f64>| y.assign(&a.dot(x));
    let proj_b = NanOnSecondCall { call: Cell::new(0) };
    let safeguard = FlakySafeguard { call: Cell::new(0) };
    let b = array![1.0, 2.0];
    let x_offset = Array1::zeros(2);

    let result = truncated_cg(
        &a_op,
        &b,
        &proj_b,
        1e-12,
        10,
        3,
        f64::INFINITY,
        &x_offset,
        false,
        10,
        &safeguard,
    );

    assert_eq!(result.stop, TruncatedStop::NanDetected);
    assert_eq!(result.iter, 2);
    assert_eq!(result.failed_safeguard, 1);

    // The NaN poisoned iteration 2's search direction, so truncated_cg
    // rolls back to the checkpoint before iteration 1 and retakes a single
    // guarded step along iteration 1's direction, landing back on
    // iteration 1's full Cauchy step.
    assert!((result.x[0] - 0.25).abs() < 1e-9, "x0={}", result.x[0]);
    assert!((result.x[1] - 0.5).abs() < 1e-9, "x1={}", result.x[1]);

    // That Cauchy point itself was recorded truncated by the failed
    // safeguard (alpha_safeguard = 0.5) before the NaN ever appeared.
    assert!((result.x_cp[0] - 0.125).abs() < 1e-9, "x_cp0={}", result.x_cp[0]);
    assert!((result.x_cp[1] - 0.25).abs() < 1e-9, "x_cp1={}", result.x_cp[1]);
}
