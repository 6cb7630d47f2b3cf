//! Truncated Projected Conjugate Gradient (TPCG) — the trust-region
//! subproblem solver.

use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::operator::{clamp01, Operator, Safeguard};
use crate::quadratic::quad_equation;
use crate::types::Real;
use crate::vector_space::VectorSpace;

/// Why `truncated_cg` stopped.
///
/// Serializes to and from the exact strings listed below for wire
/// compatibility with existing optimizer logs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TruncatedStop {
    /// Internal only; never returned from `truncated_cg`.
    NotConverged,
    /// `<Bdx, A*Bdx> <= 0`.
    NegativeCurvature,
    /// `||Br|| <= eps * ||Br0||`.
    RelativeErrorSmall,
    /// `iter >= iter_max`.
    MaxItersExceeded,
    /// `||(x + x_offset) + alpha*Bdx|| >= delta`.
    TrustRegionViolated,
    /// `<Bdx, A*Bdx>` was NaN.
    NanDetected,
    /// `||O||_F > 0.5`.
    LossOfOrthogonality,
    /// `||x_offset|| > delta` before iteration 1.
    InvalidTrustRegionOffset,
    /// `failed_safeguard >= failed_safeguard_max`.
    TooManyFailedSafeguard,
    /// Predicted CG objective reduction was non-negative.
    ObjectiveIncrease,
}

impl TruncatedStop {
    pub fn as_str(self) -> &'static str {
        match self {
            TruncatedStop::NotConverged => "NotConverged",
            TruncatedStop::NegativeCurvature => "NegativeCurvature",
            TruncatedStop::RelativeErrorSmall => "RelativeErrorSmall",
            TruncatedStop::MaxItersExceeded => "MaxItersExceeded",
            TruncatedStop::TrustRegionViolated => "TrustRegionViolated",
            TruncatedStop::NanDetected => "NanDetected",
            TruncatedStop::LossOfOrthogonality => "LossOfOrthogonality",
            TruncatedStop::InvalidTrustRegionOffset => "InvalidTrustRegionOffset",
            TruncatedStop::TooManyFailedSafeguard => "TooManyFailedSafeguard",
            TruncatedStop::ObjectiveIncrease => "ObjectiveIncrease",
        }
    }
}

impl fmt::Display for TruncatedStop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error parsing a [`TruncatedStop`] from a string via [`FromStr`].
#[derive(Debug, Error)]
#[error("not a valid TruncatedStop: {0}")]
pub struct ParseTruncatedStopError(String);

impl FromStr for TruncatedStop {
    type Err = ParseTruncatedStopError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "NotConverged" => TruncatedStop::NotConverged,
            "NegativeCurvature" => TruncatedStop::NegativeCurvature,
            "RelativeErrorSmall" => TruncatedStop::RelativeErrorSmall,
            "MaxItersExceeded" => TruncatedStop::MaxItersExceeded,
            "TrustRegionViolated" => TruncatedStop::TrustRegionViolated,
            "NanDetected" => TruncatedStop::NanDetected,
            "LossOfOrthogonality" => TruncatedStop::LossOfOrthogonality,
            "InvalidTrustRegionOffset" => TruncatedStop::InvalidTrustRegionOffset,
            "TooManyFailedSafeguard" => TruncatedStop::TooManyFailedSafeguard,
            "ObjectiveIncrease" => TruncatedStop::ObjectiveIncrease,
            other => return Err(ParseTruncatedStopError(other.to_string())),
        })
    }
}

/// Outcome of a `truncated_cg` call.
pub struct TpcgResult<A, X> {
    pub x: X,
    /// The iterate after iteration 1 (the Cauchy point), truncated by
    /// `alpha_safeguard` if the safeguard fired on that iteration.
    pub x_cp: X,
    pub norm_br0: A,
    pub norm_br: A,
    pub iter: usize,
    pub stop: TruncatedStop,
    pub failed_safeguard: usize,
    pub alpha_safeguard: A,
}

/// Orthogonalizes `(bdx, abdx)` against the bounded history of previous
/// `(Bdx_i, ABdx_i)` pairs under the `A`-inner-product.
fn a_orthogonalize<A: Real, X: VectorSpace<A>>(
    bdxs: &VecDeque<X>,
    abdxs: &VecDeque<X>,
    bdx: &mut X,
    abdx: &mut X,
) {
    for (v, av) in bdxs.iter().zip(abdxs.iter()) {
        let beta = X::innr(av, bdx);
        X::axpy(-beta, v, bdx);
        X::axpy(-beta, av, abdx);
    }
}

/// Truncated, projected conjugate gradient: solves `A*B*x = b` subject to
/// `||x + x_offset|| <= delta`, with safeguarded step truncation.
///
/// `orthog_max == 1` gives plain CG; `orthog_max > 1` enables `m`-direction
/// A-orthogonalization against a bounded history of past search directions.
#[allow(clippy::too_many_arguments)]
pub fn truncated_cg<A, X, OpA, OpB, Sg>(
    a_op: &OpA,
    b: &X,
    proj_b: &OpB,
    eps: A,
    iter_max: usize,
    orthog_max: usize,
    delta: A,
    x_offset: &X,
    do_orthog_check: bool,
    failed_safeguard_max: usize,
    safeguard: &Sg,
) -> TpcgResult<A, X>
where
    A: Real,
    X: VectorSpace<A>,
    OpA: Operator<A, X>,
    OpB: Operator<A, X>,
    Sg: Safeguard<A, X>,
{
    let eps_orthog = A::from(0.5).unwrap();
    let zero = A::zero();
    let one = A::one();

    let mut x = X::init(b);
    X::zero(&mut x);
    let mut x_cp = X::init(b);

    // Reject an infeasible starting offset up front.
    let mut shifted_iterate = X::init(b);
    X::copy(x_offset, &mut shifted_iterate);
    let mut norm_shifted_iterate = X::norm(&shifted_iterate);
    if norm_shifted_iterate > delta {
        X::zero(&mut x_cp);
        return TpcgResult {
            x,
            x_cp,
            norm_br0: zero,
            norm_br: zero,
            iter: 0,
            stop: TruncatedStop::InvalidTrustRegionOffset,
            failed_safeguard: 0,
            alpha_safeguard: one,
        };
    }

    // r = A*x - b = -b at the start.
    let mut r = X::init(b);
    X::copy(b, &mut r);
    X::scal(-one, &mut r);
    let mut br = X::init(b);
    proj_b.eval(&r, &mut br);
    let norm_br0 = X::norm(&br);
    let mut norm_br = norm_br0;

    let mut bdx = X::init(b);
    X::copy(&br, &mut bdx);
    X::scal(-one, &mut bdx);
    let mut abdx = X::init(b);

    let mut bdxs: VecDeque<X> = VecDeque::new();
    let mut abdxs: VecDeque<X> = VecDeque::new();

    let mut rs: VecDeque<X> = VecDeque::new();
    let mut brs: VecDeque<X> = VecDeque::new();
    let mut norm_brs: VecDeque<A> = VecDeque::new();
    let mut o_cols: VecDeque<VecDeque<A>> = VecDeque::new();

    let mut failed_safeguard = 0usize;
    let mut x_safe = X::init(b);
    X::copy(&x, &mut x_safe);
    let mut bdx_safe = X::init(b);
    X::zero(&mut bdx_safe);
    let mut abdx_safe = X::init(b);
    X::zero(&mut abdx_safe);
    let mut r_safe = X::init(b);
    X::copy(&r, &mut r_safe);
    let mut shifted_iterate_safe = X::init(b);
    X::copy(&shifted_iterate, &mut shifted_iterate_safe);

    let mut alpha_safeguard = one;

    // Objective reduction of taking the step `alpha*Bdx`:
    // `alpha * (<ABdx, x + alpha/2 * Bdx> - <b, Bdx>)`.
    let obj_red = |x: &X, bdx: &X, abdx: &X, alpha: A| -> A {
        let mut x_p_ao2bdx = X::init(x);
        X::copy(x, &mut x_p_ao2bdx);
        X::axpy(A::from(0.5).unwrap() * alpha, bdx, &mut x_p_ao2bdx);
        let red1 = X::innr(abdx, &x_p_ao2bdx);
        let red2 = X::innr(b, bdx);
        alpha * (red1 - red2)
    };

    let mut stop = TruncatedStop::NotConverged;
    let mut iter = 1usize;

    while stop == TruncatedStop::NotConverged {
        a_op.eval(&bdx, &mut abdx);
        a_orthogonalize(&bdxs, &abdxs, &mut bdx, &mut abdx);

        // Enforce a descent direction.
        if X::innr(&bdx, &r) > zero {
            X::scal(-one, &mut bdx);
            X::scal(-one, &mut abdx);
        }

        let anorm_bdx_2 = X::innr(&bdx, &abdx);
        if anorm_bdx_2.is_nan() {
            stop = TruncatedStop::NanDetected;
        }
        if anorm_bdx_2 <= zero && stop == TruncatedStop::NotConverged {
            stop = TruncatedStop::NegativeCurvature;
        }

        let mut alpha = A::nan();
        let mut shifted_trial = X::init(b);
        let mut norm_shifted_trial = A::nan();

        if stop == TruncatedStop::NotConverged {
            if bdxs.len() == orthog_max {
                bdxs.pop_front();
                abdxs.pop_front();
            }
            let anorm_bdx = anorm_bdx_2.sqrt();
            let mut bdx_n = X::init(b);
            X::copy(&bdx, &mut bdx_n);
            X::scal(one / anorm_bdx, &mut bdx_n);
            bdxs.push_back(bdx_n);
            let mut abdx_n = X::init(b);
            X::copy(&abdx, &mut abdx_n);
            X::scal(one / anorm_bdx, &mut abdx_n);
            abdxs.push_back(abdx_n);

            alpha = -X::innr(&r, &bdx) / anorm_bdx_2;

            X::copy(&shifted_iterate, &mut shifted_trial);
            X::axpy(alpha, &bdx, &mut shifted_trial);
            norm_shifted_trial = X::norm(&shifted_trial);

            if norm_shifted_trial >= delta {
                stop = TruncatedStop::TrustRegionViolated;
            }

            if do_orthog_check {
                if rs.len() == orthog_max {
                    rs.pop_front();
                    brs.pop_front();
                    norm_brs.pop_front();
                    o_cols.pop_front();
                    for col in o_cols.iter_mut() {
                        col.pop_front();
                    }
                }

                let mut r_n = X::init(b);
                X::copy(&r, &mut r_n);
                rs.push_back(r_n);
                let mut br_n = X::init(b);
                X::copy(&br, &mut br_n);
                brs.push_back(br_n);
                norm_brs.push_back(norm_br);

                // New column: inner products of previous Br_i against the
                // new residual r_j (the just-pushed last element).
                let mut new_col: VecDeque<A> = VecDeque::new();
                {
                    let rj = rs.back().unwrap();
                    let norm_brj = *norm_brs.back().unwrap();
                    for (bri, norm_bri) in brs.iter().zip(norm_brs.iter()).take(brs.len() - 1) {
                        new_col.push_back(X::innr(bri, rj) / (*norm_bri * norm_brj));
                    }
                }
                o_cols.push_back(new_col);

                // New row: inner products of the new Br_i against previous
                // r_j, appended to each existing column.
                {
                    let bri = brs.back().unwrap();
                    let norm_bri = *norm_brs.back().unwrap();
                    for (col, (rj, norm_brj)) in
                        o_cols.iter_mut().zip(rs.iter().zip(norm_brs.iter()))
                    {
                        col.push_back(X::innr(bri, rj) / (norm_bri * (*norm_brj)));
                    }
                }
                // Remove the 1 on the new diagonal element.
                let last = o_cols.back_mut().unwrap().back_mut().unwrap();
                *last = *last - one;

                let mut norm_o = zero;
                for col in o_cols.iter() {
                    for v in col.iter() {
                        norm_o = norm_o + *v * *v;
                    }
                }
                let norm_o = norm_o.sqrt();
                if norm_o > eps_orthog {
                    stop = TruncatedStop::LossOfOrthogonality;
                }
            }
        }

        if obj_red(&x, &bdx, &abdx, alpha) > zero && stop == TruncatedStop::NotConverged {
            stop = TruncatedStop::ObjectiveIncrease;
        }

        if failed_safeguard == 0 {
            if stop != TruncatedStop::NanDetected
                && stop != TruncatedStop::LossOfOrthogonality
                && stop != TruncatedStop::ObjectiveIncrease
            {
                X::copy(&bdx, &mut bdx_safe);
                X::scal(alpha, &mut bdx_safe);
                X::copy(&abdx, &mut abdx_safe);
                X::scal(alpha, &mut abdx_safe);
            } else {
                X::zero(&mut bdx_safe);
                X::zero(&mut abdx_safe);
            }
        }

        if stop != TruncatedStop::NotConverged {
            match stop {
                TruncatedStop::TrustRegionViolated | TruncatedStop::NegativeCurvature => {
                    let mut sigma = zero;
                    if delta.is_finite() {
                        let aa = X::innr(&bdx, &bdx);
                        let bb = A::from(2.0).unwrap() * X::innr(&bdx, &shifted_iterate);
                        let cc = norm_shifted_iterate * norm_shifted_iterate - delta * delta;
                        for root in quad_equation(aa, bb, cc) {
                            if root > sigma {
                                sigma = root;
                            }
                        }
                    } else if iter == 1 {
                        sigma = one;
                    }

                    let mut trial = X::init(b);
                    X::copy(&x, &mut trial);
                    X::axpy(sigma, &bdx, &mut trial);
                    alpha_safeguard = clamp01(safeguard.eval(x_offset, &trial));

                    if alpha_safeguard < one {
                        failed_safeguard = 0;
                    } else if failed_safeguard == 0 {
                        let mut sigma_bdx = X::init(b);
                        X::copy(&bdx, &mut sigma_bdx);
                        X::scal(sigma, &mut sigma_bdx);
                        alpha_safeguard = clamp01(safeguard.eval(&shifted_iterate, &sigma_bdx));
                    } else {
                        alpha_safeguard = one;
                    }

                    if obj_red(&x, &bdx, &abdx, alpha_safeguard * sigma) <= zero {
                        X::axpy(alpha_safeguard * sigma, &bdx, &mut x);
                        X::axpy(alpha_safeguard * sigma, &bdx, &mut shifted_iterate);
                        X::axpy(alpha_safeguard * sigma, &abdx, &mut r);
                        proj_b.eval(&r, &mut br);
                        norm_br = X::norm(&br);
                    }
                }
                TruncatedStop::NanDetected
                | TruncatedStop::LossOfOrthogonality
                | TruncatedStop::ObjectiveIncrease => {}
                _ => unreachable!("these stop reasons are only assigned after the loop"),
            }

            if iter == 1 {
                X::copy(&x, &mut x_cp);
            }
            break;
        }

        let _ored = obj_red(&x, &bdx, &abdx, alpha);
        X::axpy(alpha, &bdx, &mut x);

        X::copy(&shifted_trial, &mut shifted_iterate);
        norm_shifted_iterate = norm_shifted_trial;

        X::axpy(alpha, &abdx, &mut r);
        proj_b.eval(&r, &mut br);
        norm_br = X::norm(&br);

        alpha_safeguard = clamp01(safeguard.eval(x_offset, &x));
        if alpha_safeguard < one {
            failed_safeguard += 1;
        } else {
            failed_safeguard = 0;
            X::copy(&x, &mut x_safe);
            X::copy(&r, &mut r_safe);
            X::copy(&shifted_iterate, &mut shifted_iterate_safe);
        }

        if iter == 1 {
            X::copy(&x, &mut x_cp);
            if failed_safeguard > 0 {
                X::scal(alpha_safeguard, &mut x_cp);
            }
        }

        X::copy(&br, &mut bdx);
        X::scal(-one, &mut bdx);

        if failed_safeguard >= failed_safeguard_max {
            stop = TruncatedStop::TooManyFailedSafeguard;
        } else if norm_br <= eps * norm_br0 {
            stop = TruncatedStop::RelativeErrorSmall;
        } else if iter >= iter_max {
            stop = TruncatedStop::MaxItersExceeded;
        } else {
            iter += 1;
        }
    }

    // Post-loop rollback: if the last safe state was not the current one,
    // restore it and take one final, guarded step.
    if failed_safeguard > 0 {
        X::copy(&x_safe, &mut x);
        X::copy(&r_safe, &mut r);
        X::copy(&shifted_iterate_safe, &mut shifted_iterate);
        X::copy(&bdx_safe, &mut bdx);
        X::copy(&abdx_safe, &mut abdx);

        alpha_safeguard = clamp01(safeguard.eval(&shifted_iterate, &bdx));
        if obj_red(&x, &bdx, &abdx, alpha_safeguard) <= zero {
            X::axpy(alpha_safeguard, &bdx, &mut x);
            X::axpy(alpha_safeguard, &bdx, &mut shifted_iterate);
            X::axpy(alpha_safeguard, &abdx, &mut r);
            proj_b.eval(&r, &mut br);
            norm_br = X::norm(&br);
        }
    }

    TpcgResult {
        x,
        x_cp,
        norm_br0,
        norm_br,
        iter,
        stop,
        failed_safeguard,
        alpha_safeguard,
    }
}
