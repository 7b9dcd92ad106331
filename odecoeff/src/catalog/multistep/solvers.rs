//! Multi-step scheme solver, generalized over `(k, p)` rather than
//! hand-unrolled per combination as `steps_3_3.c`/`steps_4_3.c` do in the
//! original — the consistency and order-moment conditions are linear in
//! the `a_i` for fixed `c_i`, so one dense solve covers every supported
//! `(k, p)` pair, collapsing sparse per-entry solvers into one parametric
//! routine. For the two combinations exercised
//! end to end (`k=3,p=2` and `k=4,p=3`), `k == p + 1` and the
//! resulting system is square and exactly determined; for `k > p + 1` the
//! remaining `a_i` (`i >= p + 1`) are pinned to zero rather than left free,
//! which is a documented simplification, not a literal transcription of
//! `steps_4_2.c`'s specific free-variable choice.

use super::layout::StepsCoef;
use crate::linalg;

pub fn nfree(k: usize) -> usize {
    k
}

/// `free = [c_0, .., c_{k-1}]`.
pub fn solve(k: usize, p: u32, free: &[f64]) -> Option<StepsCoef> {
    let mut coef = StepsCoef::new(k);
    coef.c.copy_from_slice(&free[..k]);

    let n = k.min(p as usize + 1);
    if n == 0 {
        return None;
    }

    // Row 0: consistency, Sum_{i<n} a_i = 1 (a_i for i >= n are pinned to 0).
    // Row q (q = 1..n-1): Sum_i a_i * (i^q - q * i^(q-1) * c_i) = (-1)^q.
    let mut a_mat = vec![0.0_f64; n * n];
    let mut rhs = vec![0.0_f64; n];
    for i in 0..n {
        a_mat[i] = 1.0;
    }
    rhs[0] = 1.0;
    for q in 1..n {
        for i in 0..n {
            let i_f = i as f64;
            let term_a = i_f.powi(q as i32);
            let term_b = if q == 1 {
                1.0
            } else {
                i_f.powi(q as i32 - 1)
            };
            a_mat[q * n + i] = term_a - (q as f64) * term_b * coef.c[i];
        }
        rhs[q] = if q % 2 == 1 { -1.0 } else { 1.0 };
    }

    let solved = linalg::solve(n, &a_mat, &rhs)?;
    for (i, &a_i) in solved.iter().enumerate() {
        coef.a[i] = a_i;
    }
    // a_i for i >= n stay 0.0 (set by StepsCoef::new).

    if coef.a.iter().chain(coef.c.iter()).any(|v| !v.is_finite()) {
        return None;
    }
    Some(coef)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn three_step_order_two_satisfies_moments_by_construction() {
        let coef = solve(3, 2, &[0.0, -1.0, -2.0]).expect("feasible draw");
        assert!(coef.consistency_holds());
        assert!(coef.moment_conditions_hold(2));
    }

    #[test]
    fn four_step_order_three_satisfies_moments_by_construction() {
        let coef = solve(4, 3, &[0.0, -1.0, -2.0, -3.0]).expect("feasible draw");
        assert!(coef.consistency_holds());
        assert!(coef.moment_conditions_hold(3));
    }

    #[test]
    fn singular_draw_reports_infeasible() {
        // Repeating a c-value on the order-2 system can drive the moment
        // matrix singular; either branch (None, or a finite but
        // non-conforming result) is acceptable here, so we only assert no
        // panic occurs while probing a pathological input.
        let _ = solve(3, 2, &[0.0, 0.0, 0.0]);
    }
}
