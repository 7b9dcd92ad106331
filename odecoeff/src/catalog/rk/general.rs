//! Generalized dense-solve path for the two catalog entries with no known
//! literal closed form (5-4, 6-4): general 3-equation and 4-equation
//! dense solves of the moment constraints, collapsed onto one parametric
//! routine rather than hand-unrolled per combination. Every other entry
//! has its own hand-transcribed closed form (see `rk2`..`rk6`) and never
//! reaches this module.
//!
//! Intermediate stages (`2..s-1`) use the simple Euler-substep convention
//! (`b_{i,i-1} = t_i`, every other entry `0`) already seen in the
//! hand-derived 2- and 3-stage solvers. The final stage's weights are the
//! quadrature weights solving the moment conditions
//! `sum_j b_{s,j} c_j^{q-1} = 1/q` for `q = 1..n`, `n = min(s-1, order-1)`,
//! via [`crate::linalg::solve`].

use super::layout::RkTb;
use crate::linalg::solve;

pub fn nfree(s: usize) -> usize {
    s - 1
}

/// `free = [t_1, .., t_{s-1}]`; `t_s` is always `1`.
pub fn solve_general(s: usize, order: usize, pair: bool, free: &[f64]) -> Option<RkTb> {
    debug_assert_eq!(free.len(), nfree(s));
    let mut tb = RkTb::new(s);
    for i in 0..(s - 1) {
        tb.t[i] = free[i];
    }
    tb.t[s - 1] = 1.0;

    for row_idx in 0..s.saturating_sub(2) {
        let target = tb.t[row_idx + 1];
        tb.b[row_idx][row_idx + 1] = target;
        tb.close_row(row_idx);
    }

    let last = s - 2; // row index of the last row (stage s)
    let n = (s - 1).min(order.saturating_sub(1)).max(1).min(6);
    let nodes: Vec<f64> = (0..n).map(|j| tb.t[j]).collect();

    let mut a = vec![0.0; n * n];
    let mut rhs = vec![0.0; n];
    for (q, rhs_q) in rhs.iter_mut().enumerate() {
        let power = q; // c_j^{q} for q = 0..n-1, matching moment order q+1
        for (j, &cj) in nodes.iter().enumerate() {
            a[q * n + j] = cj.powi(power as i32);
        }
        *rhs_q = 1.0 / (q as f64 + 1.0);
    }
    let weights = solve(n, &a, &rhs)?;

    for (j, w) in weights.iter().enumerate() {
        tb.b[last][j + 1] = *w;
    }
    tb.close_row(last);

    if pair {
        // Embedded pair of one order lower: drop the last moment condition
        // and re-solve for an (n-1)-node quadrature, matching the "analogous
        // order conditions one order lower" rule.
        let m = n.saturating_sub(1).max(1);
        let mut a2 = vec![0.0; m * m];
        let mut rhs2 = vec![0.0; m];
        for (q, rhs_q) in rhs2.iter_mut().enumerate() {
            for (j, &cj) in nodes[..m].iter().enumerate() {
                a2[q * m + j] = cj.powi(q as i32);
            }
            *rhs_q = 1.0 / (q as f64 + 1.0);
        }
        let e_weights = solve(m, &a2, &rhs2)?;
        let mut e = vec![0.0; s];
        let mut sum = 0.0;
        for (j, w) in e_weights.iter().enumerate() {
            e[j + 1] = *w;
            sum += *w;
        }
        e[0] = crate::linalg::flush(1.0 - sum);
        tb.e = Some(e);
    }

    if tb.b.iter().flatten().any(|v| !v.is_finite()) {
        return None;
    }
    if let Some(e) = &tb.e {
        if e.iter().any(|v| !v.is_finite()) {
            return None;
        }
    }
    Some(tb)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn five_stage_order_four_is_row_sum_consistent() {
        let free = [0.2, 0.4, 0.6, 0.8];
        let tb = solve_general(5, 4, false, &free).expect("feasible draw");
        assert!(tb.row_sums_consistent());
        assert!(tb.final_t_is_one());
    }

    #[test]
    fn six_stage_pair_populates_embedded_weights() {
        let free = [0.15, 0.3, 0.45, 0.6, 0.8];
        let tb = solve_general(6, 4, true, &free).expect("feasible draw");
        assert!(tb.e.is_some());
        let e = tb.e.unwrap();
        assert!((e.iter().sum::<f64>() - 1.0).abs() < 1e-9);
    }
}
