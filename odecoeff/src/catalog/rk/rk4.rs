//! 4-stage RK solvers. `solve_4_2` is transcribed from `rk_tb_4_2` in
//! `examples/original_source/rk_4_2.c`: every weight but the last of the
//! final row is free; `b43` closes the single order-2 moment condition
//! `b41*t1+b42*t2+b43*t3=1/2`. `solve_4_3` is transcribed from
//! `rk_tb_4_3` in `examples/original_source/rk_4_3.c`: free
//! `t1, t2, b21, t3, b32, b43`, with `b42`, `b41`, `b31` closed in that
//! order from the order-3 moment conditions. `solve` (order 4) is
//! transcribed from `rk_tb_4_4` / `rk_tb_4_4t` in
//! `examples/original_source/rk_4_4.c`. `t1, t2` are the free variables;
//! `t3, t4` are fixed at `1` as in the source (see DESIGN.md — this is the
//! same family whose classical point `t1 = t2 = 1/2` sits at a removable
//! singularity of the parameterization, so the solver reports infeasible
//! exactly at that point and callers should approach it rather than
//! evaluate on it).

use super::layout::RkTb;
use crate::linalg::safe_div;

/// `nfree` for the 4-stage order-2 RK: `t1, t2, b21, t3, b31, b32, b41,
/// b42` are free; `b43` is derived.
pub const NFREE_4_2: usize = 8;

/// `free = [t1, t2, b21, t3, b31, b32, b41, b42]`.
pub fn solve_4_2(free: &[f64]) -> Option<RkTb> {
    let mut tb = RkTb::new(4);
    let (t1, t2, b21, t3, b31, b32, b41, b42) = (
        free[0], free[1], free[2], free[3], free[4], free[5], free[6], free[7],
    );
    tb.t[0] = t1;
    tb.t[1] = t2;
    tb.t[2] = t3;
    tb.t[3] = 1.0;

    tb.b[0][1] = b21;
    tb.close_row(0);

    tb.b[1][1] = b31;
    tb.b[1][2] = b32;
    tb.close_row(1);

    let b43 = safe_div(0.5 - b41 * t1 - b42 * t2, t3)?;
    tb.b[2][1] = b41;
    tb.b[2][2] = b42;
    tb.b[2][3] = b43;
    tb.close_row(2);

    if tb.b.iter().flatten().any(|v| !v.is_finite()) {
        return None;
    }
    Some(tb)
}

/// `nfree` for the 4-stage order-3 RK: `t1, t2, b21, t3, b32, b43` are
/// free; `b42`, `b41`, `b31` are derived.
pub const NFREE_4_3: usize = 6;

/// `free = [t1, t2, b21, t3, b32, b43]`.
pub fn solve_4_3(free: &[f64]) -> Option<RkTb> {
    let mut tb = RkTb::new(4);
    let (t1, t2, b21, t3, b32, b43) = (free[0], free[1], free[2], free[3], free[4], free[5]);
    tb.t[0] = t1;
    tb.t[1] = t2;
    tb.t[2] = t3;
    tb.t[3] = 1.0;

    let b42 = safe_div(
        (1.0 / 3.0 - b43 * t3 * t3) - t1 * (0.5 - b43 * t3),
        t2 * (t2 - t1),
    )?;
    let b41 = safe_div(0.5 - b42 * t2 - b43 * t3, t1)?;
    let b31 = safe_div((1.0 / 6.0 - b42 * b21 * t1) / b43 - b32 * t2, t1)?;

    tb.b[0][1] = b21;
    tb.close_row(0);

    tb.b[1][1] = b31;
    tb.b[1][2] = b32;
    tb.close_row(1);

    tb.b[2][1] = b41;
    tb.b[2][2] = b42;
    tb.b[2][3] = b43;
    tb.close_row(2);

    if tb.b.iter().flatten().any(|v| !v.is_finite()) {
        return None;
    }
    Some(tb)
}

pub const NFREE_4_4: usize = 2;

/// `free = [t1, t2]`. `time_accuracy` fixes `t2` via the extra-order
/// relation from `rk_tb_4_4t`.
pub fn solve(free: &[f64], time_accuracy: bool) -> Option<RkTb> {
    let mut tb = RkTb::new(4);
    let t1 = free[0];
    let t2 = if time_accuracy {
        0.5 * (t1 - 0.6) / (t1 - 0.5)
    } else {
        free[1]
    };
    tb.t[0] = t1;
    tb.t[1] = t2;
    tb.t[2] = 1.0;
    tb.t[3] = 1.0;

    let t3 = tb.t[2];
    let t4 = tb.t[3];

    let b43 = safe_div(
        0.25 - (1.0 / 3.0) * t1 - (1.0 / 3.0 - 0.5 * t1) * t2,
        t3 * (t3 - t2) * (t3 - t1),
    )?;
    let b42 = safe_div(
        1.0 / 3.0 - 0.5 * t1 - b43 * t3 * (t3 - t1),
        t2 * (t2 - t1),
    )?;
    let b41 = safe_div(0.5 - b42 * t2 - b43 * t3, t1)?;
    let b32 = safe_div(1.0 / 12.0 - (1.0 / 6.0) * t1, b43 * t2 * (t2 - t1))?;
    let b31 = safe_div(
        (1.0 / 8.0 - (1.0 / 6.0) * t2) / (b43 * (t3 - t2)) - b32 * t2,
        t1,
    )?;
    let b21 = safe_div(1.0 / 24.0, t1 * b43 * b32)?;

    tb.b[2][1] = b41;
    tb.b[2][2] = b42;
    tb.b[2][3] = b43;
    tb.close_row(2);

    tb.b[1][1] = b31;
    tb.b[1][2] = b32;
    tb.close_row(1);

    tb.b[0][1] = b21;
    tb.close_row(0);

    let _ = t4;
    if tb.b.iter().flatten().any(|v| !v.is_finite()) {
        return None;
    }
    Some(tb)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn near_classical_point_is_feasible_and_consistent() {
        // Avoid the exact removable singularity at t1 = t2 = 0.5.
        let tb = solve(&[0.5 + 1e-6, 0.5 - 1e-6], false).expect("feasible draw");
        assert!(tb.row_sums_consistent());
        assert!(tb.final_t_is_one());
        assert!((tb.b[2][0] - 1.0 / 6.0).abs() < 1e-3);
        assert!((tb.b[2][3] - 1.0 / 6.0).abs() < 1e-3);
    }

    #[test]
    fn exact_singularity_reports_infeasible() {
        assert!(solve(&[0.5, 0.5], false).is_none());
    }

    #[test]
    fn order_two_moment_condition_holds() {
        let free = [0.3, 0.6, 0.2, 0.9, 0.1, 0.4, 0.25, 0.35];
        let tb = solve_4_2(&free).expect("feasible draw");
        let moment = tb.b[2][1] * tb.t[0] + tb.b[2][2] * tb.t[1] + tb.b[2][3] * tb.t[2];
        assert!((moment - 0.5).abs() < 1e-12);
    }

    #[test]
    fn order_three_moment_conditions_hold() {
        let free = [0.3, 0.6, 0.2, 0.9, 0.4, 0.25];
        let tb = solve_4_3(&free).expect("feasible draw");
        assert!(tb.row_sums_consistent());
        let quad = tb.b[2][1] * tb.t[0].powi(2)
            + tb.b[2][2] * tb.t[1].powi(2)
            + tb.b[2][3] * tb.t[2].powi(2);
        assert!((quad - 1.0 / 3.0).abs() < 1e-9);
        let product = tb.b[2][2] * tb.b[0][1] * tb.t[0]
            + tb.b[2][3] * (tb.b[1][1] * tb.t[0] + tb.b[1][2] * tb.t[1]);
        assert!((product - 1.0 / 6.0).abs() < 1e-9);
    }
}
