//! 3-stage RK solvers. `solve_3_2` is transcribed from `rk_tb_3_2` in
//! `examples/original_source/rk_3_2.c`: free `t1, t2, b21, b32`, with `b31`
//! closed by back-substitution from the single order-2 moment condition
//! `b31*t1+b32*t2=1/2`. The original shares this exact coefficient
//! derivation between the plain and "strong" (SSP) 3-stage order-2
//! requests — `rk->strong` only gates whether the objective additionally
//! runs the inner `a-c` search, never the `tb` algebra — so `solve_3_2`
//! is used for both `strong` and non-`strong` (3, 2) requests here too.
//! `solve_3_3` is transcribed from `rk_tb_3_3` in
//! `examples/original_source/rk_3_3.c`: free `t1, t2`, with `b32`, `b31`,
//! `b21` closed in that order from the order-3 moment conditions
//! (`b31*t1+b32*t2=1/2`, `b31*t1^2+b32*t2^2=1/3`, `b32*b21*t1=1/6`).

use super::layout::RkTb;
use crate::linalg::safe_div;

/// `nfree` for the order-3, 3-stage RK.
pub const NFREE_3_3: usize = 2;

/// `free = [t1, t2]`.
pub fn solve_3_3(free: &[f64]) -> Option<RkTb> {
    let mut tb = RkTb::new(3);
    let (t1, t2) = (free[0], free[1]);
    tb.t[0] = t1;
    tb.t[1] = t2;
    tb.t[2] = 1.0;

    let b32 = safe_div(1.0 / 3.0 - 0.5 * t1, t2 * (t2 - t1))?;
    let b31 = safe_div(1.0 / 3.0 - 0.5 * t2, t1 * (t1 - t2))?;
    let b21 = safe_div(1.0 / 6.0, b32 * t1)?;

    tb.b[1][1] = b31;
    tb.b[1][2] = b32;
    tb.close_row(1);

    tb.b[0][1] = b21;
    tb.close_row(0);

    if tb.b.iter().flatten().any(|v| !v.is_finite()) {
        return None;
    }
    Some(tb)
}

/// `nfree` for the 3-stage order-2 RK (used for both the plain and the
/// `strong` request): `t_1, t_2, b_{2,1}, b_{3,2}` are free; `b_{3,1}` is
/// derived.
pub const NFREE_3_2: usize = 4;

/// `free = [t1, t2, b21, b32]`.
pub fn solve_3_2(free: &[f64]) -> Option<RkTb> {
    let mut tb = RkTb::new(3);
    tb.t[0] = free[0];
    tb.t[1] = free[1];
    tb.t[2] = 1.0;

    let (t1, t2, b21, b32) = (free[0], free[1], free[2], free[3]);

    tb.b[0][1] = b21;
    tb.close_row(0);

    // b31 closed from the order-2 moment condition b31*t1 + b32*t2 = 1/2.
    let b31 = safe_div(0.5 - b32 * t2, t1)?;
    tb.b[1][1] = b31;
    tb.b[1][2] = b32;
    tb.close_row(1);

    if tb
        .b
        .iter()
        .flatten()
        .chain(tb.t.iter())
        .any(|v| !v.is_finite())
    {
        return None;
    }
    Some(tb)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_sums_hold_for_arbitrary_feasible_draw() {
        let tb = solve_3_2(&[0.5, 1.0, 0.25, 0.3]).expect("feasible draw");
        assert!(tb.row_sums_consistent());
        assert!(tb.final_t_is_one());
    }

    #[test]
    fn order_two_moment_condition_holds() {
        let tb = solve_3_2(&[0.5, 1.0, 0.25, 0.3]).expect("feasible draw");
        let moment = tb.b[1][1] * tb.t[0] + tb.b[1][2] * tb.t[1];
        assert!((moment - 0.5).abs() < 1e-12);
    }

    #[test]
    fn three_stage_order_three_satisfies_product_condition() {
        let tb = solve_3_3(&[0.6, 0.3]).expect("feasible draw");
        let product = tb.b[1][2] * tb.b[0][1] * tb.t[0];
        assert!((product - 1.0 / 6.0).abs() < 1e-9);
    }
}
