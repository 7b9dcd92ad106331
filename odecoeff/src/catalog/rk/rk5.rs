//! 5-stage RK solvers. `solve_5_2` is transcribed from `rk_tb_5_2` in
//! `examples/original_source/rk_5_2.c`: every weight but the last of the
//! final row is free; `b51` closes the single order-2 moment condition
//! `b51*t1+b52*t2+b53*t3+b54*t4=1/2`. `solve_5_3` is transcribed from
//! `rk_tb_5_3` in `examples/original_source/rk_5_3.c`: free
//! `t1, t2, b21, t3, b31, b32, t4, b41, b42, b43, b54`, with `b51, b52,
//! b53` closed by a 3x3 dense solve of the order-3 moment conditions.

use super::layout::RkTb;
use crate::linalg::{safe_div, solve as solve_dense};

/// `nfree` for the 5-stage order-2 RK: `t1, t2, b21, t3, b31, b32, t4,
/// b41, b42, b43, b52, b53, b54` are free; `b51` is derived.
pub const NFREE_5_2: usize = 13;

/// `free = [t1, t2, b21, t3, b31, b32, t4, b41, b42, b43, b52, b53, b54]`.
pub fn solve_5_2(free: &[f64]) -> Option<RkTb> {
    let mut tb = RkTb::new(5);
    let (t1, t2, b21, t3, b31, b32, t4, b41, b42, b43, b52, b53, b54) = (
        free[0], free[1], free[2], free[3], free[4], free[5], free[6], free[7], free[8],
        free[9], free[10], free[11], free[12],
    );
    tb.t[0] = t1;
    tb.t[1] = t2;
    tb.t[2] = t3;
    tb.t[3] = t4;
    tb.t[4] = 1.0;

    tb.b[0][1] = b21;
    tb.close_row(0);

    tb.b[1][1] = b31;
    tb.b[1][2] = b32;
    tb.close_row(1);

    tb.b[2][1] = b41;
    tb.b[2][2] = b42;
    tb.b[2][3] = b43;
    tb.close_row(2);

    let b51 = safe_div(0.5 - b52 * t2 - b53 * t3 - b54 * t4, t1)?;
    tb.b[3][1] = b51;
    tb.b[3][2] = b52;
    tb.b[3][3] = b53;
    tb.b[3][4] = b54;
    tb.close_row(3);

    if tb.b.iter().flatten().any(|v| !v.is_finite()) {
        return None;
    }
    Some(tb)
}

/// `nfree` for the 5-stage order-3 RK: `t1, t2, b21, t3, b31, b32, t4,
/// b41, b42, b43, b54` are free; `b51, b52, b53` are derived.
pub const NFREE_5_3: usize = 11;

/// `free = [t1, t2, b21, t3, b31, b32, t4, b41, b42, b43, b54]`.
pub fn solve_5_3(free: &[f64]) -> Option<RkTb> {
    let mut tb = RkTb::new(5);
    let (t1, t2, b21, t3, b31, b32, t4, b41, b42, b43, b54) = (
        free[0], free[1], free[2], free[3], free[4], free[5], free[6], free[7], free[8],
        free[9], free[10],
    );
    tb.t[0] = t1;
    tb.t[1] = t2;
    tb.t[2] = t3;
    tb.t[3] = t4;
    tb.t[4] = 1.0;

    // Solve for [b51, b52, b53] from the three order-3 moment conditions,
    // the same quadrature-plus-product system as `rk_tb_5_3`'s `solve_3`
    // (row-major: columns are the b51, b52, b53 coefficients).
    let a_mat = [
        t1, t2, t3,
        t1 * t1, t2 * t2, t3 * t3,
        0.0, b21 * t1, b31 * t1 + b32 * t2,
    ];
    let rhs = [
        0.5 - b54 * t4,
        1.0 / 3.0 - b54 * t4 * t4,
        1.0 / 6.0 - b54 * (b41 * t1 + b42 * t2 + b43 * t3),
    ];

    let solved = solve_dense(3, &a_mat, &rhs)?;
    let (b51, b52, b53) = (solved[0], solved[1], solved[2]);

    tb.b[0][1] = b21;
    tb.close_row(0);

    tb.b[1][1] = b31;
    tb.b[1][2] = b32;
    tb.close_row(1);

    tb.b[2][1] = b41;
    tb.b[2][2] = b42;
    tb.b[2][3] = b43;
    tb.close_row(2);

    tb.b[3][1] = b51;
    tb.b[3][2] = b52;
    tb.b[3][3] = b53;
    tb.b[3][4] = b54;
    tb.close_row(3);

    if tb.b.iter().flatten().any(|v| !v.is_finite()) {
        return None;
    }
    Some(tb)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_two_moment_condition_holds() {
        let free = [0.2, 0.4, 0.1, 0.6, 0.15, 0.2, 0.8, 0.1, 0.15, 0.2, 0.1, 0.15, 0.2];
        let tb = solve_5_2(&free).expect("feasible draw");
        let moment =
            tb.b[3][1] * tb.t[0] + tb.b[3][2] * tb.t[1] + tb.b[3][3] * tb.t[2] + tb.b[3][4] * tb.t[3];
        assert!((moment - 0.5).abs() < 1e-12);
    }

    #[test]
    fn order_three_moment_conditions_hold() {
        let free = [0.2, 0.4, 0.1, 0.6, 0.15, 0.2, 0.8, 0.1, 0.15, 0.2, 0.05];
        let tb = solve_5_3(&free).expect("feasible draw");
        assert!(tb.row_sums_consistent());
        let linear = tb.b[3][1] * tb.t[0]
            + tb.b[3][2] * tb.t[1]
            + tb.b[3][3] * tb.t[2]
            + tb.b[3][4] * tb.t[3];
        assert!((linear - 0.5).abs() < 1e-9);
        let quad = tb.b[3][1] * tb.t[0].powi(2)
            + tb.b[3][2] * tb.t[1].powi(2)
            + tb.b[3][3] * tb.t[2].powi(2)
            + tb.b[3][4] * tb.t[3].powi(2);
        assert!((quad - 1.0 / 3.0).abs() < 1e-9);
    }
}
