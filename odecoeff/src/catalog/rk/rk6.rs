//! 6-stage RK solvers. `solve_6_2` is transcribed from `rk_tb_6_2` in
//! `examples/original_source/rk_6_2.c`: every weight but the last of the
//! final row is free; `b61` closes the single order-2 moment condition
//! `b61*t1+b62*t2+b63*t3+b64*t4+b65*t5=1/2`. `solve_6_3` is transcribed
//! from `rk_tb_6_3` in `examples/original_source/rk_6_3.c`: free
//! `t1, t2, b21, t3, b31, b32, t4, b41, b42, b43, t5, b51, b52, b53, b54,
//! b65, b64`, with `b61, b62, b63` closed by a 3x3 dense solve of the
//! order-3 moment conditions. The 6-stage order-4 case (`rk_6_4.c`) has
//! no literal closed form recovered and still goes through
//! the shared general dense-solve path (see `catalog::rk::general` and
//! DESIGN.md).

use super::layout::RkTb;
use crate::linalg::{safe_div, solve as solve_dense};

/// `nfree` for the 6-stage order-2 RK: `t1, t2, b21, t3, b31, b32, t4,
/// b41, b42, b43, t5, b51, b52, b53, b54, b62, b63, b64, b65` are free;
/// `b61` is derived.
pub const NFREE_6_2: usize = 19;

/// `free = [t1, t2, b21, t3, b31, b32, t4, b41, b42, b43, t5, b51, b52,
/// b53, b54, b62, b63, b64, b65]`.
pub fn solve_6_2(free: &[f64]) -> Option<RkTb> {
    let mut tb = RkTb::new(6);
    let (
        t1, t2, b21, t3, b31, b32, t4, b41, b42, b43, t5, b51, b52, b53, b54, b62, b63, b64, b65,
    ) = (
        free[0], free[1], free[2], free[3], free[4], free[5], free[6], free[7], free[8],
        free[9], free[10], free[11], free[12], free[13], free[14], free[15], free[16],
        free[17], free[18],
    );
    tb.t[0] = t1;
    tb.t[1] = t2;
    tb.t[2] = t3;
    tb.t[3] = t4;
    tb.t[4] = t5;
    tb.t[5] = 1.0;

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

    let b61 = safe_div(0.5 - b62 * t2 - b63 * t3 - b64 * t4 - b65 * t5, t1)?;
    tb.b[4][1] = b61;
    tb.b[4][2] = b62;
    tb.b[4][3] = b63;
    tb.b[4][4] = b64;
    tb.b[4][5] = b65;
    tb.close_row(4);

    if tb.b.iter().flatten().any(|v| !v.is_finite()) {
        return None;
    }
    Some(tb)
}

/// `nfree` for the 6-stage order-3 RK: `t1, t2, b21, t3, b31, b32, t4,
/// b41, b42, b43, t5, b51, b52, b53, b54, b65, b64` are free; `b61, b62,
/// b63` are derived.
pub const NFREE_6_3: usize = 17;

/// `free = [t1, t2, b21, t3, b31, b32, t4, b41, b42, b43, t5, b51, b52,
/// b53, b54, b65, b64]`.
pub fn solve_6_3(free: &[f64]) -> Option<RkTb> {
    let mut tb = RkTb::new(6);
    let (t1, t2, b21, t3, b31, b32, t4, b41, b42, b43, t5, b51, b52, b53, b54, b65, b64) = (
        free[0], free[1], free[2], free[3], free[4], free[5], free[6], free[7], free[8],
        free[9], free[10], free[11], free[12], free[13], free[14], free[15], free[16],
    );
    tb.t[0] = t1;
    tb.t[1] = t2;
    tb.t[2] = t3;
    tb.t[3] = t4;
    tb.t[4] = t5;
    tb.t[5] = 1.0;

    // Solve for [b61, b62, b63] (row-major columns, same pattern as
    // `rk_tb_6_3`'s `solve_3`).
    let a_mat = [
        t1, t2, t3,
        t1 * t1, t2 * t2, t3 * t3,
        0.0, b21 * t1, b31 * t1 + b32 * t2,
    ];
    let rhs = [
        0.5 - b64 * t4 - b65 * t5,
        1.0 / 3.0 - b64 * t4 * t4 - b65 * t5 * t5,
        1.0 / 6.0 - b64 * (b41 * t1 + b42 * t2 + b43 * t3)
            - b65 * (b51 * t1 + b52 * t2 + b53 * t3 + b54 * t4),
    ];

    let solved = solve_dense(3, &a_mat, &rhs)?;
    let (b61, b62, b63) = (solved[0], solved[1], solved[2]);

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

    tb.b[4][1] = b61;
    tb.b[4][2] = b62;
    tb.b[4][3] = b63;
    tb.b[4][4] = b64;
    tb.b[4][5] = b65;
    tb.close_row(4);

    if tb.b.iter().flatten().any(|v| !v.is_finite()) {
        return None;
    }
    Some(tb)
}
