//! 2-stage RK solvers, grounded on `rk_2_2.c`: `rk_tb_2_2` (free node time
//! `t_1`), `rk_tb_2_2t` (time-accuracy variant, `t_1` fixed at `2/3`).

use super::layout::RkTb;
use crate::linalg::safe_div;

/// `nfree` for 2-stage order-2 RK: `1` in the base variant, `0` when
/// `time_accuracy` fixes `t_1`.
pub fn nfree(time_accuracy: bool) -> usize {
    if time_accuracy {
        0
    } else {
        1
    }
}

pub fn solve(free: &[f64], time_accuracy: bool) -> Option<RkTb> {
    let mut tb = RkTb::new(2);
    tb.t[1] = 1.0; // t_2 = 1, structural.
    tb.t[0] = if time_accuracy { 2.0 / 3.0 } else { free[0] };

    let t1 = tb.t[0];
    let b21 = safe_div(0.5, t1)?;
    tb.b[0][1] = b21;
    tb.close_row(0);

    if tb.b[0].iter().any(|v| !v.is_finite()) {
        return None;
    }
    Some(tb)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heun_point_is_feasible_and_consistent() {
        let tb = solve(&[1.0], false).unwrap();
        assert!((tb.b[0][1] - 0.5).abs() < 1e-12);
        assert!((tb.b[0][0] - 0.5).abs() < 1e-12);
        assert!(tb.row_sums_consistent());
        assert!(tb.final_t_is_one());
    }

    #[test]
    fn zero_node_time_is_infeasible() {
        assert!(solve(&[0.0], false).is_none());
    }
}
