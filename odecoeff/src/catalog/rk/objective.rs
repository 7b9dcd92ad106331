//! RK objective function, generalized over stage count rather than
//! hand-unrolled per scheme as `rk_objective_tb_2_2`/`rk_objective_tb_4_4`
//! do in the original — the feasibility loop is identical in shape for
//! every `s`, differing only in which entries it walks.

use rand_pcg::Pcg64;

use super::layout::RkTb;
use crate::ac;

/// Tier 1 (feasibility, `20 - S` for infeasibility sum `S < 0`) then tier 2
/// (`J = max(1, max_i t_i)`, the CFL-style value), the two-tier RK objective
/// shape. Every feasible draw scores below the `20` feasibility floor, so
/// the search always prefers a feasible point over an infeasible one. When
/// `strong`, runs the inner `a-c` search and returns the minimum of the
/// outer value and the inner `J_ac`.
#[allow(clippy::too_many_arguments)]
pub fn evaluate(
    tb: &RkTb,
    strong: bool,
    ac_variables: Option<&[crate::context::VariableSpec]>,
    ac_n_sim_density: u64,
    ac_nclimbings: u32,
    ac_n_iter: u32,
    ac_shrink: f64,
    ac_climb0: f64,
    rng: &mut Pcg64,
) -> f64 {
    let mut s: f64 = 0.0;
    for row in &tb.b {
        for &v in row {
            s += v.min(0.0);
        }
    }
    if let Some(e) = &tb.e {
        for &v in e {
            s += v.min(0.0);
        }
    }
    if s < 0.0 {
        return 20.0 - s;
    }

    let max_t = tb.t.iter().cloned().fold(1.0_f64, f64::max);
    let outer = max_t;

    if !strong {
        return outer;
    }

    let variables = match ac_variables {
        Some(v) => v.to_vec(),
        None => ac::default_variables(tb.s),
    };
    let j_ac = ac::run_inner_search(
        tb,
        &variables,
        ac_n_sim_density,
        ac_nclimbings,
        ac_n_iter,
        ac_shrink,
        ac_climb0,
        rng,
    );
    outer.min(j_ac)
}
