//! RK `a-c` inner optimizer (C3).
//!
//! Grounded on the triangular back-substitution pattern
//! in `rk_ac_2`/`rk_ac_3` (`examples/original_source/rk.c`). One routine
//! serves every stage count `s <= 6`, rather than one hand-written solver
//! per `s`, since the back-substitution is uniform in `s`.

use rand_pcg::Pcg64;

use crate::catalog::rk::layout::RkTb;
use crate::context::{Ctx, RType, VariableSpec};
use crate::linalg::{flush, safe_div};
use crate::optimizer::{optimize_step, ObjectiveFn, SolverFn};

/// The Shu-Osher decomposition for one `s`-stage scheme: `a[i]` and `c[i]`
/// mirror `tb.b`'s row shape (row `k` has `k+2` entries, for rows
/// `i = 2..=s`).
#[derive(Debug, Clone)]
pub struct AcCoef {
    pub a: Vec<Vec<f64>>,
    pub c: Vec<Vec<f64>>,
}

/// Number of free variables in the Shu-Osher decomposition: the strict
/// lower triangle of `c`, i.e. `s(s-1)/2`.
pub fn nfree_ac(s: usize) -> usize {
    s * (s - 1) / 2
}

/// Solve the Shu-Osher decomposition given the already-solved `t-b` block
/// and a draw of the `nfree_ac(s)` free `c_{ij}` values (row-major over the
/// strict lower triangle, row `i` from 2..=s, column `j` from 1..i-1, plus
/// the `c_{i,1}`/`c_{i,0}` handling below). Implements the
/// back-substitution exactly, including the `b^hat` substitution of `t_1`
/// for `b_{1,0}`.
pub fn solve(tb: &RkTb, free_c: &[f64]) -> Option<AcCoef> {
    let s = tb.s;
    debug_assert_eq!(free_c.len(), nfree_ac(s));

    let mut a: Vec<Vec<f64>> = Vec::with_capacity(s - 1);
    let mut c: Vec<Vec<f64>> = Vec::with_capacity(s - 1);
    let mut cursor = 0usize;

    for row_idx in 0..(s - 1) {
        let i = row_idx + 2; // 1-indexed stage number, i = 2..=s
        let b_row = &tb.b[row_idx]; // b_{i,0..=i-1}
        let ncols = i; // entries j = 0..i-1

        let mut c_row = vec![0.0; ncols];
        for j in (1..ncols).rev() {
            c_row[j] = free_c[cursor];
            cursor += 1;
        }

        let mut a_row = vec![0.0; ncols];
        // a_{i,i-1} = b_{i,i-1} / c_{i,i-1}
        a_row[ncols - 1] = safe_div(b_row[ncols - 1], c_row[ncols - 1])?;

        // a_{i,j} = (b_{i,j} - sum_{k>j} a_{i,k} b_{k,j}) / c_{i,j}, j = i-2..1
        for j in (1..ncols.saturating_sub(1)).rev() {
            let mut acc = b_row[j];
            for k in (j + 1)..ncols {
                // b_{k,j}: the j-th weight of a previously-solved row k.
                // k ranges over stage indices 2..i, i.e. earlier rows.
                if k < i {
                    let earlier_row = &tb.b[k - 2];
                    if j < earlier_row.len() {
                        acc -= a_row[k] * earlier_row[j];
                    }
                }
            }
            a_row[j] = safe_div(acc, c_row[j])?;
        }

        // a_{i,0} = 1 - sum_{j>0} a_{i,j}
        let sum_rest: f64 = a_row[1..].iter().sum();
        a_row[0] = flush(1.0 - sum_rest);

        // c_{i,0} = (b_{i,0} - sum_{j>0} a_{i,j} b_hat_{j,0}) / a_{i,0}, where
        // b_hat substitutes t_1 for b_{1,0}.
        let mut numerator = b_row[0];
        for (j, &a_ij) in a_row.iter().enumerate().skip(1) {
            let b_hat_j0 = if j == 1 {
                tb.t[0] // t_1 stands in for b_{1,0}
            } else {
                tb.b[j - 2][0]
            };
            numerator -= a_ij * b_hat_j0;
        }
        c_row[0] = safe_div(numerator, a_row[0])?;

        if a_row.iter().chain(c_row.iter()).any(|v| !v.is_finite()) {
            return None;
        }

        a.push(a_row);
        c.push(c_row);
    }

    Some(AcCoef { a, c })
}

/// Tier-1 feasibility penalty (base `10`, the Shu-Osher block per
/// the Shu-Osher block) then tier-2 CFL `1 / max(t_1, max_{i,j} c_{ij})`.
pub fn objective(ac: &AcCoef, t1: f64) -> f64 {
    let mut s: f64 = 0.0;
    for row in &ac.a {
        for &v in row {
            s += v.min(0.0);
        }
    }
    if s < 0.0 {
        return 10.0 - s;
    }
    let mut s_c: f64 = 0.0;
    for row in &ac.c {
        for &v in row {
            s_c += v.min(0.0);
        }
    }
    if s_c < 0.0 {
        return 10.0 - s_c;
    }
    let mut max_c = t1;
    for row in &ac.c {
        for &v in row {
            if v > max_c {
                max_c = v;
            }
        }
    }
    if max_c <= 0.0 {
        return f64::INFINITY;
    }
    1.0 / max_c
}

/// Build the boxed solver/objective pair for the generic Shu-Osher search,
/// given the fixed `t-b` block it is decomposing.
pub fn descriptors(tb: RkTb) -> (SolverFn, ObjectiveFn) {
    let tb_for_solver = tb.clone();
    let solve_fn: SolverFn = Box::new(move |free, out| match solve(&tb_for_solver, free) {
        Some(ac) => {
            out.clear();
            for row in &ac.a {
                out.extend_from_slice(row);
            }
            for row in &ac.c {
                out.extend_from_slice(row);
            }
            out.push(tb_for_solver.t[0]);
            true
        }
        None => false,
    });

    let s = tb.s;
    let obj_fn: ObjectiveFn = Box::new(move |coef, _rng| {
        let n = nfree_ac(s) + (s - 1); // not used directly; coef carries flattened rows + t1
        let _ = n;
        // Reconstruct row shapes from the flattened buffer written above.
        let mut a = Vec::with_capacity(s - 1);
        let mut c = Vec::with_capacity(s - 1);
        let mut cursor = 0usize;
        for row_idx in 0..(s - 1) {
            let ncols = row_idx + 2;
            a.push(coef[cursor..cursor + ncols].to_vec());
            cursor += ncols;
        }
        for row_idx in 0..(s - 1) {
            let ncols = row_idx + 2;
            c.push(coef[cursor..cursor + ncols].to_vec());
            cursor += ncols;
        }
        let t1 = coef[cursor];
        objective(&AcCoef { a, c }, t1)
    });

    (solve_fn, obj_fn)
}

/// Run the serial inner `a-c` search to completion ("exactly
/// the same two-phase algorithm as the outer ... but serial ... participates
/// in no MPI"). Returns the best objective value found.
pub fn run_inner_search(
    tb: &RkTb,
    variables: &[VariableSpec],
    n_sim_density: u64,
    nclimbings: u32,
    n_iter: u32,
    shrink: f64,
    climb0: f64,
    rng: &mut Pcg64,
) -> f64 {
    let s = tb.s;
    let mut ctx = Ctx::new(variables, n_sim_density, nclimbings, n_iter, shrink, climb0);
    ctx.size = nfree_ac(s) + (s - 1) + 1;
    let (solve_fn, obj_fn) = descriptors(tb.clone());
    for _ in 0..ctx.n_iter {
        optimize_step(&ctx, 0, 1, 0, 1, rng, &solve_fn, &obj_fn);
        ctx.contract();
    }
    ctx.best.lock().expect("best lock poisoned").j_star
}

/// Default variable specs for the `a-c` search: every free `c_{ij}` drawn
/// uniformly from `[0, 1]`, matching the request-document default for the
/// `ac` child.
pub fn default_variables(s: usize) -> Vec<VariableSpec> {
    (0..nfree_ac(s))
        .map(|_| VariableSpec {
            minimum: 0.0,
            interval: 1.0,
            rtype: RType::Uniform,
        })
        .collect()
}
