//! Runge-Kutta scheme catalog entries.

pub mod general;
pub mod layout;
pub mod objective;
pub mod rk2;
pub mod rk3;
pub mod rk4;
pub mod rk5;
pub mod rk6;

use rand_pcg::Pcg64;

use super::AcSearchConfig;
use crate::context::{RType, VariableSpec};
use crate::optimizer::{ObjectiveFn, SolverFn};

pub struct RkScheme {
    pub nfree: usize,
    pub size: usize,
    pub solve: SolverFn,
    pub objective: ObjectiveFn,
    pub default_variables: Vec<VariableSpec>,
    pub file_name: String,
}

/// Resolve `(steps, order, strong, pair, time_accuracy)` against the RK
/// catalog. Returns `None` for unsupported combinations (caller maps this
/// to `OdeError::UnknownMethod`).
pub fn build(
    steps: u32,
    order: u32,
    strong: bool,
    pair: bool,
    time_accuracy: bool,
    ac_config: AcSearchConfig,
) -> Option<RkScheme> {
    let s = steps as usize;
    let order_usize = order as usize;
    if !(2..=6).contains(&s) || order_usize < 2 || order_usize > s {
        return None;
    }

    let (nfree, solver): (usize, SolverFn) = match (s, order_usize, strong, time_accuracy) {
        (2, 2, _, ta) => (
            rk2::nfree(ta),
            Box::new(move |free: &[f64], out: &mut Vec<f64>| match rk2::solve(free, ta) {
                Some(tb) => {
                    *out = tb.flatten();
                    true
                }
                None => false,
            }) as SolverFn,
        ),
        (3, 2, _, _) => (
            rk3::NFREE_3_2,
            Box::new(|free: &[f64], out: &mut Vec<f64>| match rk3::solve_3_2(free) {
                Some(tb) => {
                    *out = tb.flatten();
                    true
                }
                None => false,
            }) as SolverFn,
        ),
        (3, 3, false, _) => (
            rk3::NFREE_3_3,
            Box::new(|free: &[f64], out: &mut Vec<f64>| match rk3::solve_3_3(free) {
                Some(tb) => {
                    *out = tb.flatten();
                    true
                }
                None => false,
            }) as SolverFn,
        ),
        (4, 2, _, _) => (
            rk4::NFREE_4_2,
            Box::new(|free: &[f64], out: &mut Vec<f64>| match rk4::solve_4_2(free) {
                Some(tb) => {
                    *out = tb.flatten();
                    true
                }
                None => false,
            }) as SolverFn,
        ),
        (4, 3, _, _) => (
            rk4::NFREE_4_3,
            Box::new(|free: &[f64], out: &mut Vec<f64>| match rk4::solve_4_3(free) {
                Some(tb) => {
                    *out = tb.flatten();
                    true
                }
                None => false,
            }) as SolverFn,
        ),
        (4, 4, _, ta) => (
            rk4::NFREE_4_4,
            Box::new(move |free: &[f64], out: &mut Vec<f64>| match rk4::solve(free, ta) {
                Some(tb) => {
                    *out = tb.flatten();
                    true
                }
                None => false,
            }) as SolverFn,
        ),
        (5, 2, _, _) => (
            rk5::NFREE_5_2,
            Box::new(|free: &[f64], out: &mut Vec<f64>| match rk5::solve_5_2(free) {
                Some(tb) => {
                    *out = tb.flatten();
                    true
                }
                None => false,
            }) as SolverFn,
        ),
        (5, 3, _, _) => (
            rk5::NFREE_5_3,
            Box::new(|free: &[f64], out: &mut Vec<f64>| match rk5::solve_5_3(free) {
                Some(tb) => {
                    *out = tb.flatten();
                    true
                }
                None => false,
            }) as SolverFn,
        ),
        (6, 2, _, _) => (
            rk6::NFREE_6_2,
            Box::new(|free: &[f64], out: &mut Vec<f64>| match rk6::solve_6_2(free) {
                Some(tb) => {
                    *out = tb.flatten();
                    true
                }
                None => false,
            }) as SolverFn,
        ),
        (6, 3, _, _) => (
            rk6::NFREE_6_3,
            Box::new(|free: &[f64], out: &mut Vec<f64>| match rk6::solve_6_3(free) {
                Some(tb) => {
                    *out = tb.flatten();
                    true
                }
                None => false,
            }) as SolverFn,
        ),
        _ => {
            let pair_flag = pair;
            (
                general::nfree(s),
                Box::new(move |free: &[f64], out: &mut Vec<f64>| {
                    match general::solve_general(s, order_usize, pair_flag, free) {
                        Some(tb) => {
                            *out = tb.flatten();
                            true
                        }
                        None => false,
                    }
                }) as SolverFn,
            )
        }
    };

    let size = layout::RkTb::coefficient_count(s, pair);
    let default_variables = (0..nfree)
        .map(|_| VariableSpec {
            minimum: 0.0,
            interval: 1.0,
            rtype: RType::Uniform,
        })
        .collect();

    let objective: ObjectiveFn = {
        let ac_cfg = ac_config;
        Box::new(move |coef: &[f64], rng: &mut Pcg64| {
            let tb = layout::RkTb::from_flat(s, pair, coef);
            objective::evaluate(
                &tb,
                strong,
                ac_cfg.variables.as_deref(),
                ac_cfg.n_sim_density,
                ac_cfg.nclimbings,
                ac_cfg.niterations,
                ac_cfg.convergence_factor,
                ac_cfg.climbing_factor,
                rng,
            )
        })
    };

    let file_name = format!(
        "rk-{}-{}-{}-{}-{}.mc",
        steps, order, time_accuracy as u8, pair as u8, strong as u8
    );

    Some(RkScheme {
        nfree,
        size,
        solve: solver,
        objective,
        default_variables,
        file_name,
    })
}
