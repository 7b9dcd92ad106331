//! Linear multi-step scheme catalog entries.

pub mod layout;
pub mod objective;
pub mod solvers;

use rand_pcg::Pcg64;

use crate::context::{RType, VariableSpec};
use crate::optimizer::{ObjectiveFn, SolverFn};

pub struct MultistepScheme {
    pub nfree: usize,
    pub size: usize,
    pub solve: SolverFn,
    pub objective: ObjectiveFn,
    pub default_variables: Vec<VariableSpec>,
    pub file_name: String,
}

/// Resolve `(steps, order)` against the multi-step catalog. Returns `None`
/// for unsupported combinations (caller maps this to
/// `OdeError::UnknownMethod`).
pub fn build(steps: u32, order: u32) -> Option<MultistepScheme> {
    let k = steps as usize;
    let p = order;
    if !(2..=8).contains(&k) || p < 1 || p as usize > k {
        return None;
    }

    let nfree = solvers::nfree(k);
    let size = layout::StepsCoef::coefficient_count(k);
    let solve: SolverFn = Box::new(move |free: &[f64], out: &mut Vec<f64>| {
        match solvers::solve(k, p, free) {
            Some(coef) => {
                *out = coef.flatten();
                true
            }
            None => false,
        }
    });

    let default_variables = (0..nfree)
        .map(|_| VariableSpec {
            minimum: -(k as f64),
            interval: k as f64,
            rtype: RType::Uniform,
        })
        .collect();

    let objective: ObjectiveFn = Box::new(move |flat: &[f64], _rng: &mut Pcg64| {
        let coef = layout::StepsCoef::from_flat(k, flat);
        objective::evaluate(&coef)
    });

    let file_name = format!("steps-{}-{}.mc", steps, order);

    Some(MultistepScheme {
        nfree,
        size,
        solve,
        objective,
        default_variables,
        file_name,
    })
}
