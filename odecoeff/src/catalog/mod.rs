//! Scheme catalog: resolves a requested method into closed-form or
//! generalized solver/objective pairs, replacing the original's sparse
//! function-pointer table (`examples/original_source/rk.c`'s dispatch
//! array) with a tagged `match` over a `CatalogKey`.

pub mod multistep;
pub mod rk;

use crate::context::VariableSpec;
use crate::optimizer::{ObjectiveFn, SolverFn};

/// Configuration for the inner Shu-Osher `a-c` search, threaded
/// through from the request file down into the RK objective when
/// `strong` is set. `variables: None` means "use `ac::default_variables`".
#[derive(Debug, Clone)]
pub struct AcSearchConfig {
    pub variables: Option<Vec<VariableSpec>>,
    pub n_sim_density: u64,
    pub nclimbings: u32,
    pub niterations: u32,
    pub convergence_factor: f64,
    pub climbing_factor: f64,
}

impl Default for AcSearchConfig {
    fn default() -> Self {
        AcSearchConfig {
            variables: None,
            n_sim_density: 4,
            nclimbings: 8,
            niterations: 4,
            convergence_factor: 0.5,
            climbing_factor: 0.1,
        }
    }
}

/// Which family + shape of scheme a request names.
#[derive(Debug, Clone, Copy)]
pub enum CatalogKey {
    Rk {
        steps: u32,
        order: u32,
        strong: bool,
        pair: bool,
        time_accuracy: bool,
    },
    Multistep {
        steps: u32,
        order: u32,
    },
}

/// A resolved catalog entry, family-erased for the driver/coordinator.
pub struct SchemeDescriptor {
    pub nfree: usize,
    pub size: usize,
    pub solve: SolverFn,
    pub objective: ObjectiveFn,
    pub default_variables: Vec<VariableSpec>,
    pub file_name: String,
}

impl From<rk::RkScheme> for SchemeDescriptor {
    fn from(s: rk::RkScheme) -> Self {
        SchemeDescriptor {
            nfree: s.nfree,
            size: s.size,
            solve: s.solve,
            objective: s.objective,
            default_variables: s.default_variables,
            file_name: s.file_name,
        }
    }
}

impl From<multistep::MultistepScheme> for SchemeDescriptor {
    fn from(s: multistep::MultistepScheme) -> Self {
        SchemeDescriptor {
            nfree: s.nfree,
            size: s.size,
            solve: s.solve,
            objective: s.objective,
            default_variables: s.default_variables,
            file_name: s.file_name,
        }
    }
}

/// Look up a scheme descriptor by catalog key. `ac_config` only matters
/// for `CatalogKey::Rk { strong: true, .. }`.
pub fn lookup(key: CatalogKey, ac_config: AcSearchConfig) -> Option<SchemeDescriptor> {
    match key {
        CatalogKey::Rk {
            steps,
            order,
            strong,
            pair,
            time_accuracy,
        } => rk::build(steps, order, strong, pair, time_accuracy, ac_config).map(Into::into),
        CatalogKey::Multistep { steps, order } => multistep::build(steps, order).map(Into::into),
    }
}
