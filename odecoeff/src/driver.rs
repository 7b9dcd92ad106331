//! Top-level driver (C6): resolves a [`Request`] against the catalog, runs
//! the outer iteration loop, and writes the artifact. Grounded on
//! `main`/`optimize_create` in `examples/original_source/ode.c` and
//! `optimize.c`.

use std::path::{Path, PathBuf};
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::artifact;
use crate::catalog::{self, AcSearchConfig, CatalogKey};
use crate::config::{Family, Request};
use crate::context::Ctx;
use crate::coordinator::{self, Topology};
use crate::errors::{OdeError, Result};
use crate::rng::MasterRng;

/// Summary of a completed driver run, logged via `tracing` and returned to
/// library callers so embedders don't need to re-parse the `.mc` artifact.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub family: &'static str,
    pub steps: u32,
    pub order: u32,
    pub j_star: f64,
    pub iterations: u32,
    pub wall_clock: std::time::Duration,
    pub artifact_path: PathBuf,
}

/// Run a full search for the scheme named by `request`, writing the
/// resulting artifact under `output_dir`, using `seed` as the PRNG master
/// seed and `threads` worker threads per rank (rank count comes from the
/// process `Topology`, i.e. the `mpi` feature and the runtime world size).
pub fn run(
    request: &Request,
    output_dir: &Path,
    seed: u64,
    threads: u32,
    trace_path: Option<&Path>,
) -> Result<RunReport> {
    let start = Instant::now();
    let topo = Topology::init();
    let mut trace_file = match trace_path {
        Some(p) => Some(
            std::fs::File::create(p).map_err(|source| OdeError::IoOpenFail {
                path: p.to_path_buf(),
                source,
            })?,
        ),
        None => None,
    };

    let ac_config = request
        .ac
        .as_ref()
        .map(|ac| AcSearchConfig {
            variables: if ac.variable.is_empty() {
                None
            } else {
                Some(ac.variable.clone())
            },
            n_sim_density: ac.nsimulations,
            nclimbings: ac.nclimbings,
            niterations: ac.niterations,
            convergence_factor: ac.convergence_factor,
            climbing_factor: ac.climbing_factor,
        })
        .unwrap_or_default();

    let (key, family_name) = match request.family {
        Family::RungeKutta => (
            CatalogKey::Rk {
                steps: request.steps,
                order: request.order,
                strong: request.strong,
                pair: request.pair,
                time_accuracy: request.time_accuracy,
            },
            "runge-kutta",
        ),
        Family::Steps => (
            CatalogKey::Multistep {
                steps: request.steps,
                order: request.order,
            },
            "steps",
        ),
    };

    let scheme = catalog::lookup(key, ac_config).ok_or_else(|| OdeError::UnknownMethod {
        family: family_name.to_string(),
        steps: request.steps,
        order: request.order,
    })?;

    info!(
        family = family_name,
        steps = request.steps,
        order = request.order,
        nfree = scheme.nfree,
        "starting coefficient search"
    );

    let variables = if request.variable.is_empty() {
        scheme.default_variables.clone()
    } else {
        request.variable.clone()
    };

    let mut ctx = Ctx::new(
        &variables,
        request.nsimulations,
        request.nclimbings,
        request.niterations,
        request.convergence_factor,
        request.climbing_factor,
    );
    ctx.size = scheme.size;

    let mut master = MasterRng::new(seed);
    let rank = topo.rank();

    for iter in 0..ctx.n_iter {
        coordinator::run_iteration(&topo, &ctx, threads, &mut master, &scheme.solve, &scheme.objective);
        ctx.contract();
        let best = ctx.best.lock().expect("best lock poisoned");
        debug!(iteration = iter, j_star = best.j_star, rank, "iteration complete");
        if !best.j_star.is_finite() {
            warn!(iteration = iter, "entire iteration found no feasible sample");
        }
        if let Some(file) = trace_file.as_mut() {
            use std::io::Write as _;
            writeln!(file, "{iter},{}", best.j_star).map_err(|source| OdeError::IoOpenFail {
                path: trace_path.unwrap().to_path_buf(),
                source,
            })?;
        }
    }

    let mut coef = vec![0.0; ctx.size.max(1)];
    let x_star = ctx.best.lock().expect("best lock poisoned").x_star.clone();
    let ok = (scheme.solve)(&x_star, &mut coef);
    if !ok {
        warn!("final best draw failed to re-solve; artifact reflects the raw draw");
    }

    std::fs::create_dir_all(output_dir).map_err(|source| OdeError::IoOpenFail {
        path: output_dir.to_path_buf(),
        source,
    })?;
    let artifact_path = output_dir.join(&scheme.file_name);

    let (assignments, identities) = match request.family {
        Family::RungeKutta => {
            let tb = crate::catalog::rk::layout::RkTb::from_flat(
                request.steps as usize,
                request.pair,
                &coef,
            );
            (artifact::rk_assignments(&tb), artifact::rk_identities(&tb))
        }
        Family::Steps => {
            let steps_coef =
                crate::catalog::multistep::layout::StepsCoef::from_flat(request.steps as usize, &coef);
            (
                artifact::multistep_assignments(&steps_coef),
                artifact::multistep_identities(&steps_coef, request.order),
            )
        }
    };
    artifact::write_artifact(&artifact_path, &assignments, &identities)?;

    let j_star = ctx.best.lock().expect("best lock poisoned").j_star;
    info!(j_star, path = %artifact_path.display(), "search complete");

    Ok(RunReport {
        family: family_name,
        steps: request.steps,
        order: request.order,
        j_star,
        iterations: ctx.n_iter,
        wall_clock: start.elapsed(),
        artifact_path,
    })
}
