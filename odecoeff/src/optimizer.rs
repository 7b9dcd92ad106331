//! Two-phase stochastic optimizer (C4).
//!
//! Grounded on `optimize_step` in `examples/original_source/optimize.c`:
//! a Monte-Carlo sweep over a partitioned index range followed by an
//! axis-parallel hill-climbing sweep with adaptive step scaling. The same
//! routine serves both the outer (possibly multi-threaded, multi-rank)
//! search and the serial inner `a-c` search — the caller simply
//! passes `rank_count = thread_count = 1` for the inner case.

use rand_pcg::Pcg64;

use crate::context::Ctx;

/// A scheme solver: maps a free-variable draw to the full coefficient
/// vector, returning `false` (infeasible) if any derived value is
/// non-finite. Boxed rather than a bare `fn` pointer because concrete
/// solvers close over fixed scheme parameters (stage/step count, variant
/// flags) selected at catalog lookup time.
pub type SolverFn = Box<dyn Fn(&[f64], &mut Vec<f64>) -> bool + Send + Sync>;

/// A scheme objective: maps a filled coefficient vector to a scalar. Takes
/// the calling thread's own RNG so that a "strong" RK objective can run
/// the serial inner `a-c` optimizer without any shared RNG state.
pub type ObjectiveFn = Box<dyn Fn(&[f64], &mut Pcg64) -> f64 + Send + Sync>;

/// Draw the `nfree` free variables for one Monte-Carlo sample.
fn draw_sample(ctx: &Ctx, rng: &mut Pcg64, out: &mut Vec<f64>) {
    out.clear();
    for j in 0..ctx.nfree {
        let u = ctx.rtype[j].draw(rng);
        out.push(ctx.min[j] + ctx.span[j] * u);
    }
}

/// Phase A: Monte-Carlo sweep over this thread's partition of the sample
/// space. Returns the best `(J, x)` this thread found (`J = +inf` if every
/// draw was infeasible).
fn monte_carlo_sweep(
    ctx: &Ctx,
    rank: u32,
    rank_count: u32,
    thread: u32,
    thread_count: u32,
    rng: &mut Pcg64,
    solve: &SolverFn,
    objective: &ObjectiveFn,
    coef: &mut Vec<f64>,
) -> (f64, Vec<f64>) {
    let denom = (rank_count as u64) * (thread_count as u64);
    let lane = (rank as u64) * (thread_count as u64) + thread as u64;
    let i0 = ctx.n_sim * lane / denom;
    let i1 = ctx.n_sim * (lane + 1) / denom;

    let mut free = Vec::with_capacity(ctx.nfree);
    let mut best_j = f64::INFINITY;
    let mut best_x = vec![0.0; ctx.nfree];

    for _ in i0..i1 {
        draw_sample(ctx, rng, &mut free);
        let j = if solve(&free, coef) {
            objective(coef, rng)
        } else {
            f64::INFINITY
        };
        if j < best_j {
            best_j = j;
            best_x.copy_from_slice(&free);
        }
    }
    (best_j, best_x)
}

/// Phase B: axis-parallel hill climbing from `(v_j, x)`, for
/// `ctx.n_climb_scaled` rounds (already the configured value times
/// `nfree`; see DESIGN.md Open Question 1). Mutates `(v_j, x)` in place.
fn hill_climb(
    ctx: &Ctx,
    rng: &mut Pcg64,
    solve: &SolverFn,
    objective: &ObjectiveFn,
    coef: &mut Vec<f64>,
    v_j: &mut f64,
    x: &mut [f64],
) {
    if ctx.n_climb_scaled == 0 || *v_j == f64::INFINITY {
        return;
    }
    let mut h: Vec<f64> = ctx.span0.iter().map(|s| s * ctx.climb0).collect();
    let mut trial = x.to_vec();

    for _ in 0..ctx.n_climb_scaled {
        let mut improved = false;
        for j in 0..ctx.nfree {
            let original = x[j];

            trial.copy_from_slice(x);
            trial[j] = original + h[j];
            if solve(&trial, coef) {
                let j_val = objective(coef, rng);
                if j_val < *v_j {
                    *v_j = j_val;
                    x[j] = trial[j];
                    improved = true;
                    continue;
                }
            }

            trial.copy_from_slice(x);
            trial[j] = (original - h[j]).max(0.0);
            if solve(&trial, coef) {
                let j_val = objective(coef, rng);
                if j_val < *v_j {
                    *v_j = j_val;
                    x[j] = trial[j];
                    improved = true;
                }
            }
        }
        let factor = if improved { 1.2 } else { 0.5 };
        for hj in h.iter_mut() {
            *hj *= factor;
        }
    }
}

/// One full optimization step (Phase A + Phase B) for one `(rank, thread)`
/// lane, offering its result to `ctx.best` under the best-lock.
#[allow(clippy::too_many_arguments)]
pub fn optimize_step(
    ctx: &Ctx,
    rank: u32,
    rank_count: u32,
    thread: u32,
    thread_count: u32,
    rng: &mut Pcg64,
    solve: &SolverFn,
    objective: &ObjectiveFn,
) {
    let mut coef = vec![0.0; ctx.size.max(1)];
    let (mut j_local, mut x_local) = monte_carlo_sweep(
        ctx, rank, rank_count, thread, thread_count, rng, solve, objective, &mut coef,
    );

    hill_climb(ctx, rng, solve, objective, &mut coef, &mut j_local, &mut x_local);

    if j_local < f64::INFINITY {
        let mut best = ctx.best.lock().expect("best lock poisoned");
        best.offer(j_local, &x_local);
    }
}
