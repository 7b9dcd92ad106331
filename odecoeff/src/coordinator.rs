//! Thread + (optional) MPI fan-out for one optimization iteration (C5).
//!
//! Grounded on `optimize_bucle` in `examples/original_source/optimize.c`:
//! each rank spawns `thread_count` worker threads that each run one
//! `optimizer::optimize_step` over its partition of the sample space, then
//! (when built with the `mpi` feature and running under more than one
//! rank) the ranks reconcile their local bests into a single global best —
//! the "MPI consensus" phase. A single-rank run (the default, or the
//! `mpi` feature disabled) has nothing to reconcile and skips consensus.
//!
//! Per DESIGN.md's Open Question 3, the consensus send/receive loops below
//! use the receiving rank's own loop counter (`j`) throughout, unlike the
//! original's off-by-loop bug in the analogous send loop in
//! `examples/original_source/rk.c` (which reused the outer loop's `i`).

use rand_pcg::Pcg64;

use crate::context::Ctx;
use crate::optimizer::{self, ObjectiveFn, SolverFn};
use crate::rng::MasterRng;

/// Process/rank topology. With the `mpi` feature disabled (the default),
/// this is always a single rank and `run_iteration` never attempts
/// consensus.
pub struct Topology {
    #[cfg(feature = "mpi")]
    world: mpi::topology::SimpleCommunicator,
    #[cfg(feature = "mpi")]
    #[allow(dead_code)]
    universe: mpi::environment::Universe,
}

impl Topology {
    #[cfg(feature = "mpi")]
    pub fn init() -> Self {
        use mpi::traits::*;
        let universe = mpi::initialize().expect("MPI_Init failed");
        let world = universe.world();
        Topology { universe, world }
    }

    #[cfg(not(feature = "mpi"))]
    pub fn init() -> Self {
        Topology {}
    }

    pub fn rank(&self) -> u32 {
        #[cfg(feature = "mpi")]
        {
            use mpi::traits::*;
            self.world.rank() as u32
        }
        #[cfg(not(feature = "mpi"))]
        {
            0
        }
    }

    pub fn rank_count(&self) -> u32 {
        #[cfg(feature = "mpi")]
        {
            use mpi::traits::*;
            self.world.size() as u32
        }
        #[cfg(not(feature = "mpi"))]
        {
            1
        }
    }
}

/// Fan out `thread_count` worker threads for one iteration, each running
/// one Monte-Carlo-plus-hill-climb pass over its partition, then (if
/// compiled with the `mpi` feature and `rank_count() > 1`) reconcile the
/// per-rank bests into a single global best shared by every rank's `ctx`.
pub fn run_iteration(
    topo: &Topology,
    ctx: &Ctx,
    thread_count: u32,
    master: &mut MasterRng,
    solve: &SolverFn,
    objective: &ObjectiveFn,
) {
    let rank = topo.rank();
    let rank_count = topo.rank_count();
    let mut rngs: Vec<Pcg64> = (0..thread_count).map(|t| master.derive(rank, t)).collect();

    std::thread::scope(|scope| {
        let mut handles = Vec::with_capacity(thread_count as usize);
        for (thread, rng) in rngs.iter_mut().enumerate() {
            let ctx_ref = ctx;
            let solve_ref = solve;
            let objective_ref = objective;
            handles.push(scope.spawn(move || {
                optimizer::optimize_step(
                    ctx_ref,
                    rank,
                    rank_count,
                    thread as u32,
                    thread_count,
                    rng,
                    solve_ref,
                    objective_ref,
                );
            }));
        }
        for h in handles {
            h.join().expect("worker thread panicked");
        }
    });

    #[cfg(feature = "mpi")]
    if rank_count > 1 {
        mpi_consensus(topo, ctx);
    }
    #[cfg(not(feature = "mpi"))]
    {
        let _ = rank_count;
    }
}

#[cfg(feature = "mpi")]
fn mpi_consensus(topo: &Topology, ctx: &Ctx) {
    use mpi::traits::*;

    let world = &topo.world;
    let rank = world.rank();
    let size = world.size();
    let nfree = ctx.nfree;

    let mut buf = vec![0.0_f64; nfree + 1];
    {
        let best = ctx.best.lock().expect("best lock poisoned");
        buf[0] = best.j_star;
        buf[1..].copy_from_slice(&best.x_star);
    }

    if rank == 0 {
        let mut best_j = buf[0];
        let mut best_x = buf[1..].to_vec();

        for j in 1..size {
            let (incoming, _status) = world.process_at_rank(j).receive_vec::<f64>();
            if incoming[0] < best_j {
                best_j = incoming[0];
                best_x = incoming[1..].to_vec();
            }
        }

        let mut result = Vec::with_capacity(nfree + 1);
        result.push(best_j);
        result.extend_from_slice(&best_x);
        for j in 1..size {
            world.process_at_rank(j).send(&result[..]);
        }

        let mut best = ctx.best.lock().expect("best lock poisoned");
        best.j_star = best_j;
        best.x_star = best_x;
    } else {
        world.process_at_rank(0).send(&buf[..]);
        let (result, _status) = world.process_at_rank(0).receive_vec::<f64>();
        let mut best = ctx.best.lock().expect("best lock poisoned");
        best.j_star = result[0];
        best.x_star = result[1..].to_vec();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{RType, VariableSpec};

    #[test]
    fn single_rank_topology_has_one_rank() {
        let topo = Topology::init();
        assert_eq!(topo.rank(), 0);
        assert_eq!(topo.rank_count(), 1);
    }

    #[test]
    fn run_iteration_improves_best_single_rank() {
        let vars = vec![VariableSpec {
            minimum: 0.0,
            interval: 1.0,
            rtype: RType::Uniform,
        }];
        let mut ctx = Ctx::new(&vars, 8, 2, 3, 0.8, 0.2);
        ctx.size = 1;
        let solve: SolverFn = Box::new(|free, coef| {
            coef.clear();
            coef.push(free[0]);
            true
        });
        let objective: ObjectiveFn = Box::new(|coef, _rng| {
            let d = coef[0] - 0.42;
            d * d
        });
        let topo = Topology::init();
        let mut master = MasterRng::new(11);
        run_iteration(&topo, &ctx, 2, &mut master, &solve, &objective);
        let best = ctx.best.lock().unwrap();
        assert!(best.j_star.is_finite());
    }
}
