// Copyright 2020 Xavier Gillard
//
// Permission is hereby granted, free of charge, to any person obtaining a copy of
// this software and associated documentation files (the "Software"), to deal in
// the Software without restriction, including without limitation the rights to
// use, copy, modify, merge, publish, distribute, sublicense, and/or sell copies of
// the Software, and to permit persons to whom the Software is furnished to do so,
// subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included in all
// copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY, FITNESS
// FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR
// COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER
// IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN
// CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

//! One worker per thread. A worker owns everything it touches during the
//! search: its instance, its pool and its search operators. The only means
//! of stopping it is the cooperative cancellation token which it probes at
//! every loop point of the operators.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};

use crate::instance::Instance;
use crate::pool::{NoSolution, Pool};
use crate::search::{HillClimbing, IteratedLocalSearch, RandomMoves};
use crate::solution::Solution;

/// A cooperative cancellation flag shared between the coordinator and the
/// workers. Raising it never interrupts anything by force: each operator
/// polls the token at its loop points and winds down with its current best.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> CancellationToken {
        CancellationToken::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

/// The tunables of the search, one field per command line knob.
#[derive(Debug, Clone, Copy)]
pub struct SearchParams {
    /// Perturbation move count, as a fraction of the number of processes
    /// (`-a`).
    pub perturbation_ratio: f64,
    /// Max processes considered per local search scan (`-b`).
    pub ls_num_processes: usize,
    /// Max non-improving iterations of the ILS driver (`-c`).
    pub max_num_non_improv_iter: i64,
    /// Max machines considered per local search scan (`-e`).
    pub ls_num_machines: usize,
    /// Consecutive non-improving local search scans before giving up (`-f`).
    pub ls_num_tries_max: usize,
}

impl Default for SearchParams {
    fn default() -> SearchParams {
        SearchParams {
            perturbation_ratio: 0.01,
            ls_num_processes: 200,
            max_num_non_improv_iter: 200,
            ls_num_machines: 500,
            ls_num_tries_max: 10,
        }
    }
}

/// A self-contained search worker. It seeds its pool with the initial
/// assignment and then keeps restarting the iterated local search from the
/// best pooled solution until it is cancelled.
pub struct Worker {
    inst: Arc<Instance>,
    pool: Pool,
    ils: IteratedLocalSearch,
}

impl Worker {
    /// Builds a worker from its own copy of the instance and its own seed.
    /// The worker generator hands the perturbation seed first and the local
    /// search seed second; keeping that order keeps the single-threaded
    /// trajectory reproducible for a given master seed.
    pub fn new(inst: Arc<Instance>, params: &SearchParams, seed: u64) -> Worker {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);

        let num_moves =
            (inst.num_processes() as f64 * params.perturbation_ratio) as usize;
        let perturbation = RandomMoves::new(rng.gen(), num_moves);
        let local_search = HillClimbing::new(
            rng.gen(),
            &inst,
            params.ls_num_processes,
            params.ls_num_machines,
            params.ls_num_tries_max,
        );
        let ils =
            IteratedLocalSearch::new(params.max_num_non_improv_iter, local_search, perturbation);

        Worker { inst, pool: Pool::new(1), ils }
    }

    /// Runs until cancelled.
    ///
    /// # Panics
    /// When the initial assignment violates a capacity: the engine assumes
    /// a feasible initial assignment, so this is a programmer error rather
    /// than a recoverable condition.
    pub fn run(&mut self, cancellation: &CancellationToken) {
        let initial = Solution::new(Arc::clone(&self.inst));
        if let Err(violation) = initial.verify_capacity() {
            panic!("infeasible initial assignment: {}", violation);
        }

        info!(total = initial.obj_value().total(), "worker seeded");
        self.pool.add_solution(&initial);

        loop {
            let solution = match self.pool.best_solution() {
                Ok(solution) => solution,
                // the pool was seeded above
                Err(NoSolution) => break,
            };

            self.ils.apply(&self.pool, &solution, cancellation);

            if cancellation.is_cancelled() {
                debug!("worker cancelled");
                break;
            }
        }
    }

    /// The best solution this worker has pooled so far.
    pub fn best_solution(&self) -> Result<Solution, NoSolution> {
        self.pool.best_solution()
    }
}
