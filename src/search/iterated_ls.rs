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

use tracing::debug;

use crate::pool::Pool;
use crate::search::{HillClimbing, RandomMoves};
use crate::solution::Solution;
use crate::worker::CancellationToken;

/// The iterated local search driver: descend from the seed, then repeat
/// perturbation followed by descent, publishing each round to the pool.
/// The driver stops once `num_iter - last_best_iter` exceeds the bound,
/// i.e. a round with `num_iter - last_best_iter == max_num_non_improv_iter`
/// still runs.
pub struct IteratedLocalSearch {
    max_num_non_improv_iter: i64,
    local_search: HillClimbing,
    perturbation: RandomMoves,
}

impl IteratedLocalSearch {
    pub fn new(
        max_num_non_improv_iter: i64,
        local_search: HillClimbing,
        perturbation: RandomMoves,
    ) -> IteratedLocalSearch {
        IteratedLocalSearch {
            max_num_non_improv_iter,
            local_search,
            perturbation,
        }
    }

    /// Runs until the stagnation bound is hit or the token is cancelled,
    /// and returns the best solution seen. That solution is never worse
    /// than anything published to the pool during this run.
    pub fn apply(
        &mut self,
        pool: &Pool,
        solution: &Solution,
        cancellation: &CancellationToken,
    ) -> Solution {
        let mut num_iter: i64 = 0;
        let mut last_best_iter: i64 = -1;

        let mut best = solution.clone();
        let mut current = self.local_search.apply(pool, solution, cancellation);

        if current.obj_value().total() < best.obj_value().total() {
            last_best_iter = 0;
            best = current.clone();
        }

        loop {
            current = self.perturbation.apply(&current, cancellation);
            current = self.local_search.apply(pool, &current, cancellation);

            pool.add_solution(&current);

            if current.obj_value().total() < best.obj_value().total() {
                debug!(
                    iteration = num_iter,
                    total = current.obj_value().total(),
                    "iterated local search found a new incumbent"
                );
                last_best_iter = num_iter;
                best = current.clone();
            }

            num_iter += 1;

            if cancellation.is_cancelled() {
                return best;
            }
            if num_iter - last_best_iter > self.max_num_non_improv_iter {
                return best;
            }
        }
    }
}

#[cfg(test)]
mod test_iterated_ls {
    use std::sync::Arc;

    use crate::instance::*;
    use crate::pool::Pool;
    use crate::search::{HillClimbing, IteratedLocalSearch, RandomMoves};
    use crate::solution::Solution;
    use crate::worker::CancellationToken;

    fn instance() -> Arc<Instance> {
        let machines = (0..3)
            .map(|m| Machine {
                neighborhood: 0,
                location: m,
                capacities: vec![10],
                safety_capacities: vec![10],
                move_costs: vec![0, 7, 5],
            })
            .collect();
        let services = vec![Service {
            spread_min: 1,
            dependencies: vec![],
            reverse_dependencies: vec![],
            processes: vec![],
        }];
        let processes = vec![Process { service: 0, requirements: vec![1], move_cost: 1 }];
        Arc::new(Instance::new(
            vec![Resource { transient: false, load_cost_weight: 0 }],
            machines,
            services,
            processes,
            vec![],
            vec![0],
            1,
            0,
            1,
            1,
            3,
        ))
    }

    fn driver(inst: &Arc<Instance>, max_num_non_improv_iter: i64) -> IteratedLocalSearch {
        let local_search = HillClimbing::new(11, inst, 10, 10, 2);
        let perturbation = RandomMoves::new(17, 1);
        IteratedLocalSearch::new(max_num_non_improv_iter, local_search, perturbation)
    }

    #[test]
    fn the_returned_solution_is_no_worse_than_the_pool_best() {
        let inst = instance();
        let seed = Solution::from_assignment(Arc::clone(&inst), vec![1]);

        let pool = Pool::new(5);
        let best = driver(&inst, 3).apply(&pool, &seed, &CancellationToken::new());

        let pool_best = pool.best_solution().unwrap();
        assert!(best.obj_value().total() <= pool_best.obj_value().total());
    }

    #[test]
    fn the_driver_improves_on_a_perturbed_seed() {
        let inst = instance();
        let seed = Solution::from_assignment(Arc::clone(&inst), vec![1]);

        let pool = Pool::new(1);
        let best = driver(&inst, 3).apply(&pool, &seed, &CancellationToken::new());

        assert_eq!(0, best.obj_value().total());
    }

    // the stagnation boundary is inclusive: a zero bound still runs the
    // round with num_iter - last_best_iter == 0
    #[test]
    fn a_zero_stagnation_bound_still_terminates() {
        let inst = instance();
        let seed = Solution::new(Arc::clone(&inst));

        let pool = Pool::new(1);
        let best = driver(&inst, 0).apply(&pool, &seed, &CancellationToken::new());

        assert!(best.obj_value().total() <= seed.obj_value().total());
    }

    #[test]
    fn cancellation_stops_the_driver_with_its_best_so_far() {
        let inst = instance();
        let seed = Solution::from_assignment(Arc::clone(&inst), vec![1]);

        let cancellation = CancellationToken::new();
        cancellation.cancel();

        let pool = Pool::new(1);
        let best = driver(&inst, i64::max_value()).apply(&pool, &seed, &cancellation);
        assert!(best.obj_value().total() <= seed.obj_value().total());
    }
}
