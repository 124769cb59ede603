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

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::instance::Instance;
use crate::pool::Pool;
use crate::solution::obj_value::ObjValue;
use crate::solution::Solution;
use crate::worker::CancellationToken;

/// Steepest-descent local search over randomized scans of the move
/// neighborhood. Each iteration shuffles the process list and, for the
/// first `num_processes` of them, shuffles the machine list and considers
/// the first `num_machines` candidate destinations; the best strictly
/// improving move found (if any) is applied and published to the pool.
///
/// The search keeps scanning as long as it improves, and gives up after
/// more than `num_tries_max` consecutive scans without improvement.
pub struct HillClimbing {
    num_processes: usize,
    num_machines: usize,
    num_tries_max: usize,

    processes: Vec<usize>,
    machines: Vec<usize>,

    rng: ChaCha8Rng,
}

impl HillClimbing {
    pub fn new(
        seed: u64,
        inst: &Instance,
        num_processes: usize,
        num_machines: usize,
        num_tries_max: usize,
    ) -> HillClimbing {
        HillClimbing {
            num_processes: num_processes.min(inst.num_processes()),
            num_machines: num_machines.min(inst.num_machines()),
            num_tries_max,
            processes: (0..inst.num_processes()).collect(),
            machines: (0..inst.num_machines()).collect(),
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Runs the descent from (a copy of) the given solution and returns the
    /// solution it ends on. Cancellation is observed once per scan.
    pub fn apply(
        &mut self,
        pool: &Pool,
        solution: &Solution,
        cancellation: &CancellationToken,
    ) -> Solution {
        let mut current = solution.clone();
        let mut num_tries = 0_usize;

        loop {
            let mut best_value = i64::max_value();
            let mut best_move: Option<(usize, usize, ObjValue)> = None;

            self.processes.shuffle(&mut self.rng);

            for i in 0..self.num_processes {
                let process = self.processes[i];

                self.machines.shuffle(&mut self.rng);

                for j in 0..self.num_machines {
                    let machine = self.machines[j];

                    if current.assignment()[process] == machine {
                        continue;
                    }
                    if !current.is_feasible(process, machine) {
                        continue;
                    }

                    let delta = current.evaluate_feasible_move(process, machine);
                    if delta.total() < best_value {
                        best_value = delta.total();
                        best_move = Some((process, machine, delta));
                    }
                }
            }

            if best_value < 0 {
                if let Some((process, machine, delta)) = best_move.take() {
                    current.move_process(process, machine, &delta);
                    pool.add_solution(&current);
                }
                num_tries = 0;
            } else {
                num_tries += 1;
            }

            if cancellation.is_cancelled() {
                return current;
            }
            if best_value >= 0 && num_tries > self.num_tries_max {
                return current;
            }
        }
    }
}

#[cfg(test)]
mod test_hill_climbing {
    use std::sync::Arc;

    use crate::instance::*;
    use crate::pool::Pool;
    use crate::search::HillClimbing;
    use crate::solution::Solution;
    use crate::worker::CancellationToken;

    // three machines with distinct move costs away from machine 0: the
    // cheapest strictly improving relocation brings the displaced process
    // back home
    fn instance() -> Arc<Instance> {
        let machines = (0..3)
            .map(|_| Machine {
                neighborhood: 0,
                location: 0,
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
        let processes = vec![Process { service: 0, requirements: vec![1], move_cost: 0 }];
        Arc::new(Instance::new(
            vec![Resource { transient: false, load_cost_weight: 0 }],
            machines,
            services,
            processes,
            vec![],
            vec![0],
            0,
            0,
            1,
            1,
            1,
        ))
    }

    #[test]
    fn the_descent_reaches_the_local_optimum() {
        let inst = instance();
        let seed = Solution::from_assignment(Arc::clone(&inst), vec![1]);
        assert_eq!(7, seed.obj_value().total());

        let pool = Pool::new(1);
        let mut climbing = HillClimbing::new(42, &inst, 10, 10, 2);
        let result = climbing.apply(&pool, &seed, &CancellationToken::new());

        assert_eq!(0, result.obj_value().total());
        assert_eq!(&[0], result.assignment());
    }

    #[test]
    fn every_accepted_move_is_published_to_the_pool() {
        let inst = instance();
        let seed = Solution::from_assignment(Arc::clone(&inst), vec![1]);

        let pool = Pool::new(10);
        let mut climbing = HillClimbing::new(42, &inst, 10, 10, 2);
        let result = climbing.apply(&pool, &seed, &CancellationToken::new());

        let best = pool.best_solution().unwrap();
        assert_eq!(result.obj_value().total(), best.obj_value().total());
    }

    #[test]
    fn an_already_optimal_solution_survives_unchanged() {
        let inst = instance();
        let seed = Solution::new(Arc::clone(&inst));

        let pool = Pool::new(1);
        let mut climbing = HillClimbing::new(7, &inst, 10, 10, 2);
        let result = climbing.apply(&pool, &seed, &CancellationToken::new());

        assert_eq!(seed.assignment(), result.assignment());
        assert_eq!(0, result.obj_value().total());
    }

    #[test]
    fn a_cancelled_descent_returns_promptly() {
        let inst = instance();
        let seed = Solution::from_assignment(Arc::clone(&inst), vec![1]);

        let cancellation = CancellationToken::new();
        cancellation.cancel();

        let pool = Pool::new(1);
        let mut climbing = HillClimbing::new(42, &inst, 10, 10, usize::max_value());
        let _ = climbing.apply(&pool, &seed, &cancellation);
    }
}
