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

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::solution::Solution;
use crate::worker::CancellationToken;

/// The perturbation operator: samples `(process, machine)` pairs uniformly
/// at random and applies every feasible one, until `num_moves` moves were
/// applied or 1000 pairs were sampled. The sampling cap guarantees progress
/// on tightly constrained states where most random moves are rejected.
pub struct RandomMoves {
    num_moves: usize,
    rng: ChaCha8Rng,
}

impl RandomMoves {
    pub fn new(seed: u64, num_moves: usize) -> RandomMoves {
        RandomMoves { num_moves, rng: ChaCha8Rng::seed_from_u64(seed) }
    }

    pub fn apply(&mut self, solution: &Solution, cancellation: &CancellationToken) -> Solution {
        let mut current = solution.clone();

        let num_processes = current.instance().num_processes();
        let num_machines = current.instance().num_machines();
        if num_processes == 0 || num_machines == 0 {
            return current;
        }

        let mut num_attempts = 0;
        let mut num_moved = 0;

        loop {
            let process = self.rng.gen_range(0..num_processes);
            let machine = self.rng.gen_range(0..num_machines);

            if current.is_feasible(process, machine) {
                let delta = current.evaluate_feasible_move(process, machine);
                current.move_process(process, machine, &delta);
                num_moved += 1;
            }

            num_attempts += 1;

            if cancellation.is_cancelled() {
                return current;
            }
            if num_moved >= self.num_moves || num_attempts >= 1000 {
                return current;
            }
        }
    }
}
