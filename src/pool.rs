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

//! A bounded pool of solutions, ordered by increasing total objective value
//! and holding at most one solution per total. Every operation runs under a
//! single pool-wide mutex, which makes the abstraction thread safe by
//! construction even though the default deployment gives each worker its
//! own pool.

use parking_lot::Mutex;
use thiserror::Error;

use crate::solution::Solution;

/// Returned by [`Pool::best_solution`] when nothing has been added yet.
/// Callers never hit it in normal operation since each worker seeds its own
/// pool before searching.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Error)]
#[error("the pool holds no solution")]
pub struct NoSolution;

pub struct Pool {
    max_num_solutions: usize,
    // sorted by increasing total, all totals distinct
    entries: Mutex<Vec<Solution>>,
}

impl Pool {
    pub fn new(max_num_solutions: usize) -> Pool {
        Pool {
            max_num_solutions,
            entries: Mutex::new(vec![]),
        }
    }

    /// Inserts a copy of the given solution, keeping the pool sorted.
    /// A solution whose total is already present is dropped; when the pool
    /// is full, the newcomer must strictly improve on the worst entry,
    /// which it then evicts.
    pub fn add_solution(&self, solution: &Solution) {
        let mut entries = self.entries.lock();
        let total = solution.obj_value().total();

        let position = match entries.binary_search_by_key(&total, |s| s.obj_value().total()) {
            Ok(_) => return, // equal total already present
            Err(position) => position,
        };

        if entries.len() < self.max_num_solutions {
            entries.insert(position, solution.clone());
        } else if let Some(worst) = entries.last() {
            if total < worst.obj_value().total() {
                entries.insert(position, solution.clone());
                entries.pop();
            }
        }
    }

    /// A copy of the best solution seen so far.
    pub fn best_solution(&self) -> Result<Solution, NoSolution> {
        let entries = self.entries.lock();
        entries.first().cloned().ok_or(NoSolution)
    }

    /// The totals currently stored, best first. Snapshot taken under the
    /// pool mutex; mostly useful for diagnostics and tests.
    pub fn totals(&self) -> Vec<i64> {
        let entries = self.entries.lock();
        entries.iter().map(|s| s.obj_value().total()).collect()
    }
}
