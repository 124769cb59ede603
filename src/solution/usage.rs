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

use crate::instance::Instance;

/// The per-(machine, resource) aggregates of an assignment. These are the
/// matrices that let the load and balance costs, as well as the capacity
/// check, evaluate a single-process relocation in O(num resources).
///
/// Invariants, for the current assignment `A`:
/// - `usage[m][r]` is the total requirement of the processes hosted on `m`;
/// - `usage_transient[m][r]` additionally charges, for a transient `r`, the
///   requirement of every process initially hosted on `m` but currently
///   living elsewhere;
/// - `over_safety[m][r] = usage[m][r] - safety_capacity[m][r]` (signed);
/// - `under_safety[m][r] = max(0, -over_safety[m][r])`.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct MachineUsage {
    // machine -> resource
    usage: Vec<Vec<i64>>,
    usage_transient: Vec<Vec<i64>>,
    over_safety: Vec<Vec<i64>>,
    under_safety: Vec<Vec<i64>>,
}

impl MachineUsage {
    pub fn new(inst: &Instance, assignment: &[usize]) -> MachineUsage {
        let num_machines = inst.num_machines();
        let num_resources = inst.num_resources();

        let mut usage = vec![vec![0; num_resources]; num_machines];
        let mut usage_transient = vec![vec![0; num_resources]; num_machines];

        for (process, &machine) in assignment.iter().enumerate() {
            let init_machine = inst.init_assignment()[process];
            let requirements = &inst.process(process).requirements;

            for (resource, &requirement) in requirements.iter().enumerate() {
                usage[machine][resource] += requirement;
                usage_transient[machine][resource] += requirement;

                if inst.is_transient()[resource] && machine != init_machine {
                    usage_transient[init_machine][resource] += requirement;
                }
            }
        }

        let mut over_safety = vec![vec![0; num_resources]; num_machines];
        let mut under_safety = vec![vec![0; num_resources]; num_machines];

        for machine in 0..num_machines {
            let safety_capacities = &inst.machine(machine).safety_capacities;
            for resource in 0..num_resources {
                over_safety[machine][resource] =
                    usage[machine][resource] - safety_capacities[resource];
                under_safety[machine][resource] = 0.max(-over_safety[machine][resource]);
            }
        }

        MachineUsage { usage, usage_transient, over_safety, under_safety }
    }

    /// Relocates `process` from `src` to `dst`, adjusting every aggregate.
    /// A transient requirement never leaves the initial machine, so it is
    /// only removed from `src` (resp. added to `dst`) when that machine is
    /// not the initial one.
    pub fn move_process(&mut self, inst: &Instance, process: usize, src: usize, dst: usize) {
        let init_machine = inst.init_assignment()[process];
        let requirements = &inst.process(process).requirements;

        for (resource, &requirement) in requirements.iter().enumerate() {
            self.usage[src][resource] -= requirement;
            self.usage[dst][resource] += requirement;

            self.over_safety[src][resource] -= requirement;
            self.over_safety[dst][resource] += requirement;

            self.under_safety[src][resource] = 0.max(-self.over_safety[src][resource]);
            self.under_safety[dst][resource] = 0.max(-self.over_safety[dst][resource]);

            if inst.is_transient()[resource] {
                if src != init_machine {
                    self.usage_transient[src][resource] -= requirement;
                }
                if dst != init_machine {
                    self.usage_transient[dst][resource] += requirement;
                }
            } else {
                self.usage_transient[src][resource] -= requirement;
                self.usage_transient[dst][resource] += requirement;
            }
        }
    }

    pub fn usages(&self) -> &Vec<Vec<i64>> {
        &self.usage
    }
    pub fn usage(&self, machine: usize) -> &[i64] {
        &self.usage[machine]
    }
    pub fn usage_transient(&self, machine: usize) -> &[i64] {
        &self.usage_transient[machine]
    }
    pub fn over_safety(&self, machine: usize) -> &[i64] {
        &self.over_safety[machine]
    }
    pub fn under_safety(&self, machine: usize) -> &[i64] {
        &self.under_safety[machine]
    }
}
