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

//! The feasibility checkers. All of them judge a *prospective* move of one
//! process from its current machine `src` to a candidate `dst`, assuming
//! the current assignment is itself feasible.
//!
//! [`Capacity`] is stateless and reads the transient usage aggregates; the
//! three others own the counting matrices they need and are notified of
//! every applied move through their `on_move` method.

use crate::instance::Instance;
use crate::solution::usage::MachineUsage;

/// The capacity check, with transient semantics: a transient requirement is
/// charged to the initial machine for the whole run, so a process returning
/// home must not be charged a second time there.
#[derive(Debug, Clone, Default)]
pub struct Capacity;

impl Capacity {
    pub fn is_feasible(
        &self,
        inst: &Instance,
        process: usize,
        dst: usize,
        usage: &MachineUsage,
    ) -> bool {
        let requirements = &inst.process(process).requirements;
        let capacities = &inst.machine(dst).capacities;
        let dst_usage_transient = usage.usage_transient(dst);
        let is_initial_dst = dst == inst.init_assignment()[process];

        for (resource, &requirement) in requirements.iter().enumerate() {
            if inst.is_transient()[resource] && is_initial_dst {
                continue;
            }
            if dst_usage_transient[resource] + requirement > capacities[resource] {
                return false;
            }
        }
        true
    }

    // Capacity has no on_move: it owns no state of its own.
}

/// The conflict check: no two processes of one service on one machine.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Conflict {
    // service -> machine
    serv_mach_num_proc: Vec<Vec<i32>>,
}

impl Conflict {
    pub fn new(inst: &Instance, assignment: &[usize]) -> Conflict {
        let mut serv_mach_num_proc =
            vec![vec![0; inst.num_machines()]; inst.num_services()];

        for (process, &machine) in assignment.iter().enumerate() {
            serv_mach_num_proc[inst.process(process).service][machine] += 1;
        }

        Conflict { serv_mach_num_proc }
    }

    pub fn is_feasible(&self, service: usize, dst: usize) -> bool {
        self.serv_mach_num_proc[service][dst] == 0
    }

    pub fn on_move(&mut self, inst: &Instance, process: usize, src: usize, dst: usize) {
        let service = inst.process(process).service;
        self.serv_mach_num_proc[service][src] -= 1;
        self.serv_mach_num_proc[service][dst] += 1;
    }

    pub fn num_processes_of(&self, service: usize, machine: usize) -> i32 {
        self.serv_mach_num_proc[service][machine]
    }
}

/// The spread check: a service must keep occupying at least its `spread_min`
/// distinct locations.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Spread {
    // service -> location
    serv_loc_num_proc: Vec<Vec<i32>>,
    // service -> number of occupied locations
    serv_num_loc: Vec<i32>,
}

impl Spread {
    pub fn new(inst: &Instance, assignment: &[usize]) -> Spread {
        let mut serv_loc_num_proc =
            vec![vec![0; inst.num_locations()]; inst.num_services()];

        for (process, &machine) in assignment.iter().enumerate() {
            let service = inst.process(process).service;
            let location = inst.machine(machine).location;
            serv_loc_num_proc[service][location] += 1;
        }

        let serv_num_loc = serv_loc_num_proc
            .iter()
            .map(|locations| locations.iter().filter(|&&count| count >= 1).count() as i32)
            .collect();

        Spread { serv_loc_num_proc, serv_num_loc }
    }

    /// A move within one location never changes the location count. Across
    /// locations, the count can only drop when the source location empties
    /// while the destination was already occupied; that is the single case
    /// where the minimum spread may be violated.
    pub fn is_feasible(
        &self,
        inst: &Instance,
        service: usize,
        src_location: usize,
        dst_location: usize,
    ) -> bool {
        if src_location == dst_location {
            return true;
        }

        let src_empties = self.serv_loc_num_proc[service][src_location] == 1;
        let dst_occupied = self.serv_loc_num_proc[service][dst_location] > 0;

        if src_empties && dst_occupied {
            return self.serv_num_loc[service] - 1 >= inst.service(service).spread_min;
        }

        true
    }

    pub fn on_move(&mut self, inst: &Instance, process: usize, src: usize, dst: usize) {
        let service = inst.process(process).service;
        let src_location = inst.machine(src).location;
        let dst_location = inst.machine(dst).location;

        if src_location == dst_location {
            return;
        }

        self.serv_loc_num_proc[service][src_location] -= 1;
        if self.serv_loc_num_proc[service][src_location] == 0 {
            self.serv_num_loc[service] -= 1;
        }

        self.serv_loc_num_proc[service][dst_location] += 1;
        if self.serv_loc_num_proc[service][dst_location] == 1 {
            self.serv_num_loc[service] += 1;
        }
    }

    pub fn num_locations_of(&self, service: usize) -> i32 {
        self.serv_num_loc[service]
    }
}

/// The dependency check: every neighborhood hosting a process of a service
/// must host a process of each service it depends on.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Dependency {
    // service -> neighborhood
    serv_neigh_num_proc: Vec<Vec<i32>>,
}

impl Dependency {
    pub fn new(inst: &Instance, assignment: &[usize]) -> Dependency {
        let mut serv_neigh_num_proc =
            vec![vec![0; inst.num_neighborhoods()]; inst.num_services()];

        for (process, &machine) in assignment.iter().enumerate() {
            let service = inst.process(process).service;
            let neighborhood = inst.machine(machine).neighborhood;
            serv_neigh_num_proc[service][neighborhood] += 1;
        }

        Dependency { serv_neigh_num_proc }
    }

    /// Checked only across neighborhoods. Leaving the last process of the
    /// service out of `src_neighborhood` is forbidden when a service
    /// depending on this one still lives there; entering a neighborhood
    /// where the service was absent requires every dependency of the
    /// service to already live there.
    pub fn is_feasible(
        &self,
        inst: &Instance,
        service: usize,
        src_neighborhood: usize,
        dst_neighborhood: usize,
    ) -> bool {
        if src_neighborhood == dst_neighborhood {
            return true;
        }

        let last_in_src = self.serv_neigh_num_proc[service][src_neighborhood] == 1;
        if last_in_src {
            for &other in inst.service(service).reverse_dependencies.iter() {
                if self.serv_neigh_num_proc[other][src_neighborhood] >= 1 {
                    return false;
                }
            }
        }

        let first_in_dst = self.serv_neigh_num_proc[service][dst_neighborhood] == 0;
        if first_in_dst {
            for &other in inst.service(service).dependencies.iter() {
                if self.serv_neigh_num_proc[other][dst_neighborhood] == 0 {
                    return false;
                }
            }
        }

        true
    }

    pub fn on_move(&mut self, inst: &Instance, process: usize, src: usize, dst: usize) {
        let service = inst.process(process).service;
        let src_neighborhood = inst.machine(src).neighborhood;
        let dst_neighborhood = inst.machine(dst).neighborhood;

        if src_neighborhood == dst_neighborhood {
            return;
        }

        self.serv_neigh_num_proc[service][src_neighborhood] -= 1;
        self.serv_neigh_num_proc[service][dst_neighborhood] += 1;
    }

    pub fn num_processes_in(&self, service: usize, neighborhood: usize) -> i32 {
        self.serv_neigh_num_proc[service][neighborhood]
    }
}
