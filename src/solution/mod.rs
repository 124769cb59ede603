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

//! This module provides the [`Solution`] façade: the current assignment,
//! the aggregates derived from it, the five cost components and the four
//! feasibility checkers, all kept consistent move after move.
//!
//! The components are owned value types composed by direct field access;
//! the façade knows all of them by name and calls them in a fixed order, so
//! no polymorphic interface is needed.

pub mod costs;
pub mod feasibility;
pub mod obj_value;
pub mod usage;

use std::fmt;
use std::sync::Arc;

use crate::instance::Instance;
use crate::solution::costs::{Balance, LoadCost, MachineMove, ProcessMove, ServiceMove};
use crate::solution::feasibility::{Capacity, Conflict, Dependency, Spread};
use crate::solution::obj_value::ObjValue;
use crate::solution::usage::MachineUsage;

/// A capacity violation detected when seeding a worker from an assignment
/// which was supposed to be feasible.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct CapacityViolation {
    pub machine: usize,
    pub resource: usize,
    pub usage: i64,
    pub capacity: i64,
}

impl fmt::Display for CapacityViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "machine {} exceeds its capacity for resource {} (usage {}, capacity {})",
            self.machine, self.resource, self.usage, self.capacity
        )
    }
}

/// The mutable state of the search: an assignment together with every
/// derived aggregate, and the running objective value.
///
/// A solution is cheap to copy (a deep copy of contiguous arrays); copies
/// drive both the pool and the perturbation semantics.
#[derive(Debug, Clone)]
pub struct Solution {
    inst: Arc<Instance>,
    assignment: Vec<usize>,

    usage: MachineUsage,

    load_cost: LoadCost,
    balance: Balance,
    process_move: ProcessMove,
    service_move: ServiceMove,
    machine_move: MachineMove,

    capacity: Capacity,
    conflict: Conflict,
    spread: Spread,
    dependency: Dependency,

    obj_value: ObjValue,
}

impl Solution {
    /// Builds the solution standing for the initial assignment of the
    /// instance.
    pub fn new(inst: Arc<Instance>) -> Solution {
        let assignment = inst.init_assignment().to_vec();
        Solution::from_assignment(inst, assignment)
    }

    /// Builds a solution for an arbitrary assignment; every aggregate and
    /// the running objective value are computed from scratch.
    pub fn from_assignment(inst: Arc<Instance>, assignment: Vec<usize>) -> Solution {
        let usage = MachineUsage::new(&inst, &assignment);
        let service_move = ServiceMove::new(&inst, &assignment);
        let conflict = Conflict::new(&inst, &assignment);
        let spread = Spread::new(&inst, &assignment);
        let dependency = Dependency::new(&inst, &assignment);

        let mut solution = Solution {
            inst,
            assignment,
            usage,
            load_cost: LoadCost,
            balance: Balance,
            process_move: ProcessMove,
            service_move,
            machine_move: MachineMove,
            capacity: Capacity,
            conflict,
            spread,
            dependency,
            obj_value: ObjValue::zero(),
        };
        solution.obj_value = solution.compute_obj_value();
        solution
    }

    pub fn instance(&self) -> &Instance {
        &self.inst
    }

    pub fn shared_instance(&self) -> &Arc<Instance> {
        &self.inst
    }

    pub fn assignment(&self) -> &[usize] {
        &self.assignment
    }

    /// The objective value maintained incrementally by
    /// [`move_process`](Solution::move_process).
    pub fn obj_value(&self) -> &ObjValue {
        &self.obj_value
    }

    /// The per-(machine, resource) aggregates, exposed for diagnostics.
    pub fn usage(&self) -> &MachineUsage {
        &self.usage
    }

    // ** SLOW ** Recomputes the objective value from scratch. It is meant
    // to be used once at construction time and for debugging; everything
    // else relies on the incrementally maintained value.
    pub fn compute_obj_value(&self) -> ObjValue {
        ObjValue::new(
            self.load_cost.compute_from_scratch(&self.inst, &self.usage),
            self.balance.compute_from_scratch(&self.inst, &self.usage),
            self.process_move.compute_from_scratch(&self.inst, &self.assignment),
            self.service_move.compute_from_scratch(&self.inst, &self.assignment),
            self.machine_move.compute_from_scratch(&self.inst, &self.assignment),
        )
    }

    /// Verifies that no machine exceeds any of its capacities, transient
    /// load included. The engine assumes the initial assignment satisfies
    /// this; a worker runs the verification once before seeding its pool.
    pub fn verify_capacity(&self) -> Result<(), CapacityViolation> {
        for machine in 0..self.inst.num_machines() {
            let capacities = &self.inst.machine(machine).capacities;
            let usage_transient = self.usage.usage_transient(machine);

            for resource in 0..self.inst.num_resources() {
                if usage_transient[resource] > capacities[resource] {
                    return Err(CapacityViolation {
                        machine,
                        resource,
                        usage: usage_transient[resource],
                        capacity: capacities[resource],
                    });
                }
            }
        }
        Ok(())
    }

    /// Tells whether moving `process` onto `dst` keeps the solution
    /// feasible. Assumes the current solution is feasible, which makes a
    /// same-machine move trivially acceptable.
    ///
    /// The checks run in the order spread, dependency, conflict, capacity
    /// and short-circuit on the first failure: the topology checks are the
    /// ones failing most often in practice, so they come first.
    pub fn is_feasible(&self, process: usize, dst: usize) -> bool {
        let src = self.assignment[process];
        if src == dst {
            return true;
        }

        let service = self.inst.process(process).service;
        let src_machine = self.inst.machine(src);
        let dst_machine = self.inst.machine(dst);

        if !self
            .spread
            .is_feasible(&self.inst, service, src_machine.location, dst_machine.location)
        {
            return false;
        }

        if !self.dependency.is_feasible(
            &self.inst,
            service,
            src_machine.neighborhood,
            dst_machine.neighborhood,
        ) {
            return false;
        }

        if !self.conflict.is_feasible(service, dst) {
            return false;
        }

        self.capacity.is_feasible(&self.inst, process, dst, &self.usage)
    }

    /// Evaluates the objective delta of moving `process` onto `dst`.
    /// Precondition: `is_feasible(process, dst)` holds. A same-machine move
    /// yields the zero delta.
    pub fn evaluate_feasible_move(&self, process: usize, dst: usize) -> ObjValue {
        let src = self.assignment[process];
        if src == dst {
            return ObjValue::zero();
        }

        ObjValue::new(
            self.load_cost.evaluate_delta(&self.inst, process, src, dst, &self.usage),
            self.balance.evaluate_delta(&self.inst, process, src, dst, &self.usage),
            self.process_move.evaluate_delta(&self.inst, process, src, dst),
            self.service_move.evaluate_delta(&self.inst, process, src, dst),
            self.machine_move.evaluate_delta(&self.inst, process, src, dst),
        )
    }

    /// Applies the move and the delta previously returned by
    /// [`evaluate_feasible_move`](Solution::evaluate_feasible_move) for the
    /// same `(process, dst)` pair, with no intervening mutation. All the
    /// aggregates are updated in a fixed order so that their invariants
    /// hold again when this returns.
    ///
    /// # Panics
    /// When the updated transient usage of `dst` exceeds one of its
    /// capacities. This cannot happen after a positive feasibility check
    /// and therefore indicates a bug in an aggregate updater.
    pub fn move_process(&mut self, process: usize, dst: usize, delta: &ObjValue) {
        let src = self.assignment[process];
        if src == dst {
            return;
        }

        self.usage.move_process(&self.inst, process, src, dst);
        self.service_move.on_move(&self.inst, process, src, dst);
        // Capacity keeps no state of its own.
        self.conflict.on_move(&self.inst, process, src, dst);
        self.spread.on_move(&self.inst, process, src, dst);
        self.dependency.on_move(&self.inst, process, src, dst);

        self.assignment[process] = dst;
        self.obj_value.apply_delta(delta);

        let capacities = &self.inst.machine(dst).capacities;
        let dst_usage_transient = self.usage.usage_transient(dst);
        for (resource, &capacity) in capacities.iter().enumerate() {
            if dst_usage_transient[resource] > capacity {
                panic!(
                    "capacity violation after moving process {}: machine {}, resource {}, usage {}, capacity {}",
                    process, dst, resource, dst_usage_transient[resource], capacity
                );
            }
        }
    }
}
