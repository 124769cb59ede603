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

//! The five components of the objective. Each of them knows how to compute
//! its value from scratch (slow, used once at construction time and by the
//! consistency tests) and how to evaluate the delta of relocating a single
//! process in O(num resources).
//!
//! Four components are plain stateless values; [`ServiceMove`] maintains
//! the per-service moved-process counters together with a max-indexed heap
//! so that the current maximum (and whether it is uniquely attained) can be
//! read in constant time.

use crate::instance::Instance;
use crate::solution::usage::MachineUsage;

/// The load cost: for every machine and resource, the amount of usage that
/// sits above the safety capacity (clamped to the hard capacity).
#[derive(Debug, Clone, Default)]
pub struct LoadCost;

impl LoadCost {
    pub fn compute_from_scratch(&self, inst: &Instance, usage: &MachineUsage) -> i64 {
        let mut obj_value = 0;

        for resource in 0..inst.num_resources() {
            let mut resource_obj_value = 0;

            for machine in 0..inst.num_machines() {
                let capacity = inst.machine(machine).capacities[resource];
                let safety_capacity = inst.machine(machine).safety_capacities[resource];
                let used = usage.usage(machine)[resource];

                resource_obj_value += 0.max(capacity.min(used) - safety_capacity);
            }

            obj_value += resource_obj_value * inst.load_cost_weights()[resource];
        }

        obj_value
    }

    /// The only change at `src` is the part of the requirement currently
    /// sitting above the safety capacity; at `dst`, the part of the
    /// requirement crossing the safety threshold.
    pub fn evaluate_delta(
        &self,
        inst: &Instance,
        process: usize,
        src: usize,
        dst: usize,
        usage: &MachineUsage,
    ) -> i64 {
        let requirements = &inst.process(process).requirements;
        let weights = inst.load_cost_weights();
        let src_over_safety = usage.over_safety(src);
        let dst_under_safety = usage.under_safety(dst);

        let mut delta = 0;
        for resource in 0..inst.num_resources() {
            let weight = weights[resource];
            let requirement = requirements[resource];

            let over_safety = src_over_safety[resource];
            if over_safety > 0 {
                delta -= weight * over_safety.min(requirement);
            }

            let crossing = 0.max(requirement - dst_under_safety[resource]);
            if crossing != 0 {
                delta += weight * crossing;
            }
        }

        delta
    }
}

/// The balance cost: each descriptor `(r1, r2, target, weight)` penalizes
/// every machine whose free amount of `r1` exceeds `target` times its free
/// amount of `r2`, where free means `max(0, capacity - usage)`.
#[derive(Debug, Clone, Default)]
pub struct Balance;

impl Balance {
    pub fn compute_from_scratch(&self, inst: &Instance, usage: &MachineUsage) -> i64 {
        let mut obj_value = 0;

        for balance_cost in 0..inst.num_balance_costs() {
            let descriptor = inst.balance_cost(balance_cost);
            let mut balance_obj_value = 0;

            for machine in 0..inst.num_machines() {
                let free_first = free(inst, machine, descriptor.first_resource, usage);
                let free_second = free(inst, machine, descriptor.second_resource, usage);

                balance_obj_value += 0.max(descriptor.target * free_first - free_second);
            }

            obj_value += balance_obj_value * i64::from(descriptor.weight);
        }

        obj_value
    }

    /// Only `src` and `dst` change, so the delta is the difference of their
    /// per-machine contributions before and after the move.
    pub fn evaluate_delta(
        &self,
        inst: &Instance,
        process: usize,
        src: usize,
        dst: usize,
        usage: &MachineUsage,
    ) -> i64 {
        let mut delta_obj_value = 0;

        for balance_cost in 0..inst.num_balance_costs() {
            let descriptor = inst.balance_cost(balance_cost);
            let first = descriptor.first_resource;
            let second = descriptor.second_resource;
            let target = descriptor.target;

            let mut delta = 0;

            // Source
            let free_first_before = free(inst, src, first, usage);
            let free_second_before = free(inst, src, second, usage);
            let free_first_after = free_first_before - delta_remove(inst, process, src, first, usage);
            let free_second_after =
                free_second_before - delta_remove(inst, process, src, second, usage);

            delta += 0.max(target * free_first_after - free_second_after)
                - 0.max(target * free_first_before - free_second_before);

            // Destination
            let free_first_before = free(inst, dst, first, usage);
            let free_second_before = free(inst, dst, second, usage);
            let free_first_after = free_first_before - delta_add(inst, process, dst, first, usage);
            let free_second_after =
                free_second_before - delta_add(inst, process, dst, second, usage);

            delta += 0.max(target * free_first_after - free_second_after)
                - 0.max(target * free_first_before - free_second_before);

            delta_obj_value += i64::from(descriptor.weight) * delta;
        }

        delta_obj_value
    }
}

fn free(inst: &Instance, machine: usize, resource: usize, usage: &MachineUsage) -> i64 {
    let capacity = inst.machine(machine).capacities[resource];
    0.max(capacity - usage.usage(machine)[resource])
}

/// How much the free amount of `resource` shrinks when `process` leaves
/// `machine`: non-positive, and capped by the part of the usage currently
/// overflowing the hard capacity.
fn delta_remove(
    inst: &Instance,
    process: usize,
    machine: usize,
    resource: usize,
    usage: &MachineUsage,
) -> i64 {
    let capacity = inst.machine(machine).capacities[resource];
    let over_usage = 0.max(usage.usage(machine)[resource] - capacity);
    let requirement = inst.process(process).requirements[resource];

    0.min(over_usage - requirement)
}

/// How much of the incoming requirement actually consumes free space on
/// `machine` (at most the free space there is).
fn delta_add(
    inst: &Instance,
    process: usize,
    machine: usize,
    resource: usize,
    usage: &MachineUsage,
) -> i64 {
    let capacity = inst.machine(machine).capacities[resource];
    let under_usage = 0.max(capacity - usage.usage(machine)[resource]);
    let requirement = inst.process(process).requirements[resource];

    under_usage.min(requirement)
}

/// The process move cost: the summed move cost of every process no longer
/// hosted on its initial machine.
#[derive(Debug, Clone, Default)]
pub struct ProcessMove;

impl ProcessMove {
    pub fn compute_from_scratch(&self, inst: &Instance, assignment: &[usize]) -> i64 {
        let mut obj_value = 0;

        for (process, &machine) in assignment.iter().enumerate() {
            if machine != inst.init_assignment()[process] {
                obj_value += i64::from(inst.process(process).move_cost);
            }
        }

        obj_value * i64::from(inst.process_move_cost_weight())
    }

    pub fn evaluate_delta(&self, inst: &Instance, process: usize, src: usize, dst: usize) -> i64 {
        let init_machine = inst.init_assignment()[process];
        let move_cost = i64::from(inst.process(process).move_cost);

        let delta = if src == init_machine {
            move_cost
        } else if dst == init_machine {
            -move_cost
        } else {
            0
        };

        delta * i64::from(inst.process_move_cost_weight())
    }
}

/// The machine move cost: for every process, the cost of the hop from its
/// initial machine to its current one, as given by the per-machine move
/// cost tables.
#[derive(Debug, Clone, Default)]
pub struct MachineMove;

impl MachineMove {
    pub fn compute_from_scratch(&self, inst: &Instance, assignment: &[usize]) -> i64 {
        let mut obj_value = 0;

        for (process, &machine) in assignment.iter().enumerate() {
            let init_machine = inst.init_assignment()[process];
            obj_value += i64::from(inst.machine(init_machine).move_costs[machine]);
        }

        obj_value * i64::from(inst.machine_move_cost_weight())
    }

    pub fn evaluate_delta(&self, inst: &Instance, process: usize, src: usize, dst: usize) -> i64 {
        let init_machine = inst.init_assignment()[process];
        let move_costs = &inst.machine(init_machine).move_costs;

        let delta = if src == init_machine {
            i64::from(move_costs[dst])
        } else if dst == init_machine {
            -i64::from(move_costs[src])
        } else {
            i64::from(move_costs[dst]) - i64::from(move_costs[src])
        };

        delta * i64::from(inst.machine_move_cost_weight())
    }
}

/// The service move cost: the maximum, over all services, of the number of
/// moved processes of that service.
///
/// The per-service counters are kept in a binary max-heap of service
/// indices with an inverse `service -> heap position` map, so a counter
/// update re-sifts one node in O(log num services) and the maximum is read
/// at the root. A decrement of the maximum lowers the cost only when the
/// root is the unique maximizer, which is the case exactly when both of its
/// children (when they exist) carry strictly smaller counters.
#[derive(Debug, Clone)]
pub struct ServiceMove {
    num_moved: Vec<i32>,
    // position -> service, and its inverse
    heap: Vec<usize>,
    pos: Vec<usize>,
}

impl ServiceMove {
    pub fn new(inst: &Instance, assignment: &[usize]) -> ServiceMove {
        let mut num_moved = vec![0; inst.num_services()];
        for (process, &machine) in assignment.iter().enumerate() {
            if machine != inst.init_assignment()[process] {
                num_moved[inst.process(process).service] += 1;
            }
        }

        let heap = (0..inst.num_services()).collect::<Vec<usize>>();
        let pos = heap.clone();

        let mut this = ServiceMove { num_moved, heap, pos };
        for position in (0..this.heap.len() / 2).rev() {
            this.sift_down(position);
        }
        this
    }

    pub fn compute_from_scratch(&self, inst: &Instance, assignment: &[usize]) -> i64 {
        let mut num_moved = vec![0_i32; inst.num_services()];
        for (process, &machine) in assignment.iter().enumerate() {
            if machine != inst.init_assignment()[process] {
                num_moved[inst.process(process).service] += 1;
            }
        }

        let max_moved = num_moved.iter().max().copied().unwrap_or(0);
        i64::from(max_moved) * i64::from(inst.service_move_cost_weight())
    }

    /// Evaluates the delta without touching the counters. The move turns
    /// `process` into a moved process when it leaves its initial machine,
    /// and back into an unmoved one when it returns there; any other
    /// relocation leaves the counters unchanged.
    pub fn evaluate_delta(&self, inst: &Instance, process: usize, src: usize, dst: usize) -> i64 {
        let service = inst.process(process).service;
        let init_machine = inst.init_assignment()[process];
        let weight = i64::from(inst.service_move_cost_weight());

        let max_moved = self.num_moved[self.heap[0]];

        if src == init_machine {
            // increment: the maximum grows iff this service attains it
            if self.num_moved[service] == max_moved {
                weight
            } else {
                0
            }
        } else if dst == init_machine {
            // decrement: the maximum shrinks iff this service is the unique
            // maximizer, i.e. both root children sit strictly below it
            if self.num_moved[service] == max_moved && self.root_is_unique_max() {
                -weight
            } else {
                0
            }
        } else {
            0
        }
    }

    /// Applies the counter update for an actual move and re-sifts the
    /// affected service within the heap.
    pub fn on_move(&mut self, inst: &Instance, process: usize, src: usize, dst: usize) {
        let service = inst.process(process).service;
        let init_machine = inst.init_assignment()[process];

        if src == init_machine {
            self.num_moved[service] += 1;
            self.sift_up(self.pos[service]);
        } else if dst == init_machine {
            self.num_moved[service] -= 1;
            self.sift_down(self.pos[service]);
        }
    }

    fn root_is_unique_max(&self) -> bool {
        let max_moved = self.num_moved[self.heap[0]];
        // an equal counter anywhere in the heap implies an equal direct
        // child of the root, so looking at the two children suffices
        for child in &[1, 2] {
            if let Some(&service) = self.heap.get(*child) {
                if self.num_moved[service] >= max_moved {
                    return false;
                }
            }
        }
        true
    }

    fn sift_up(&mut self, mut position: usize) {
        while position > 0 {
            let parent = (position - 1) / 2;
            if self.num_moved[self.heap[position]] > self.num_moved[self.heap[parent]] {
                self.swap_nodes(position, parent);
                position = parent;
            } else {
                break;
            }
        }
    }

    fn sift_down(&mut self, mut position: usize) {
        loop {
            let left = 2 * position + 1;
            let right = 2 * position + 2;
            let mut largest = position;

            if left < self.heap.len()
                && self.num_moved[self.heap[left]] > self.num_moved[self.heap[largest]]
            {
                largest = left;
            }
            if right < self.heap.len()
                && self.num_moved[self.heap[right]] > self.num_moved[self.heap[largest]]
            {
                largest = right;
            }

            if largest == position {
                break;
            }
            self.swap_nodes(position, largest);
            position = largest;
        }
    }

    fn swap_nodes(&mut self, a: usize, b: usize) {
        self.heap.swap(a, b);
        self.pos[self.heap[a]] = a;
        self.pos[self.heap[b]] = b;
    }
}

#[cfg(test)]
mod test_service_move {
    use crate::instance::*;
    use crate::solution::costs::ServiceMove;

    fn machine() -> Machine {
        Machine {
            neighborhood: 0,
            location: 0,
            capacities: vec![100],
            safety_capacities: vec![100],
            move_costs: vec![0, 0],
        }
    }

    fn service() -> Service {
        Service {
            spread_min: 1,
            dependencies: vec![],
            reverse_dependencies: vec![],
            processes: vec![],
        }
    }

    // three services with two processes each, everything on machine 0
    fn instance() -> Instance {
        let processes = (0..6)
            .map(|p| Process { service: p / 2, requirements: vec![1], move_cost: 0 })
            .collect();
        Instance::new(
            vec![Resource { transient: false, load_cost_weight: 0 }],
            vec![machine(), machine()],
            vec![service(), service(), service()],
            processes,
            vec![],
            vec![0; 6],
            0,
            1,
            0,
            1,
            1,
        )
    }

    #[test]
    fn initially_nothing_moved() {
        let inst = instance();
        let service_move = ServiceMove::new(&inst, inst.init_assignment());
        assert_eq!(0, service_move.compute_from_scratch(&inst, inst.init_assignment()));
    }

    #[test]
    fn first_move_raises_the_maximum() {
        let inst = instance();
        let service_move = ServiceMove::new(&inst, inst.init_assignment());
        assert_eq!(1, service_move.evaluate_delta(&inst, 0, 0, 1));
    }

    #[test]
    fn moving_a_process_of_a_non_maximal_service_is_free() {
        let inst = instance();
        let mut service_move = ServiceMove::new(&inst, inst.init_assignment());
        // service 0 now has both processes moved, the maximum is 2
        service_move.on_move(&inst, 0, 0, 1);
        service_move.on_move(&inst, 1, 0, 1);
        // moving a process of service 1 (0 moved so far) costs nothing
        assert_eq!(0, service_move.evaluate_delta(&inst, 2, 0, 1));
    }

    #[test]
    fn returning_home_pays_back_only_for_the_unique_maximizer() {
        let inst = instance();
        let mut service_move = ServiceMove::new(&inst, inst.init_assignment());
        service_move.on_move(&inst, 0, 0, 1);
        // service 0 is the unique maximizer: bringing its process back
        // lowers the maximum
        assert_eq!(-1, service_move.evaluate_delta(&inst, 0, 1, 0));

        // with a second maximizer the maximum survives the return
        service_move.on_move(&inst, 2, 0, 1);
        assert_eq!(0, service_move.evaluate_delta(&inst, 0, 1, 0));
    }

    #[test]
    fn deltas_agree_with_the_from_scratch_recomputation() {
        let inst = instance();
        let mut service_move = ServiceMove::new(&inst, inst.init_assignment());
        let mut assignment = inst.init_assignment().to_vec();

        // a fixed walk: move 0, 2, 1 away then bring 0 back home
        for &(process, src, dst) in &[(0, 0, 1), (2, 0, 1), (1, 0, 1), (0, 1, 0)] {
            let before = service_move.compute_from_scratch(&inst, &assignment);
            let delta = service_move.evaluate_delta(&inst, process, src, dst);

            service_move.on_move(&inst, process, src, dst);
            assignment[process] = dst;

            let after = service_move.compute_from_scratch(&inst, &assignment);
            assert_eq!(after - before, delta);
        }
    }
}
