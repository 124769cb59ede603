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

//! An offline verification of a complete assignment, computed from plain
//! definitions with no incremental state whatsoever. This is what the
//! `solution_checker` binary runs, and what the tests use as an oracle
//! against the incremental engine.

use thiserror::Error;

use crate::instance::Instance;
use crate::solution::obj_value::ObjValue;

/// The first constraint violation found in a candidate assignment.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Error)]
pub enum Violation {
    #[error("machine {machine} exceeds its capacity for resource {resource} (usage {usage}, capacity {capacity})")]
    Capacity { machine: usize, resource: usize, usage: i64, capacity: i64 },
    #[error("service {service} has {count} processes on machine {machine}")]
    Conflict { service: usize, machine: usize, count: i64 },
    #[error("service {service} spans {count} locations but requires at least {required}")]
    Spread { service: usize, count: i64, required: i64 },
    #[error("service {service} occupies neighborhood {neighborhood} without service {dependency}")]
    Dependency { service: usize, dependency: usize, neighborhood: usize },
}

/// Checks every constraint of the problem against the given assignment:
/// capacity with transient semantics, conflict, spread and dependency.
pub fn check(inst: &Instance, assignment: &[usize]) -> Result<(), Violation> {
    check_capacity(inst, assignment)?;
    check_conflict(inst, assignment)?;
    check_spread(inst, assignment)?;
    check_dependency(inst, assignment)
}

/// Computes the objective value of the assignment from the definitions of
/// the five cost components.
pub fn objective(inst: &Instance, assignment: &[usize]) -> ObjValue {
    ObjValue::new(
        load_cost(inst, assignment),
        balance_cost(inst, assignment),
        process_move_cost(inst, assignment),
        service_move_cost(inst, assignment),
        machine_move_cost(inst, assignment),
    )
}

// machine -> resource usages, transient requirements charged to both the
// initial and the current machine
fn transient_usages(inst: &Instance, assignment: &[usize]) -> Vec<Vec<i64>> {
    let mut usages = vec![vec![0; inst.num_resources()]; inst.num_machines()];

    for (process, &machine) in assignment.iter().enumerate() {
        let init_machine = inst.init_assignment()[process];

        for (resource, &requirement) in inst.process(process).requirements.iter().enumerate() {
            usages[machine][resource] += requirement;
            if inst.is_transient()[resource] && machine != init_machine {
                usages[init_machine][resource] += requirement;
            }
        }
    }

    usages
}

fn plain_usages(inst: &Instance, assignment: &[usize]) -> Vec<Vec<i64>> {
    let mut usages = vec![vec![0; inst.num_resources()]; inst.num_machines()];

    for (process, &machine) in assignment.iter().enumerate() {
        for (resource, &requirement) in inst.process(process).requirements.iter().enumerate() {
            usages[machine][resource] += requirement;
        }
    }

    usages
}

fn check_capacity(inst: &Instance, assignment: &[usize]) -> Result<(), Violation> {
    let usages = transient_usages(inst, assignment);

    for machine in 0..inst.num_machines() {
        for resource in 0..inst.num_resources() {
            let usage = usages[machine][resource];
            let capacity = inst.machine(machine).capacities[resource];
            if usage > capacity {
                return Err(Violation::Capacity { machine, resource, usage, capacity });
            }
        }
    }
    Ok(())
}

fn check_conflict(inst: &Instance, assignment: &[usize]) -> Result<(), Violation> {
    let mut counts = vec![vec![0_i64; inst.num_machines()]; inst.num_services()];

    for (process, &machine) in assignment.iter().enumerate() {
        let service = inst.process(process).service;
        counts[service][machine] += 1;
        if counts[service][machine] > 1 {
            return Err(Violation::Conflict {
                service,
                machine,
                count: counts[service][machine],
            });
        }
    }
    Ok(())
}

fn check_spread(inst: &Instance, assignment: &[usize]) -> Result<(), Violation> {
    let mut counts = vec![vec![0_i64; inst.num_locations()]; inst.num_services()];

    for (process, &machine) in assignment.iter().enumerate() {
        let service = inst.process(process).service;
        counts[service][inst.machine(machine).location] += 1;
    }

    for service in 0..inst.num_services() {
        let count = counts[service].iter().filter(|&&c| c >= 1).count() as i64;
        let required = i64::from(inst.service(service).spread_min);
        if count < required {
            return Err(Violation::Spread { service, count, required });
        }
    }
    Ok(())
}

fn check_dependency(inst: &Instance, assignment: &[usize]) -> Result<(), Violation> {
    let mut counts = vec![vec![0_i64; inst.num_neighborhoods()]; inst.num_services()];

    for (process, &machine) in assignment.iter().enumerate() {
        let service = inst.process(process).service;
        counts[service][inst.machine(machine).neighborhood] += 1;
    }

    for service in 0..inst.num_services() {
        for &dependency in inst.service(service).dependencies.iter() {
            for neighborhood in 0..inst.num_neighborhoods() {
                if counts[service][neighborhood] >= 1 && counts[dependency][neighborhood] == 0 {
                    return Err(Violation::Dependency { service, dependency, neighborhood });
                }
            }
        }
    }
    Ok(())
}

fn load_cost(inst: &Instance, assignment: &[usize]) -> i64 {
    let usages = plain_usages(inst, assignment);
    let mut cost = 0;

    for resource in 0..inst.num_resources() {
        let weight = inst.load_cost_weights()[resource];
        for machine in 0..inst.num_machines() {
            let capacity = inst.machine(machine).capacities[resource];
            let safety_capacity = inst.machine(machine).safety_capacities[resource];
            let usage = usages[machine][resource];

            cost += weight * 0.max(capacity.min(usage) - safety_capacity);
        }
    }
    cost
}

fn balance_cost(inst: &Instance, assignment: &[usize]) -> i64 {
    let usages = plain_usages(inst, assignment);
    let mut cost = 0;

    for balance_cost in 0..inst.num_balance_costs() {
        let descriptor = inst.balance_cost(balance_cost);

        for machine in 0..inst.num_machines() {
            let free = |resource: usize| {
                let capacity = inst.machine(machine).capacities[resource];
                0.max(capacity - usages[machine][resource])
            };

            cost += i64::from(descriptor.weight)
                * 0.max(
                    descriptor.target * free(descriptor.first_resource)
                        - free(descriptor.second_resource),
                );
        }
    }
    cost
}

fn process_move_cost(inst: &Instance, assignment: &[usize]) -> i64 {
    let moved = assignment
        .iter()
        .enumerate()
        .filter(|&(process, &machine)| machine != inst.init_assignment()[process])
        .map(|(process, _)| i64::from(inst.process(process).move_cost))
        .sum::<i64>();

    moved * i64::from(inst.process_move_cost_weight())
}

fn service_move_cost(inst: &Instance, assignment: &[usize]) -> i64 {
    let mut moved = vec![0_i64; inst.num_services()];

    for (process, &machine) in assignment.iter().enumerate() {
        if machine != inst.init_assignment()[process] {
            moved[inst.process(process).service] += 1;
        }
    }

    moved.iter().max().copied().unwrap_or(0) * i64::from(inst.service_move_cost_weight())
}

fn machine_move_cost(inst: &Instance, assignment: &[usize]) -> i64 {
    let hops = assignment
        .iter()
        .enumerate()
        .map(|(process, &machine)| {
            let init_machine = inst.init_assignment()[process];
            i64::from(inst.machine(init_machine).move_costs[machine])
        })
        .sum::<i64>();

    hops * i64::from(inst.machine_move_cost_weight())
}
