//! Helpers to assemble the small synthetic instances used by the
//! integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use reassignment::instance::{BalanceCost, Instance, Machine, Process, Resource, Service};

pub fn resource(transient: bool, load_cost_weight: i32) -> Resource {
    Resource { transient, load_cost_weight }
}

pub fn machine(
    neighborhood: usize,
    location: usize,
    capacities: Vec<i64>,
    safety_capacities: Vec<i64>,
    move_costs: Vec<i32>,
) -> Machine {
    Machine {
        neighborhood,
        location,
        capacities,
        safety_capacities,
        move_costs,
    }
}

pub fn service(spread_min: i32, dependencies: Vec<usize>) -> Service {
    Service {
        spread_min,
        dependencies,
        reverse_dependencies: vec![],
        processes: vec![],
    }
}

pub fn process(service: usize, requirements: Vec<i64>, move_cost: i32) -> Process {
    Process { service, requirements, move_cost }
}

pub fn balance(first_resource: usize, second_resource: usize, target: i64, weight: i32) -> BalanceCost {
    BalanceCost { first_resource, second_resource, target, weight }
}

/// Assembles an instance; the neighborhood and location counts are derived
/// from the machines, and `weights` carries the process/service/machine
/// move cost weights in that order.
pub fn instance(
    resources: Vec<Resource>,
    machines: Vec<Machine>,
    services: Vec<Service>,
    processes: Vec<Process>,
    balance_costs: Vec<BalanceCost>,
    init_assignment: Vec<usize>,
    weights: (i32, i32, i32),
) -> Arc<Instance> {
    let num_neighborhoods = machines.iter().map(|m| m.neighborhood + 1).max().unwrap_or(0);
    let num_locations = machines.iter().map(|m| m.location + 1).max().unwrap_or(0);

    Arc::new(Instance::new(
        resources,
        machines,
        services,
        processes,
        balance_costs,
        init_assignment,
        weights.0,
        weights.1,
        weights.2,
        num_neighborhoods,
        num_locations,
    ))
}

/// A reasonably rich fixture: two resources (the first transient), four
/// machines spanning two neighborhoods and four locations, three services
/// with one dependency, six processes and one balance cost. The initial
/// assignment is feasible and leaves plenty of room to move.
pub fn rich_instance() -> Arc<Instance> {
    let resources = vec![resource(true, 10), resource(false, 1)];
    let machines = vec![
        machine(0, 0, vec![20, 20], vec![12, 12], vec![0, 1, 2, 3]),
        machine(0, 1, vec![20, 20], vec![12, 12], vec![1, 0, 1, 2]),
        machine(1, 2, vec![20, 20], vec![12, 12], vec![2, 1, 0, 1]),
        machine(1, 3, vec![20, 20], vec![12, 12], vec![3, 2, 1, 0]),
    ];
    let services = vec![
        service(1, vec![1]),
        service(1, vec![]),
        service(1, vec![]),
    ];
    let processes = vec![
        process(0, vec![4, 3], 2),
        process(1, vec![3, 2], 1),
        process(1, vec![2, 4], 3),
        process(2, vec![5, 1], 1),
        process(2, vec![1, 5], 2),
        process(2, vec![2, 2], 1),
    ];
    let balance_costs = vec![balance(0, 1, 2, 1)];
    let init_assignment = vec![0, 1, 2, 0, 2, 3];

    instance(
        resources,
        machines,
        services,
        processes,
        balance_costs,
        init_assignment,
        (3, 10, 2),
    )
}
