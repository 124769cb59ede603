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

//! This module defines the immutable description of a machine reassignment
//! problem: resources, machines, services, processes, balance cost
//! descriptors, the objective weights and the initial assignment. An
//! [`Instance`] is built once per worker (from parsed data) and never
//! mutated afterwards, so it can safely be shared by reference between all
//! the components of that worker.
//!
//! All identifiers are dense indices: the position of an item in its owning
//! vector *is* its identifier. Neighborhood and location identifiers from
//! the input files are remapped to dense indices at parse time.

/// A resource dimension (cpu, ram, disk, ...). When a resource is
/// `transient`, the requirement of a moved process keeps being charged to
/// its initial machine in addition to its current one.
#[derive(Debug, Clone)]
pub struct Resource {
    pub transient: bool,
    pub load_cost_weight: i32,
}

/// One machine of the fleet. `move_costs[m]` is the cost of moving a
/// process initially hosted here onto machine `m`.
///
/// Invariant: `0 <= safety_capacities[r] <= capacities[r]` for every
/// resource `r`.
#[derive(Debug, Clone)]
pub struct Machine {
    pub neighborhood: usize,
    pub location: usize,
    pub capacities: Vec<i64>,
    pub safety_capacities: Vec<i64>,
    pub move_costs: Vec<i32>,
}

/// A service groups processes which may never share a machine. It must be
/// spread over at least `spread_min` distinct locations, and every
/// neighborhood hosting one of its processes must also host a process of
/// each service it depends on.
///
/// `reverse_dependencies` and `processes` are derived indices computed by
/// [`Instance::new`]: the transpose of `dependencies` over all services and
/// the inverse of [`Process::service`] respectively.
#[derive(Debug, Clone)]
pub struct Service {
    pub spread_min: i32,
    pub dependencies: Vec<usize>,
    pub reverse_dependencies: Vec<usize>,
    pub processes: Vec<usize>,
}

/// A process to (re)assign. `requirements[r]` is its consumption of
/// resource `r` on whichever machine hosts it.
#[derive(Debug, Clone)]
pub struct Process {
    pub service: usize,
    pub requirements: Vec<i64>,
    pub move_cost: i32,
}

/// A balance cost descriptor penalizing machines whose free amount of
/// `first_resource` exceeds `target` times the free amount of
/// `second_resource`.
#[derive(Debug, Clone)]
pub struct BalanceCost {
    pub first_resource: usize,
    pub second_resource: usize,
    pub target: i64,
    pub weight: i32,
}

/// The immutable problem description together with the derived indices
/// used all over the engine (machines per location/neighborhood, processes
/// per service, reverse dependencies, cached transient flags and load cost
/// weights).
#[derive(Debug, Clone)]
pub struct Instance {
    resources: Vec<Resource>,
    machines: Vec<Machine>,
    services: Vec<Service>,
    processes: Vec<Process>,
    balance_costs: Vec<BalanceCost>,

    // location -> machines, neighborhood -> machines
    locations: Vec<Vec<usize>>,
    neighborhoods: Vec<Vec<usize>>,

    init_assignment: Vec<usize>,

    process_move_cost_weight: i32,
    service_move_cost_weight: i32,
    machine_move_cost_weight: i32,

    // cached per-resource columns, hot in the move evaluation path
    is_transient: Vec<bool>,
    load_cost_weights: Vec<i64>,
}

impl Instance {
    /// Assembles an instance from its parsed parts and computes the derived
    /// indices. The `services` given here only carry their explicit data
    /// (`spread_min`, `dependencies`); the reverse dependencies and the
    /// process sets are filled in here.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        resources: Vec<Resource>,
        machines: Vec<Machine>,
        mut services: Vec<Service>,
        processes: Vec<Process>,
        balance_costs: Vec<BalanceCost>,
        init_assignment: Vec<usize>,
        process_move_cost_weight: i32,
        service_move_cost_weight: i32,
        machine_move_cost_weight: i32,
        num_neighborhoods: usize,
        num_locations: usize,
    ) -> Instance {
        let is_transient = resources.iter().map(|r| r.transient).collect();
        let load_cost_weights = resources
            .iter()
            .map(|r| i64::from(r.load_cost_weight))
            .collect();

        let mut reverse = vec![vec![]; services.len()];
        for (service, s) in services.iter().enumerate() {
            for &dependency in s.dependencies.iter() {
                reverse[dependency].push(service);
            }
        }
        for (service, r) in reverse.into_iter().enumerate() {
            services[service].reverse_dependencies = r;
        }

        for (process, p) in processes.iter().enumerate() {
            services[p.service].processes.push(process);
        }

        let mut locations = vec![vec![]; num_locations];
        let mut neighborhoods = vec![vec![]; num_neighborhoods];
        for (machine, m) in machines.iter().enumerate() {
            locations[m.location].push(machine);
            neighborhoods[m.neighborhood].push(machine);
        }

        Instance {
            resources,
            machines,
            services,
            processes,
            balance_costs,
            locations,
            neighborhoods,
            init_assignment,
            process_move_cost_weight,
            service_move_cost_weight,
            machine_move_cost_weight,
            is_transient,
            load_cost_weights,
        }
    }

    pub fn num_resources(&self) -> usize {
        self.resources.len()
    }
    pub fn num_machines(&self) -> usize {
        self.machines.len()
    }
    pub fn num_services(&self) -> usize {
        self.services.len()
    }
    pub fn num_processes(&self) -> usize {
        self.processes.len()
    }
    pub fn num_balance_costs(&self) -> usize {
        self.balance_costs.len()
    }
    pub fn num_locations(&self) -> usize {
        self.locations.len()
    }
    pub fn num_neighborhoods(&self) -> usize {
        self.neighborhoods.len()
    }

    pub fn resource(&self, resource: usize) -> &Resource {
        &self.resources[resource]
    }
    pub fn machine(&self, machine: usize) -> &Machine {
        &self.machines[machine]
    }
    pub fn service(&self, service: usize) -> &Service {
        &self.services[service]
    }
    pub fn process(&self, process: usize) -> &Process {
        &self.processes[process]
    }
    pub fn balance_cost(&self, balance_cost: usize) -> &BalanceCost {
        &self.balance_costs[balance_cost]
    }

    /// The machines sitting in the given location.
    pub fn location(&self, location: usize) -> &[usize] {
        &self.locations[location]
    }
    /// The machines sitting in the given neighborhood.
    pub fn neighborhood(&self, neighborhood: usize) -> &[usize] {
        &self.neighborhoods[neighborhood]
    }

    /// The assignment supplied as input. It is the reference point for all
    /// move cost terms and for the transient resource accounting.
    pub fn init_assignment(&self) -> &[usize] {
        &self.init_assignment
    }

    pub fn is_transient(&self) -> &[bool] {
        &self.is_transient
    }
    pub fn load_cost_weights(&self) -> &[i64] {
        &self.load_cost_weights
    }

    pub fn process_move_cost_weight(&self) -> i32 {
        self.process_move_cost_weight
    }
    pub fn service_move_cost_weight(&self) -> i32 {
        self.service_move_cost_weight
    }
    pub fn machine_move_cost_weight(&self) -> i32 {
        self.machine_move_cost_weight
    }
}
