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

//! This module reads the two input files of the challenge: the model file
//! describing the instance and the initial assignment file. Both are plain
//! streams of whitespace-separated integers.
//!
//! Neighborhood and location identifiers found in the model file are not
//! required to be dense, so they are remapped to contiguous indices in
//! first-seen order. The remapping is stable for a given input.
//!
//! Any malformed input (truncated stream, non-numeric token, out-of-range
//! index, trailing data) is fatal: the caller is expected to terminate with
//! a diagnostic and must not emit an output file.

use std::io::Read;
use std::str::SplitWhitespace;

use metrohash::MetroHashMap;
use thiserror::Error;

use crate::instance::{BalanceCost, Instance, Machine, Process, Resource, Service};

/// The reasons why an input file may be rejected. Token positions are
/// 0-based counts of whitespace-separated tokens since the start of the
/// offending file.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("i/o error while reading the input: {0}")]
    Io(#[from] std::io::Error),
    #[error("unexpected end of input (token {0})")]
    UnexpectedEof(usize),
    #[error("invalid token {token:?} at position {position}")]
    InvalidToken { position: usize, token: String },
    #[error("{kind} index {index} out of range at position {position} (expected < {max})")]
    IndexOutOfRange {
        kind: &'static str,
        position: usize,
        index: i64,
        max: usize,
    },
    #[error("trailing token {token:?} after the expected end of input")]
    TrailingData { token: String },
}

/// Parses a model file and the matching initial assignment file into an
/// [`Instance`].
pub fn parse_instance<M: Read, A: Read>(
    model: M,
    initial_assignment: A,
) -> Result<Instance, ParseError> {
    let model = read_to_string(model)?;
    let mut tokens = Tokens::new(&model);

    let resources = parse_resources(&mut tokens)?;
    let (machines, num_neighborhoods, num_locations) =
        parse_machines(&mut tokens, resources.len())?;
    let services = parse_services(&mut tokens)?;
    let processes = parse_processes(&mut tokens, resources.len(), services.len())?;
    let balance_costs = parse_balance_costs(&mut tokens, resources.len())?;

    let process_move_cost_weight = tokens.next_i32()?;
    let service_move_cost_weight = tokens.next_i32()?;
    let machine_move_cost_weight = tokens.next_i32()?;
    tokens.expect_eof()?;

    let assignment = read_to_string(initial_assignment)?;
    let mut tokens = Tokens::new(&assignment);
    let init_assignment = parse_assignment_tokens(&mut tokens, processes.len(), machines.len())?;

    Ok(Instance::new(
        resources,
        machines,
        services,
        processes,
        balance_costs,
        init_assignment,
        process_move_cost_weight,
        service_move_cost_weight,
        machine_move_cost_weight,
        num_neighborhoods,
        num_locations,
    ))
}

/// Parses an assignment file: exactly `num_processes` machine indices, each
/// smaller than `num_machines`. Used for the initial assignment and for the
/// candidate assignment fed to the solution checker.
pub fn parse_assignment<R: Read>(
    input: R,
    num_processes: usize,
    num_machines: usize,
) -> Result<Vec<usize>, ParseError> {
    let text = read_to_string(input)?;
    let mut tokens = Tokens::new(&text);
    parse_assignment_tokens(&mut tokens, num_processes, num_machines)
}

fn read_to_string<R: Read>(mut input: R) -> Result<String, ParseError> {
    let mut text = String::new();
    input.read_to_string(&mut text)?;
    Ok(text)
}

fn parse_resources(tokens: &mut Tokens<'_>) -> Result<Vec<Resource>, ParseError> {
    let num_resources = tokens.next_count()?;
    let mut resources = Vec::with_capacity(num_resources);

    for _ in 0..num_resources {
        let transient = tokens.next_bool()?;
        let load_cost_weight = tokens.next_i32()?;
        resources.push(Resource { transient, load_cost_weight });
    }

    Ok(resources)
}

fn parse_machines(
    tokens: &mut Tokens<'_>,
    num_resources: usize,
) -> Result<(Vec<Machine>, usize, usize), ParseError> {
    let num_machines = tokens.next_count()?;
    let mut machines = Vec::with_capacity(num_machines);

    // raw identifier -> dense index, in first-seen order
    let mut neighborhoods: MetroHashMap<i64, usize> = MetroHashMap::default();
    let mut locations: MetroHashMap<i64, usize> = MetroHashMap::default();

    for _ in 0..num_machines {
        let raw_neighborhood = tokens.next_i64()?;
        let raw_location = tokens.next_i64()?;

        let next = neighborhoods.len();
        let neighborhood = *neighborhoods.entry(raw_neighborhood).or_insert(next);
        let next = locations.len();
        let location = *locations.entry(raw_location).or_insert(next);

        let capacities = tokens.next_i64_array(num_resources)?;
        let safety_capacities = tokens.next_i64_array(num_resources)?;
        let mut move_costs = Vec::with_capacity(num_machines);
        for _ in 0..num_machines {
            move_costs.push(tokens.next_i32()?);
        }

        machines.push(Machine {
            neighborhood,
            location,
            capacities,
            safety_capacities,
            move_costs,
        });
    }

    Ok((machines, neighborhoods.len(), locations.len()))
}

fn parse_services(tokens: &mut Tokens<'_>) -> Result<Vec<Service>, ParseError> {
    let num_services = tokens.next_count()?;
    let mut services = Vec::with_capacity(num_services);

    for _ in 0..num_services {
        let spread_min = tokens.next_i32()?;
        let num_dependencies = tokens.next_count()?;
        let mut dependencies = Vec::with_capacity(num_dependencies);
        for _ in 0..num_dependencies {
            dependencies.push(tokens.next_index("service", num_services)?);
        }

        services.push(Service {
            spread_min,
            dependencies,
            reverse_dependencies: vec![],
            processes: vec![],
        });
    }

    Ok(services)
}

fn parse_processes(
    tokens: &mut Tokens<'_>,
    num_resources: usize,
    num_services: usize,
) -> Result<Vec<Process>, ParseError> {
    let num_processes = tokens.next_count()?;
    let mut processes = Vec::with_capacity(num_processes);

    for _ in 0..num_processes {
        let service = tokens.next_index("service", num_services)?;
        let requirements = tokens.next_i64_array(num_resources)?;
        let move_cost = tokens.next_i32()?;
        processes.push(Process { service, requirements, move_cost });
    }

    Ok(processes)
}

fn parse_balance_costs(
    tokens: &mut Tokens<'_>,
    num_resources: usize,
) -> Result<Vec<BalanceCost>, ParseError> {
    let num_balance_costs = tokens.next_count()?;
    let mut balance_costs = Vec::with_capacity(num_balance_costs);

    for _ in 0..num_balance_costs {
        let first_resource = tokens.next_index("resource", num_resources)?;
        let second_resource = tokens.next_index("resource", num_resources)?;
        let target = tokens.next_i64()?;
        let weight = tokens.next_i32()?;
        balance_costs.push(BalanceCost {
            first_resource,
            second_resource,
            target,
            weight,
        });
    }

    Ok(balance_costs)
}

fn parse_assignment_tokens(
    tokens: &mut Tokens<'_>,
    num_processes: usize,
    num_machines: usize,
) -> Result<Vec<usize>, ParseError> {
    let mut assignment = Vec::with_capacity(num_processes);
    for _ in 0..num_processes {
        assignment.push(tokens.next_index("machine", num_machines)?);
    }
    tokens.expect_eof()?;
    Ok(assignment)
}

/// A cursor over the whitespace-separated tokens of one input file.
struct Tokens<'a> {
    iter: SplitWhitespace<'a>,
    position: usize,
}

impl<'a> Tokens<'a> {
    fn new(text: &'a str) -> Tokens<'a> {
        Tokens { iter: text.split_whitespace(), position: 0 }
    }

    fn next_token(&mut self) -> Result<&'a str, ParseError> {
        match self.iter.next() {
            Some(token) => {
                self.position += 1;
                Ok(token)
            }
            None => Err(ParseError::UnexpectedEof(self.position)),
        }
    }

    fn next_i64(&mut self) -> Result<i64, ParseError> {
        let token = self.next_token()?;
        token.parse().map_err(|_| ParseError::InvalidToken {
            position: self.position - 1,
            token: token.to_string(),
        })
    }

    fn next_i32(&mut self) -> Result<i32, ParseError> {
        let token = self.next_token()?;
        token.parse().map_err(|_| ParseError::InvalidToken {
            position: self.position - 1,
            token: token.to_string(),
        })
    }

    /// A non-negative count (number of resources, machines, ...).
    fn next_count(&mut self) -> Result<usize, ParseError> {
        let token = self.next_token()?;
        token.parse().map_err(|_| ParseError::InvalidToken {
            position: self.position - 1,
            token: token.to_string(),
        })
    }

    /// An index which must be smaller than `max`.
    fn next_index(&mut self, kind: &'static str, max: usize) -> Result<usize, ParseError> {
        let index = self.next_i64()?;
        if index < 0 || index as usize >= max {
            Err(ParseError::IndexOutOfRange {
                kind,
                position: self.position - 1,
                index,
                max,
            })
        } else {
            Ok(index as usize)
        }
    }

    fn next_bool(&mut self) -> Result<bool, ParseError> {
        let token = self.next_token()?;
        match token {
            "0" => Ok(false),
            "1" => Ok(true),
            _ => Err(ParseError::InvalidToken {
                position: self.position - 1,
                token: token.to_string(),
            }),
        }
    }

    fn next_i64_array(&mut self, len: usize) -> Result<Vec<i64>, ParseError> {
        let mut values = Vec::with_capacity(len);
        for _ in 0..len {
            values.push(self.next_i64()?);
        }
        Ok(values)
    }

    fn expect_eof(&mut self) -> Result<(), ParseError> {
        match self.iter.next() {
            None => Ok(()),
            Some(token) => Err(ParseError::TrailingData { token: token.to_string() }),
        }
    }
}
