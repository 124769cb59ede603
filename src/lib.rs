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

//! # Reassignment
//! An incremental local-search engine for the ROADEF/EURO 2012 machine
//! reassignment challenge. Given a set of machines with multi-dimensional
//! capacities and a set of processes each assigned to a machine, the solver
//! looks for a cheaper assignment satisfying capacity (with transient
//! semantics), conflict, spread and dependency constraints.
//!
//! The engine evaluates any single-process relocation in time proportional
//! to the number of resources thanks to a set of aggregates maintained
//! incrementally by the [`Solution`](solution::Solution) façade. On top of
//! that sit two search operators (steepest-descent hill climbing and a
//! random perturbation) composed by an iterated local search driver, run by
//! one [`Worker`](worker::Worker) per thread until the wall-clock budget
//! expires.

pub mod instance;
pub mod parser;
pub mod solution;
pub mod pool;
pub mod search;
pub mod worker;
pub mod checker;
