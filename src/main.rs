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

//! The solver front-end. It parses the instance, spawns one search worker
//! per requested thread, sleeps until five seconds before the wall-clock
//! budget expires, raises the cancellation flag, folds the per-worker bests
//! and only then writes the output assignment.

use std::env;
use std::error::Error;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use structopt::StructOpt;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use reassignment::parser;
use reassignment::solution::Solution;
use reassignment::worker::{CancellationToken, SearchParams, Worker};

#[derive(StructOpt)]
/// Solve a ROADEF/EURO 2012 machine reassignment instance
struct Args {
    /// time limit (s)
    #[structopt(short = "t")]
    time_limit: Option<u64>,
    /// model file
    #[structopt(short = "p", parse(from_os_str))]
    model: Option<PathBuf>,
    /// initial assignment file
    #[structopt(short = "i", parse(from_os_str))]
    initial: Option<PathBuf>,
    /// output solution file
    #[structopt(short = "o", parse(from_os_str))]
    output: Option<PathBuf>,
    /// master random seed
    #[structopt(short = "s")]
    seed: Option<u64>,
    /// Return the team's name
    #[structopt(long = "name")]
    name: bool,

    /// perturbation percent num moves
    #[structopt(short = "a", default_value = "0.01")]
    perturbation_ratio: f64,
    /// local search num processes
    #[structopt(short = "b", default_value = "200")]
    ls_num_processes: usize,
    /// max num iter without improvement
    #[structopt(short = "c", default_value = "200")]
    max_num_non_improv_iter: i64,
    /// num threads
    #[structopt(short = "d", default_value = "1")]
    num_threads: usize,
    /// local search num machines
    #[structopt(short = "e", default_value = "500")]
    ls_num_machines: usize,
    /// local search number of retries
    #[structopt(short = "f", default_value = "10")]
    ls_num_tries_max: usize,
}

fn main() {
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(fmt::layer())
        .init();

    // the challenge spells the name flag with a single dash
    let argv = env::args()
        .map(|arg| if arg == "-name" { "--name".to_string() } else { arg })
        .collect::<Vec<String>>();
    let args = Args::from_iter(argv);

    if args.name {
        println!("J10");

        let no_mandatory_flag = args.time_limit.is_none()
            && args.model.is_none()
            && args.initial.is_none()
            && args.output.is_none()
            && args.seed.is_none();
        if no_mandatory_flag {
            return;
        }
    }

    if let Err(error) = solve(args) {
        eprintln!("Error: {}", error);
        process::exit(1);
    }
}

fn solve(args: Args) -> Result<(), Box<dyn Error>> {
    let (time_limit, model, initial, output, seed) =
        match (args.time_limit, &args.model, &args.initial, &args.output, args.seed) {
            (Some(t), Some(p), Some(i), Some(o), Some(s)) => (t, p, i, o, s),
            _ => return Err("missing at least one mandatory parameter (-t -p -i -o -s)".into()),
        };

    let instance = parser::parse_instance(File::open(model)?, File::open(initial)?)?;
    info!(
        processes = instance.num_processes(),
        machines = instance.num_machines(),
        services = instance.num_services(),
        resources = instance.num_resources(),
        threads = args.num_threads,
        seed,
        "instance loaded"
    );

    let params = SearchParams {
        perturbation_ratio: args.perturbation_ratio,
        ls_num_processes: args.ls_num_processes,
        max_num_non_improv_iter: args.max_num_non_improv_iter,
        ls_num_machines: args.ls_num_machines,
        ls_num_tries_max: args.ls_num_tries_max,
    };

    // every worker deeply owns its copy of the instance and its own seed
    let mut master = ChaCha8Rng::seed_from_u64(seed);
    let mut workers = (0..args.num_threads)
        .map(|_| Worker::new(Arc::new(instance.clone()), &params, master.gen()))
        .collect::<Vec<Worker>>();

    let cancellation = CancellationToken::new();

    crossbeam::thread::scope(|s| {
        for worker in workers.iter_mut() {
            let token = cancellation.clone();
            s.spawn(move |_| worker.run(&token));
        }

        // keep a ~5-second buffer to fold the results and write the output
        thread::sleep(Duration::from_secs(time_limit.saturating_sub(5)));
        cancellation.cancel();
    })
    .expect("Something went wrong with the worker threads");

    let best = fold_best(&workers).ok_or("no worker produced a solution")?;

    info!(
        objective = %best.obj_value(),
        total = best.obj_value().total(),
        "writing the best assignment"
    );
    write_assignment(output, &best)?;

    Ok(())
}

/// The cross-worker fold: strictly smaller totals win, the first worker
/// wins ties.
fn fold_best(workers: &[Worker]) -> Option<Solution> {
    let mut best: Option<Solution> = None;

    for worker in workers {
        if let Ok(solution) = worker.best_solution() {
            let improves = match &best {
                Some(incumbent) => {
                    solution.obj_value().total() < incumbent.obj_value().total()
                }
                None => true,
            };
            if improves {
                best = Some(solution);
            }
        }
    }

    best
}

fn write_assignment(path: &PathBuf, solution: &Solution) -> Result<(), Box<dyn Error>> {
    let mut out = BufWriter::new(File::create(path)?);
    for machine in solution.assignment() {
        write!(out, "{} ", machine)?;
    }
    out.flush()?;
    Ok(())
}
