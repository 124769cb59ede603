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

//! The offline solution validator. It reads the model, the initial
//! assignment and a candidate assignment, and recomputes feasibility and
//! objective from scratch. In quiet mode (any fourth argument) it prints a
//! single line: the objective total, or `i64::MAX` when the candidate is
//! infeasible.

use std::env;
use std::error::Error;
use std::fs::File;
use std::process;

use reassignment::checker;
use reassignment::parser;

fn main() {
    let args = env::args().collect::<Vec<String>>();

    if args.len() != 4 && args.len() != 5 {
        eprintln!(
            "Wrong number of files to read.\n\
             The syntax should be:\n\
             solution_checker instance_filename initial_solution_filename \
             new_solution_filename [quiet mode]"
        );
        return;
    }

    if let Err(error) = run(&args) {
        eprintln!("Error: {}", error);
        process::exit(1);
    }
}

fn run(args: &[String]) -> Result<(), Box<dyn Error>> {
    let instance = parser::parse_instance(File::open(&args[1])?, File::open(&args[2])?)?;
    let assignment = parser::parse_assignment(
        File::open(&args[3])?,
        instance.num_processes(),
        instance.num_machines(),
    )?;
    let quiet = args.len() == 5;

    match checker::check(&instance, &assignment) {
        Ok(()) => {
            let objective = checker::objective(&instance, &assignment);
            if quiet {
                println!("{}", objective.total());
            } else {
                println!(
                    "Solution is valid. Total objective cost is {}",
                    objective.total()
                );
            }
        }
        Err(violation) => {
            if quiet {
                println!("{}", i64::max_value());
            } else {
                println!("Solution is invalid ({}).", violation);
            }
        }
    }

    Ok(())
}
