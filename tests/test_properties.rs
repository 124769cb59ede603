//! Consistency properties of the incremental engine, exercised through
//! random walks of feasible moves over a small but featureful instance:
//! the running objective, the aggregates, the deltas and the transient
//! semantics must all agree with from-scratch recomputations at any point.

mod common;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use reassignment::checker;
use reassignment::solution::obj_value::ObjValue;
use reassignment::solution::Solution;

/// All feasible relocations, destination different from the current host.
fn feasible_moves(solution: &Solution) -> Vec<(usize, usize)> {
    let inst = solution.instance();
    let mut moves = vec![];

    for process in 0..inst.num_processes() {
        for machine in 0..inst.num_machines() {
            if solution.assignment()[process] != machine
                && solution.is_feasible(process, machine)
            {
                moves.push((process, machine));
            }
        }
    }
    moves
}

fn components(value: &ObjValue) -> [i64; 6] {
    [
        value.load(),
        value.balance(),
        value.process_move(),
        value.service_move(),
        value.machine_move(),
        value.total(),
    ]
}

fn componentwise_diff(after: &ObjValue, before: &ObjValue) -> [i64; 6] {
    let after = components(after);
    let before = components(before);
    [
        after[0] - before[0],
        after[1] - before[1],
        after[2] - before[2],
        after[3] - before[3],
        after[4] - before[4],
        after[5] - before[5],
    ]
}

/// Walks `len` random feasible moves, invoking `inspect` after each.
fn random_walk<F>(seed: u64, len: usize, mut inspect: F)
where
    F: FnMut(&Solution),
{
    let inst = common::rich_instance();
    let mut solution = Solution::new(inst);
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    for _ in 0..len {
        let moves = feasible_moves(&solution);
        if moves.is_empty() {
            break;
        }
        let (process, machine) = moves[rng.gen_range(0..moves.len())];

        let delta = solution.evaluate_feasible_move(process, machine);
        solution.move_process(process, machine, &delta);

        inspect(&solution);
    }
}

#[test]
fn p1_the_running_objective_matches_the_from_scratch_recomputation() {
    random_walk(1, 60, |solution| {
        assert_eq!(solution.compute_obj_value(), *solution.obj_value());
    });
}

#[test]
fn p2_the_aggregates_match_a_rebuild_from_the_current_assignment() {
    random_walk(2, 60, |solution| {
        let rebuilt = Solution::from_assignment(
            std::sync::Arc::clone(solution.shared_instance()),
            solution.assignment().to_vec(),
        );

        assert_eq!(rebuilt.usage(), solution.usage());
        assert_eq!(rebuilt.compute_obj_value(), *solution.obj_value());

        // behavioral equality of the stateful checkers
        let inst = solution.instance();
        for process in 0..inst.num_processes() {
            for machine in 0..inst.num_machines() {
                assert_eq!(
                    rebuilt.is_feasible(process, machine),
                    solution.is_feasible(process, machine),
                    "feasibility disagrees for process {} on machine {}",
                    process,
                    machine
                );
            }
        }
    });
}

#[test]
fn p3_every_feasible_delta_is_faithful_to_the_recomputed_difference() {
    random_walk(3, 25, |solution| {
        for (process, machine) in feasible_moves(solution) {
            let mut probe = solution.clone();
            let before = probe.compute_obj_value();

            let delta = probe.evaluate_feasible_move(process, machine);
            probe.move_process(process, machine, &delta);

            let after = probe.compute_obj_value();
            assert_eq!(
                componentwise_diff(&after, &before),
                components(&delta),
                "unfaithful delta for process {} on machine {}",
                process,
                machine
            );
        }
    });
}

#[test]
fn p4_a_move_and_its_reverse_restore_the_solution() {
    random_walk(4, 25, |solution| {
        for (process, machine) in feasible_moves(solution) {
            let mut probe = solution.clone();
            let home = probe.assignment()[process];

            let delta = probe.evaluate_feasible_move(process, machine);
            probe.move_process(process, machine, &delta);

            assert!(probe.is_feasible(process, home));
            let back = probe.evaluate_feasible_move(process, home);
            probe.move_process(process, home, &back);

            assert_eq!(solution.assignment(), probe.assignment());
            assert_eq!(solution.usage(), probe.usage());
            assert_eq!(*solution.obj_value(), *probe.obj_value());
            assert_eq!(solution.compute_obj_value(), probe.compute_obj_value());
        }
    });
}

#[test]
fn p5_the_transient_usage_of_the_initial_machine_never_changes() {
    let inst = common::rich_instance();
    let process = 0;
    let home = inst.init_assignment()[process];

    let mut solution = Solution::new(std::sync::Arc::clone(&inst));
    let reference = solution.usage().usage_transient(home)[0];

    // shuttle the process around, moving nothing else
    for &machine in &[1, 3, 0, 2, 0] {
        if !solution.is_feasible(process, machine) {
            continue;
        }
        let delta = solution.evaluate_feasible_move(process, machine);
        solution.move_process(process, machine, &delta);

        assert_eq!(reference, solution.usage().usage_transient(home)[0]);
    }
}

#[test]
fn the_walked_solutions_satisfy_the_offline_checker() {
    random_walk(5, 60, |solution| {
        assert_eq!(Ok(()), checker::check(solution.instance(), solution.assignment()));
        assert_eq!(
            checker::objective(solution.instance(), solution.assignment()),
            *solution.obj_value()
        );
    });
}
