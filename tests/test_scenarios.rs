//! Minimal end-to-end scenarios: a quiet instance, a single evaluated
//! move, the transient capacity rule, the spread and dependency
//! constraints, and the pool eviction policy.

mod common;

use std::sync::Arc;

use reassignment::pool::Pool;
use reassignment::solution::Solution;

use common::{instance, machine, process, resource, service};

/// One non-transient resource, two machines with capacities 10 and safety
/// capacities 5, two single-process services, all weights 1. Moving
/// between the machines costs 1.
fn identity_instance() -> Arc<reassignment::instance::Instance> {
    instance(
        vec![resource(false, 1)],
        vec![
            machine(0, 0, vec![10], vec![5], vec![0, 1]),
            machine(0, 1, vec![10], vec![5], vec![1, 0]),
        ],
        vec![service(1, vec![]), service(1, vec![])],
        vec![process(0, vec![3], 1), process(1, vec![4], 1)],
        vec![],
        vec![0, 1],
        (1, 1, 1),
    )
}

#[test]
fn scenario_a_the_untouched_initial_assignment_costs_nothing() {
    let solution = Solution::new(identity_instance());
    let objective = solution.obj_value();

    assert_eq!(0, objective.load());
    assert_eq!(0, objective.balance());
    assert_eq!(0, objective.process_move());
    assert_eq!(0, objective.service_move());
    assert_eq!(0, objective.machine_move());
    assert_eq!(0, objective.total());
}

#[test]
fn scenario_b_a_single_move_prices_every_component() {
    let mut solution = Solution::new(identity_instance());

    assert!(solution.is_feasible(0, 1));
    let delta = solution.evaluate_feasible_move(0, 1);

    // usage 3 + 4 = 7 on machine 1 overshoots the safety capacity by 2
    assert_eq!(2, delta.load());
    assert_eq!(0, delta.balance());
    assert_eq!(1, delta.process_move());
    assert_eq!(1, delta.service_move());
    assert_eq!(1, delta.machine_move());

    solution.move_process(0, 1, &delta);
    assert_eq!(*solution.obj_value(), solution.compute_obj_value());
    assert_eq!(5, solution.obj_value().total());
}

#[test]
fn scenario_c_a_transient_resource_lets_a_process_come_home() {
    let inst = instance(
        vec![resource(true, 1)],
        vec![
            machine(0, 0, vec![10], vec![10], vec![0, 0]),
            machine(0, 1, vec![10], vec![10], vec![0, 0]),
        ],
        vec![service(1, vec![]), service(1, vec![])],
        vec![process(0, vec![3], 1), process(1, vec![4], 1)],
        vec![],
        vec![0, 0],
        (1, 1, 1),
    );
    let mut solution = Solution::new(Arc::clone(&inst));
    let home_transient = solution.usage().usage_transient(0)[0];

    assert!(solution.is_feasible(0, 1));
    let away = solution.evaluate_feasible_move(0, 1);
    solution.move_process(0, 1, &away);
    assert_eq!(home_transient, solution.usage().usage_transient(0)[0]);

    assert!(solution.is_feasible(0, 0));
    let back = solution.evaluate_feasible_move(0, 0);
    solution.move_process(0, 0, &back);
    assert_eq!(home_transient, solution.usage().usage_transient(0)[0]);
}

#[test]
fn scenario_d_a_service_at_its_minimum_spread_may_not_collapse() {
    // one service over two locations, one process per location
    let inst = instance(
        vec![resource(false, 1)],
        vec![
            machine(0, 0, vec![10], vec![10], vec![0; 4]),
            machine(0, 0, vec![10], vec![10], vec![0; 4]),
            machine(0, 1, vec![10], vec![10], vec![0; 4]),
            machine(0, 1, vec![10], vec![10], vec![0; 4]),
        ],
        vec![service(2, vec![])],
        vec![process(0, vec![1], 1), process(0, vec![1], 1)],
        vec![],
        vec![0, 2],
        (1, 1, 1),
    );
    let solution = Solution::new(inst);

    // crossing into the other location would leave a single location
    assert!(!solution.is_feasible(0, 3));
    assert!(!solution.is_feasible(1, 1));

    // moving within the source location keeps the spread intact
    assert!(solution.is_feasible(0, 1));
    assert!(solution.is_feasible(1, 3));
}

#[test]
fn scenario_e_dependencies_bind_across_neighborhoods() {
    // s0 depends on s1; both live in neighborhood 0, s1 also in 1
    let inst = instance(
        vec![resource(false, 1)],
        vec![
            machine(0, 0, vec![10], vec![10], vec![0; 4]),
            machine(0, 1, vec![10], vec![10], vec![0; 4]),
            machine(1, 2, vec![10], vec![10], vec![0; 4]),
            machine(1, 3, vec![10], vec![10], vec![0; 4]),
        ],
        vec![service(1, vec![1]), service(1, vec![])],
        vec![
            process(0, vec![1], 1),
            process(1, vec![1], 1),
            process(1, vec![1], 1),
        ],
        vec![],
        vec![0, 1, 2],
        (1, 1, 1),
    );
    let solution = Solution::new(inst);

    // s0 may follow its dependency into neighborhood 1
    assert!(solution.is_feasible(0, 3));

    // s1 may not abandon neighborhood 0 while s0 is still there
    assert!(!solution.is_feasible(1, 3));
}

#[test]
fn scenario_f_the_pool_keeps_the_best_distinct_totals() {
    // five machines, one process: parking it on machine m costs exactly
    // the move cost 0 -> m, so each total below is reachable directly
    let inst = instance(
        vec![resource(false, 0)],
        (0..5)
            .map(|_| machine(0, 0, vec![10], vec![10], vec![0, 100, 80, 70, 90]))
            .collect(),
        vec![service(1, vec![])],
        vec![process(0, vec![1], 0)],
        vec![],
        vec![0],
        (0, 0, 1),
    );

    let with_total = |total: i64| {
        let target = match total {
            100 => 1,
            80 => 2,
            70 => 3,
            90 => 4,
            _ => 0,
        };
        let solution = Solution::from_assignment(Arc::clone(&inst), vec![target]);
        assert_eq!(total, solution.obj_value().total());
        solution
    };

    let pool = Pool::new(2);

    pool.add_solution(&with_total(100));
    assert_eq!(vec![100], pool.totals());

    pool.add_solution(&with_total(80));
    assert_eq!(vec![80, 100], pool.totals());

    pool.add_solution(&with_total(80));
    assert_eq!(vec![80, 100], pool.totals());

    pool.add_solution(&with_total(70));
    assert_eq!(vec![70, 80], pool.totals());

    pool.add_solution(&with_total(90));
    assert_eq!(vec![70, 80], pool.totals());
}
