//! End-to-end scenarios, in the teacher's hand-built-CNF test style.

use std::time::Duration;

use cascade_sat::dimacs::{clauses_from_dimacs, write_dimacs};
use cascade_sat::encoding::xor_gate;
use cascade_sat::solver::{Config, Solution, Solver};
use cascade_sat::Lit;

fn solve_dimacs(text: &str) -> Solution {
    let parsed = clauses_from_dimacs(text).unwrap();
    let mut solver = Solver::new(Config::default());
    for _ in 0..parsed.num_vars {
        solver.new_variable(true);
    }
    for clause in parsed.clauses {
        solver.add_clause(clause);
    }
    solver.solve(vec![], Duration::ZERO)
}

fn is_sat(solution: &Solution) -> bool {
    matches!(solution, Solution::Sat(_))
}

/// Standard pigeonhole encoding: `pigeons` items into `holes` slots, each
/// pigeon in at least one hole, no hole holding two pigeons.
fn build_php(solver: &mut Solver, pigeons: usize, holes: usize) {
    let vars: Vec<Vec<Lit>> = (0..pigeons)
        .map(|_| (0..holes).map(|_| solver.new_variable(true)).collect())
        .collect();
    for row in &vars {
        solver.add_clause(row.clone());
    }
    for h in 0..holes {
        for p1 in 0..pigeons {
            for p2 in (p1 + 1)..pigeons {
                solver.add_clause(vec![!vars[p1][h], !vars[p2][h]]);
            }
        }
    }
}

#[test]
fn trivial_satisfiable_formula() {
    let result = solve_dimacs("p cnf 2 2\n1 2 0\n-1 2 0\n");
    assert!(matches!(result, Solution::Sat(_)));
}

#[test]
fn trivial_unsatisfiable_formula() {
    // x, !x, and a tautology to keep the clause count meaningful.
    let result = solve_dimacs("p cnf 1 2\n1 0\n-1 0\n");
    assert!(matches!(result, Solution::Unsat));
}

#[test]
fn pigeonhole_php_3_holes_4_pigeons_is_unsat() {
    let mut solver = Solver::with_default_config();
    build_php(&mut solver, 4, 3);
    let result = solver.solve(vec![], Duration::ZERO);
    assert!(matches!(result, Solution::Unsat));
}

#[test]
fn pigeonhole_php_20_holes_21_pigeons_exhausts_conflict_budget() {
    let mut solver = Solver::with_default_config();
    build_php(&mut solver, 21, 20);
    solver.set_conflict_budget(1000);
    let result = solver.solve(vec![], Duration::ZERO);
    assert!(matches!(result, Solution::Unknown));
    assert!(solver.stats().num_conflicts <= 1000);
}

#[test]
fn xor_chain_round_trip_all_16_patterns() {
    let mut s = Solver::with_default_config();
    let a = s.new_variable(true);
    let b = s.new_variable(true);
    let c = s.new_variable(true);
    let d = s.new_variable(true);
    let o = s.new_variable(true);
    xor_gate(&mut s, o, &[a, b, c, d]).unwrap();

    let inputs = [a, b, c, d];
    for pattern in 0u32..16 {
        let assumptions: Vec<Lit> = (0..4)
            .map(|i| {
                if pattern & (1 << i) != 0 {
                    inputs[i]
                } else {
                    !inputs[i]
                }
            })
            .collect();
        let parity_odd = pattern.count_ones() % 2 == 1;
        match s.solve(assumptions, Duration::ZERO) {
            Solution::Sat(_) => {
                assert_eq!(
                    s.read_model(o),
                    Some(parity_odd),
                    "pattern {pattern:04b} disagreed on parity"
                );
            }
            other => panic!("expected Sat for pattern {pattern:04b}, got {other:?}"),
        }
    }
}

#[test]
fn dimacs_export_then_reparse_preserves_answer() {
    let original = "p cnf 3 3\n1 2 0\n-1 3 0\n-2 -3 0\n";
    let answer_a = solve_dimacs(original);

    let parsed = clauses_from_dimacs(original).unwrap();
    let exported = write_dimacs(parsed.num_vars, &parsed.clauses);
    let answer_b = solve_dimacs(&exported);

    assert_eq!(is_sat(&answer_a), is_sat(&answer_b));
}

#[test]
fn clause_insertion_order_does_not_affect_answer() {
    let mut s1 = Solver::with_default_config();
    let a1 = s1.new_variable(true);
    let b1 = s1.new_variable(true);
    let c1 = s1.new_variable(true);
    s1.add_clause(vec![a1, b1]);
    s1.add_clause(vec![!a1, c1]);
    s1.add_clause(vec![b1, !c1]);
    let result1 = s1.solve(vec![], Duration::ZERO);

    let mut s2 = Solver::with_default_config();
    let a2 = s2.new_variable(true);
    let b2 = s2.new_variable(true);
    let c2 = s2.new_variable(true);
    s2.add_clause(vec![b2, !c2]);
    s2.add_clause(vec![!a2, c2]);
    s2.add_clause(vec![a2, b2]);
    let result2 = s2.solve(vec![], Duration::ZERO);

    assert_eq!(is_sat(&result1), is_sat(&result2));
}

#[test]
fn adding_an_already_satisfied_clause_is_idempotent() {
    let mut s = Solver::with_default_config();
    let a = s.new_variable(true);
    let b = s.new_variable(true);
    s.add_clause(vec![a]);
    let before = s.solve(vec![], Duration::ZERO);
    // `a` is already true, so `(a \/ b)` is satisfied the instant it's added.
    assert!(s.add_clause(vec![a, b]));
    let after = s.solve(vec![], Duration::ZERO);
    assert_eq!(is_sat(&before), is_sat(&after));
}

#[test]
fn chain_of_implications_propagates_to_sat() {
    let mut solver = Solver::new(Config::default());
    let vars: Vec<_> = (0..5).map(|_| solver.new_variable(true)).collect();
    for w in vars.windows(2) {
        solver.add_clause(vec![!w[0], w[1]]);
    }
    solver.add_clause(vec![vars[0]]);
    match solver.solve(vec![], Duration::ZERO) {
        Solution::Sat(_) => {
            for &v in &vars {
                assert_eq!(solver.read_model(v), Some(true));
            }
        }
        other => panic!("expected Sat, got {other:?}"),
    }
}

#[test]
fn solver_remains_unsat_after_detecting_contradiction() {
    let mut solver = Solver::new(Config::default());
    let a = solver.new_variable(true);
    solver.add_clause(vec![a]);
    solver.add_clause(vec![!a]);
    assert!(!solver.is_ok());
    // A second solve call must short-circuit to Unsat without doing work.
    assert!(matches!(
        solver.solve(vec![], Duration::ZERO),
        Solution::Unsat
    ));
}

#[test]
fn assumptions_prune_the_search_space() {
    let mut solver = Solver::new(Config::default());
    let a = solver.new_variable(true);
    let b = solver.new_variable(true);
    solver.add_clause(vec![a, b]);
    match solver.solve(vec![!a], Duration::ZERO) {
        Solution::Sat(_) => assert_eq!(solver.read_model(b), Some(true)),
        other => panic!("expected Sat, got {other:?}"),
    }
}

#[test]
fn conflicting_assumption_yields_unsat_core() {
    let mut solver = Solver::new(Config::default());
    let a = solver.new_variable(true);
    solver.add_clause(vec![a]);
    match solver.solve(vec![!a], Duration::ZERO) {
        Solution::Unsat => assert_eq!(solver.conflict_literals(), &[!a]),
        other => panic!("expected Unsat, got {other:?}"),
    }
}
