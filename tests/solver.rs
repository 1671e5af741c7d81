//! End-to-end scenarios pinned by the specification: each checks the DPLL
//! engine's enumerated models against either a literal expected set or an
//! independent brute-force cross-check.

use std::collections::HashSet;
use std::io::Write;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use boolsat::sat::{brute_force, dimacs, dpll};
use boolsat::{is_match, Formula, Lit, Match, Trit};

fn lit(id: i32) -> Lit {
    Lit::new(id)
}

fn all_models(formula: &Formula) -> Vec<Match> {
    dpll::solve(formula, dpll::Settings::default()).collect()
}

#[test]
fn chain_implication_has_exactly_the_two_constant_models() {
    let mut f = Formula::new(3);
    f.add_clause(vec![lit(1), lit(-2)]).unwrap();
    f.add_clause(vec![lit(2), lit(-3)]).unwrap();
    f.add_clause(vec![lit(3), lit(-1)]).unwrap();

    let models: HashSet<Vec<Trit>> = all_models(&f).into_iter().map(|m| m.values).collect();
    let expected: HashSet<Vec<Trit>> = [
        vec![Trit::False, Trit::False, Trit::False],
        vec![Trit::True, Trit::True, Trit::True],
    ]
    .into_iter()
    .collect();
    assert_eq!(models, expected);
}

#[test]
fn unit_propagation_forces_the_expected_variables() {
    // {-1,2,5}, {1,3}, {2,5}, {-3,4,-5}, {-1}
    let mut f = Formula::new(5);
    f.add_clause(vec![lit(-1), lit(2), lit(5)]).unwrap();
    f.add_clause(vec![lit(1), lit(3)]).unwrap();
    f.add_clause(vec![lit(2), lit(5)]).unwrap();
    f.add_clause(vec![lit(-3), lit(4), lit(-5)]).unwrap();
    f.add_clause(vec![lit(-1)]).unwrap();

    let models = all_models(&f);
    assert!(!models.is_empty());
    for m in &models {
        assert!(is_match(&f, m));
        assert_eq!(m.values[0], Trit::False, "x1 must be forced false");
        assert_eq!(m.values[2], Trit::True, "x3 must be forced true");
    }
}

#[test]
fn direct_unit_clash_is_unsatisfiable() {
    let mut f = Formula::new(1);
    f.add_clause(vec![lit(1)]).unwrap();
    f.add_clause(vec![lit(-1)]).unwrap();

    let mut solver = dpll::solve(&f, dpll::Settings::default());
    assert!(solver.next().unwrap().is_none());
}

#[test]
fn zero_variable_formula_is_vacuously_satisfiable_once() {
    let f = Formula::new(0);
    let models = all_models(&f);
    assert_eq!(models.len(), 1);
    assert!(models[0].values.is_empty());
}

#[test]
fn every_two_literal_clash_over_two_variables_is_unsatisfiable() {
    let mut f = Formula::new(2);
    f.add_clause(vec![lit(1), lit(2)]).unwrap();
    f.add_clause(vec![lit(1), lit(-2)]).unwrap();
    f.add_clause(vec![lit(-1), lit(2)]).unwrap();
    f.add_clause(vec![lit(-1), lit(-2)]).unwrap();

    assert_eq!(all_models(&f).len(), 0);
}

#[test]
fn no_model_is_enumerated_twice() {
    let mut f = Formula::new(4);
    f.add_clause(vec![lit(1), lit(2), lit(-3)]).unwrap();
    f.add_clause(vec![lit(-1), lit(3), lit(4)]).unwrap();
    f.add_clause(vec![lit(2), lit(-4)]).unwrap();
    f.add_clause(vec![lit(-2), lit(3)]).unwrap();

    let models = all_models(&f);
    let unique: HashSet<Vec<Trit>> = models.iter().map(|m| m.values.clone()).collect();
    assert_eq!(models.len(), unique.len());
}

#[test]
fn stress_random_3cnf_matches_brute_force() {
    let mut rng = SmallRng::seed_from_u64(0xB00B5A7);
    let n = 10;
    let mut f = Formula::new(n);
    for _ in 0..30 {
        let mut vars = HashSet::new();
        while vars.len() < 3 {
            vars.insert(rng.gen_range(0, n));
        }
        let clause: Vec<Lit> = vars
            .into_iter()
            .map(|v| {
                let positive = rng.gen_bool(0.5);
                if positive { (v as i32) + 1 } else { -((v as i32) + 1) }
            })
            .map(Lit::new)
            .collect();
        f.add_clause(clause).unwrap();
    }

    let mut dpll_models: Vec<Vec<Trit>> = all_models(&f).into_iter().map(|m| m.values).collect();
    let mut brute_models: Vec<Vec<Trit>> = brute_force::solve(&f).map(|m| m.values).collect();
    dpll_models.sort();
    brute_models.sort();
    assert_eq!(dpll_models, brute_models);
}

#[test]
fn dimacs_round_trip_through_a_real_file_drives_the_solver() {
    let mut tmp = tempfile::NamedTempFile::new().unwrap();
    writeln!(tmp, "c three-variable implication chain").unwrap();
    writeln!(tmp, "p cnf 3 3").unwrap();
    writeln!(tmp, "1 -2 0").unwrap();
    writeln!(tmp, "2 -3 0").unwrap();
    writeln!(tmp, "3 -1 0").unwrap();
    tmp.flush().unwrap();

    let (formula, backward) = dimacs::parse_file(tmp.path(), true).unwrap();
    assert_eq!(formula.variable_count, 3);

    let model = dpll::solve(&formula, dpll::Settings::default()).next().unwrap();
    assert!(is_match(&formula, &model));
    assert!(dimacs::validate_model_file(tmp.path(), &backward, &model).unwrap());
}
