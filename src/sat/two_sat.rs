//! A 2-SAT solver: builds the implication graph of a 2-CNF formula, finds
//! its strongly-connected components, and reads a single model off the
//! component ordering — or reports unsatisfiability. Does not enumerate
//! further solutions; that is the DPLL engine's job.

use crate::error::SolverError;
use crate::sat::formula::{Formula, Lit, Match, Trit};
use crate::sat::graph::Graph;

/// Returns `Ok(None)` if `formula` is unsatisfiable, `Ok(Some(model))` with
/// one satisfying model otherwise. Fails if any clause has more than two
/// literals — this engine is only valid for 2-CNF.
pub fn solve(formula: &Formula) -> Result<Option<Match>, SolverError> {
    let n = formula.variable_count;

    for clause in &formula.clauses {
        if clause.len() > 2 {
            return Err(SolverError::MalformedFormula {
                reason: format!(
                    "2-SAT engine requires clauses of at most 2 literals, found one with {}",
                    clause.len()
                ),
            });
        }
    }

    let mut graph = Graph::new(2 * n);
    for clause in &formula.clauses {
        let lhs = clause[0];
        let rhs = if clause.len() == 2 { clause[1] } else { clause[0] };
        add_implication(&mut graph, n, lhs, rhs);
        add_implication(&mut graph, n, rhs, lhs);
    }

    let comp = graph.decompose();

    for v in 0..n {
        let pos = v;
        let neg = n + v;
        if comp[pos] == comp[neg] {
            return Ok(None);
        }
    }

    let mut values = Vec::with_capacity(n);
    for v in 0..n {
        let pos = v;
        let neg = n + v;
        values.push(Trit::from_bool(comp[pos] >= comp[neg]));
    }
    Ok(Some(Match { values }))
}

/// Adds the implication-graph edge for clause literal `rhs` given its
/// partner `lhs`: `¬lhs -> rhs`.
fn add_implication(graph: &mut Graph, n: usize, lhs: Lit, rhs: Lit) {
    graph.add_edge((!lhs).slot(n), rhs.slot(n));
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::sat::formula::is_match;

    fn lit(id: i32) -> Lit {
        Lit::new(id)
    }

    #[test]
    fn chain_implication_is_satisfiable() {
        let mut f = Formula::new(3);
        f.add_clause(vec![lit(1), lit(-2)]).unwrap();
        f.add_clause(vec![lit(2), lit(-3)]).unwrap();
        f.add_clause(vec![lit(3), lit(-1)]).unwrap();

        let model = solve(&f).unwrap().expect("satisfiable");
        assert!(is_match(&f, &model));
    }

    #[test]
    fn contradiction_is_unsatisfiable() {
        let mut f = Formula::new(2);
        f.add_clause(vec![lit(1), lit(2)]).unwrap();
        f.add_clause(vec![lit(1), lit(-2)]).unwrap();
        f.add_clause(vec![lit(-1), lit(2)]).unwrap();
        f.add_clause(vec![lit(-1), lit(-2)]).unwrap();

        assert!(solve(&f).unwrap().is_none());
    }

    #[test]
    fn unit_clause_forces_value() {
        let mut f = Formula::new(1);
        f.add_clause(vec![lit(1)]).unwrap();
        let model = solve(&f).unwrap().expect("satisfiable");
        assert_eq!(model.values[0], Trit::True);
    }

    #[test]
    fn rejects_wider_clauses() {
        let mut f = Formula::new(3);
        f.add_clause(vec![lit(1), lit(2), lit(3)]).unwrap();
        assert!(solve(&f).is_err());
    }

    #[test]
    fn empty_formula_is_vacuously_satisfiable() {
        let f = Formula::new(0);
        let model = solve(&f).unwrap().expect("satisfiable");
        assert!(model.values.is_empty());
    }
}
