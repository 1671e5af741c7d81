use log::info;

pub mod error;
pub mod sat;
pub mod util;

pub use error::{Result, SolverError};
pub use sat::dpll::{DpllSolver, Settings as DpllSettings};
pub use sat::formula::{is_match, Formula, Lit, Match, Trit, Var};

/// Which engine to run a formula through. `Dpll` is complete and enumerates
/// every model; `TwoSat` and `BruteForce` are the supporting engines from
/// the ambient stack (the former restricted to 2-CNF, the latter exhaustive
/// and exponential).
pub enum Engine {
    Dpll(DpllSettings),
    TwoSat,
    BruteForce,
}

/// One-shot solve: runs `formula` through `engine` and returns the first
/// model found, or `None` if unsatisfiable.
pub fn solve_one(formula: &Formula, engine: Engine) -> Result<Option<Match>> {
    info!("solving: {} variables, {} clauses", formula.variable_count, formula.n_clauses());
    match engine {
        Engine::Dpll(settings) => Ok(sat::dpll::solve(formula, settings).next()),
        Engine::TwoSat => sat::two_sat::solve(formula),
        Engine::BruteForce => Ok(sat::brute_force::solve(formula).next()),
    }
}
