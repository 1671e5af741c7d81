//! The DPLL engine: unit propagation, a VSIDS-like priority heap, and
//! chronological backtracking over a backtrackable clause database,
//! exposed as a lazy iterator over satisfying models.

pub mod assignment;
pub mod backtrack_list;
pub mod backtrack_skiplist;
pub mod clause_db;
pub mod heap;
pub mod search;

use log::info;

use crate::error::SolverError;
use crate::sat::formula::{Formula, Match};
use heap::HeapSettings;
use search::Search;

#[derive(Clone, Copy, Debug)]
pub struct Settings {
    pub heap: HeapSettings,
    /// Seeds the per-clause skiplist's layer-height coin flips (see
    /// `backtrack_skiplist::BacktrackSkiplist::new`); fixed by default so
    /// search order is reproducible across runs and under test.
    pub skiplist_seed: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Settings { heap: HeapSettings::default(), skiplist_seed: 0xC1A05E_u64 }
    }
}

/// Lazily enumerates every satisfying model of `formula`. Each call to
/// `next` resumes search from where the previous one left off; dropping the
/// iterator discards all internal stacks without touching anything else.
pub struct DpllSolver {
    search: Search,
    exhausted: bool,
}

pub fn solve(formula: &Formula, settings: Settings) -> DpllSolver {
    info!(
        "starting dpll search: {} variables, {} clauses",
        formula.variable_count,
        formula.n_clauses()
    );
    DpllSolver { search: Search::new(formula, settings), exhausted: false }
}

impl DpllSolver {
    /// Returns the next model, or `Ok(None)` once every model has been
    /// produced. Calling this again after exhaustion is a caller error.
    pub fn next(&mut self) -> Result<Option<Match>, SolverError> {
        if self.exhausted {
            return Err(SolverError::ProceedPastEnd);
        }
        match self.search.next() {
            Some(model) => Ok(Some(model)),
            None => {
                self.exhausted = true;
                Ok(None)
            }
        }
    }
}

impl Iterator for DpllSolver {
    type Item = Match;

    fn next(&mut self) -> Option<Match> {
        if self.exhausted {
            return None;
        }
        match self.search.next() {
            Some(model) => Some(model),
            None => {
                self.exhausted = true;
                None
            }
        }
    }
}
