//! The search driver: a stack of decision frames, each walking through
//! TryPositive -> TryNegative -> Done while unit propagation and
//! chronological backtracking do the rest.

use log::debug;

use crate::sat::dpll::assignment::Assignment;
use crate::sat::dpll::clause_db::ClauseDb;
use crate::sat::dpll::Settings;
use crate::sat::formula::{Formula, Lit, Match, Var};

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
enum Next {
    TryPositive,
    TryNegative,
    Done,
}

struct Frame {
    /// Signed DIMACS-style literal id; 0 marks a completed-model frame.
    branch_literal: i32,
    next: Next,
    assignment_snapshot: usize,
    database_snapshot: usize,
}

pub struct Search {
    assignment: Assignment,
    database: ClauseDb,
    variable_count: usize,
    stack: Vec<Frame>,
    started: bool,
    decisions: u64,
    backtracks: u64,
}

impl Search {
    pub fn new(formula: &Formula, settings: Settings) -> Self {
        Search {
            assignment: Assignment::new(formula, settings.heap),
            database: ClauseDb::new(formula, settings.skiplist_seed),
            variable_count: formula.variable_count,
            stack: Vec::new(),
            started: false,
            decisions: 0,
            backtracks: 0,
        }
    }

    /// Advances to the next satisfying model, or `None` once the search
    /// space is exhausted.
    pub fn next(&mut self) -> Option<Match> {
        if !self.started {
            self.started = true;
            self.push_frame();
        } else {
            // The previous call left a completed-model frame on top; it
            // must be popped (and its parent's branch advanced) before the
            // same model can be reported twice.
            if matches!(self.stack.last(), Some(f) if f.branch_literal == 0) {
                self.close_top_frame();
            }
        }

        loop {
            let next = match self.stack.last() {
                Some(f) if f.branch_literal == 0 => return Some(self.current_model()),
                Some(f) => f.next,
                None => return None,
            };

            match next {
                Next::TryPositive => {
                    let lit = self.stack.last().unwrap().branch_literal;
                    self.attempt(lit);
                }
                Next::TryNegative => {
                    let lit = -self.stack.last().unwrap().branch_literal;
                    self.attempt(lit);
                }
                Next::Done => self.close_top_frame(),
            }
        }
    }

    /// Tries propagating `signed_literal` from the current top frame. On
    /// success, pushes the child frame (possibly a completed-model frame).
    /// On conflict, rewinds the frame's own snapshot and moves its state on.
    fn attempt(&mut self, signed_literal: i32) {
        match self.propagate(signed_literal) {
            Ok(()) => self.push_frame(),
            Err(()) => self.advance_current(),
        }
    }

    /// Runs propagation seeded at `signed_literal` (0 only ever terminates
    /// the loop immediately, and is never passed as a seed by `attempt`)
    /// until saturation or conflict, draining the unit-clause set between
    /// steps.
    fn propagate(&mut self, signed_literal: i32) -> Result<(), ()> {
        let mut lit = signed_literal;
        loop {
            if lit == 0 {
                return Ok(());
            }
            let literal = Lit::new(lit);
            if self.database.assign(literal).is_err() {
                return Err(());
            }
            self.assignment.assign(literal);
            lit = match self.database.drain_unit() {
                Some(next) => next.get(),
                None => 0,
            };
        }
    }

    /// Rewinds the top frame to its own pre-attempt snapshot and advances
    /// its state machine. Called both right after a failed attempt and
    /// after a child subtree (or a completed-model leaf) has been fully
    /// explored and popped.
    fn advance_current(&mut self) {
        let (assignment_snapshot, database_snapshot) = {
            let frame = self.stack.last_mut().unwrap();
            frame.next = match frame.next {
                Next::TryPositive => Next::TryNegative,
                Next::TryNegative => Next::Done,
                Next::Done => Next::Done,
            };
            (frame.assignment_snapshot, frame.database_snapshot)
        };
        self.assignment.restore_to(assignment_snapshot);
        self.database.restore_to(database_snapshot);
        self.backtracks += 1;
        if self.backtracks % 1000 == 0 {
            debug!("backtracks: {}, decisions: {}, depth: {}", self.backtracks, self.decisions, self.stack.len());
        }
    }

    fn close_top_frame(&mut self) {
        self.stack.pop();
        if !self.stack.is_empty() {
            self.advance_current();
        }
    }

    /// Captures the current state as a fresh frame's snapshot and picks its
    /// branch literal from the heap top; 0 if none remain, which marks a
    /// completed model rather than a further decision.
    fn push_frame(&mut self) {
        let assignment_snapshot = self.assignment.state();
        let database_snapshot = self.database.state();
        let branch_literal = match self.assignment.request() {
            Some(lit) => lit.get(),
            None => 0,
        };
        if branch_literal != 0 {
            self.decisions += 1;
        }
        self.stack.push(Frame {
            branch_literal,
            next: Next::TryPositive,
            assignment_snapshot,
            database_snapshot,
        });
    }

    /// Only called for a completed-model frame, whose branch literal is 0
    /// precisely because the heap ran dry - i.e. every variable is assigned.
    fn current_model(&self) -> Match {
        let values = (0..self.variable_count)
            .map(|i| self.assignment.value_of(Var::from_index(i)))
            .collect();
        Match { values }
    }
}
