//! The exhaustive enumerator: walks every assignment of `n` variables as a
//! binary counter seeded at all-True and counting down, testing each
//! against `is_match`. Grounded in the reference implementation's
//! "general" solver, whose name suggests a DPLL engine but which is in
//! fact this brute-force scan.

use crate::sat::formula::{is_match, Formula, Match, Trit};

pub fn solve(formula: &Formula) -> BruteForce<'_> {
    BruteForce { formula, pending: Some(vec![true; formula.variable_count]) }
}

pub struct BruteForce<'a> {
    formula: &'a Formula,
    pending: Option<Vec<bool>>,
}

impl<'a> Iterator for BruteForce<'a> {
    type Item = Match;

    fn next(&mut self) -> Option<Match> {
        loop {
            let candidate = self.pending.take()?;
            let next_candidate = decrement(&candidate);
            let m = to_match(&candidate);
            if is_match(self.formula, &m) {
                self.pending = next_candidate;
                return Some(m);
            }
            self.pending = next_candidate;
        }
    }
}

fn to_match(values: &[bool]) -> Match {
    Match { values: values.iter().map(|&b| Trit::from_bool(b)).collect() }
}

/// One step of the countdown: the lowest run of `false` bits is reset to
/// `true` (undoing the borrows from previous steps), and the first `true`
/// bit above that run is flipped to `false`. `None` once every bit has been
/// carried through, i.e. the all-`false` vector was just emitted.
fn decrement(values: &[bool]) -> Option<Vec<bool>> {
    let mut next = values.to_vec();
    let n = next.len();
    let mut idx = 0;
    while idx < n && !next[idx] {
        next[idx] = true;
        idx += 1;
    }
    if idx == n {
        return None;
    }
    next[idx] = false;
    Some(next)
}
