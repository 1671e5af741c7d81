use std::num::NonZeroI32;
use std::{fmt, ops};

use crate::error::SolverError;


/// A 0-indexed problem variable. `Var::from_index(0)` is x₁ in the external,
/// 1-based DIMACS numbering.
#[derive(PartialEq, Eq, PartialOrd, Ord, Copy, Clone, Hash)]
pub struct Var(u32);

impl Var {
    #[inline]
    pub fn from_index(index: usize) -> Var {
        assert!(index <= (i32::max_value() - 1) as usize, "variable index out of range");
        Var(index as u32)
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub fn pos_lit(self) -> Lit {
        Lit::new((self.0 as i32) + 1)
    }

    #[inline]
    pub fn neg_lit(self) -> Lit {
        Lit::new(-((self.0 as i32) + 1))
    }
}

impl fmt::Debug for Var {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "x{}", self.0 + 1)
    }
}


/// A signed, nonzero DIMACS-style literal: `+k` asserts `x_k`, `-k` its negation.
#[derive(PartialEq, Eq, PartialOrd, Ord, Copy, Clone, Hash)]
pub struct Lit(NonZeroI32);

impl Lit {
    #[inline]
    pub fn new(id: i32) -> Lit {
        Lit(NonZeroI32::new(id).expect("literal id must be nonzero"))
    }

    #[inline]
    pub fn get(self) -> i32 {
        self.0.get()
    }

    /// `true` for a negative literal (¬x).
    #[inline]
    pub fn sign(self) -> bool {
        self.0.get() < 0
    }

    #[inline]
    pub fn var(self) -> Var {
        Var((self.0.get().abs() - 1) as u32)
    }

    /// Slot in a `2n`-wide array split into a positive half `[0, n)` and a
    /// negative half `[n, 2n)`; adding `n` modulo `2n` flips polarity. Used by
    /// the priority heap and the 2-SAT implication graph.
    #[inline]
    pub fn slot(self, n: usize) -> usize {
        if self.sign() {
            n + self.var().index()
        } else {
            self.var().index()
        }
    }
}

impl ops::Not for Lit {
    type Output = Lit;

    #[inline]
    fn not(self) -> Lit {
        Lit::new(-self.0.get())
    }
}

impl fmt::Debug for Lit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.sign() {
            write!(f, "-")?;
        }
        write!(f, "{}", self.var().index() + 1)
    }
}


/// Ternary variable value.
#[derive(PartialEq, Eq, PartialOrd, Ord, Copy, Clone, Debug)]
pub enum Trit {
    False,
    True,
    Unassigned,
}

impl Trit {
    #[inline]
    pub fn from_bool(b: bool) -> Trit {
        if b { Trit::True } else { Trit::False }
    }
}


/// A CNF formula: a variable count plus a sequence of clauses, each a
/// sequence of nonzero signed literals.
#[derive(Clone, Debug)]
pub struct Formula {
    pub variable_count: usize,
    pub clauses: Vec<Vec<Lit>>,
}

impl Formula {
    pub fn new(variable_count: usize) -> Self {
        Formula { variable_count, clauses: Vec::new() }
    }

    /// Validates and appends a clause. Rejects empty clauses, the zero
    /// literal (unrepresentable, but checked anyway for caller ids that
    /// slipped past `Lit::new`'s panic), and literals outside `1..=variable_count`.
    pub fn add_clause(&mut self, lits: Vec<Lit>) -> Result<(), SolverError> {
        if lits.is_empty() {
            return Err(SolverError::MalformedFormula { reason: "empty clause".to_string() });
        }
        for &lit in &lits {
            let idx = lit.var().index();
            if idx >= self.variable_count {
                return Err(SolverError::MalformedFormula {
                    reason: format!(
                        "literal {:?} refers to a variable beyond the declared count {}",
                        lit, self.variable_count
                    ),
                });
            }
        }
        self.clauses.push(lits);
        Ok(())
    }

    pub fn n_clauses(&self) -> usize {
        self.clauses.len()
    }
}


/// A full or partial model: one ternary value per variable, in variable order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Match {
    pub values: Vec<Trit>,
}

impl Match {
    pub fn unassigned(variable_count: usize) -> Self {
        Match { values: vec![Trit::Unassigned; variable_count] }
    }

    pub fn is_complete(&self) -> bool {
        self.values.iter().all(|v| *v != Trit::Unassigned)
    }
}


/// Every clause has at least one literal that agrees with `m`; false if the
/// variable counts disagree or `m` is not fully assigned.
pub fn is_match(formula: &Formula, m: &Match) -> bool {
    if m.values.len() != formula.variable_count {
        return false;
    }
    if !m.is_complete() {
        return false;
    }

    formula.clauses.iter().all(|clause| {
        clause.iter().any(|&lit| {
            let val = m.values[lit.var().index()];
            (val == Trit::True && !lit.sign()) || (val == Trit::False && lit.sign())
        })
    })
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lit_roundtrip() {
        let v = Var::from_index(4);
        let pv = v.pos_lit();
        let nv = v.neg_lit();
        assert_eq!(pv.var(), v);
        assert_eq!(nv.var(), v);
        assert!(!pv.sign());
        assert!(nv.sign());
        assert_eq!(!pv, nv);
        assert_eq!(!nv, pv);
    }

    #[test]
    fn lit_slot_splits_halves() {
        let n = 7;
        let v = Var::from_index(2);
        assert_eq!(v.pos_lit().slot(n), 2);
        assert_eq!(v.neg_lit().slot(n), n + 2);
    }

    #[test]
    fn is_match_requires_full_assignment() {
        let mut f = Formula::new(2);
        f.add_clause(vec![Lit::new(1), Lit::new(2)]).unwrap();
        let mut m = Match::unassigned(2);
        assert!(!is_match(&f, &m));
        m.values[0] = Trit::True;
        m.values[1] = Trit::False;
        assert!(is_match(&f, &m));
        m.values[0] = Trit::False;
        m.values[1] = Trit::False;
        assert!(!is_match(&f, &m));
    }
}
