//! The partial model under construction during search: current variable
//! values, the order literals were assigned in (for backtracking), and the
//! priority heap used to pick the next branch literal.

use crate::sat::dpll::heap::{HeapSettings, PriorityHeap};
use crate::sat::formula::{Formula, Lit, Trit, Var};

pub struct Assignment {
    values: Vec<Trit>,
    trail: Vec<Lit>,
    heap: PriorityHeap,
}

impl Assignment {
    pub fn new(formula: &Formula, heap_settings: HeapSettings) -> Self {
        Assignment {
            values: vec![Trit::Unassigned; formula.variable_count],
            trail: Vec::new(),
            heap: PriorityHeap::new(formula, heap_settings),
        }
    }

    pub fn value_of(&self, var: Var) -> Trit {
        self.values[var.index()]
    }

    pub fn is_assigned(&self, var: Var) -> bool {
        self.value_of(var) != Trit::Unassigned
    }

    pub fn full(&self) -> bool {
        self.heap.is_empty()
    }

    /// The heap's current top, regardless of whether it is actually unassigned.
    pub fn request(&self) -> Option<Lit> {
        self.heap.get()
    }

    pub fn dec_prior(&mut self, lit: Lit) {
        self.heap.dec_prior(lit);
    }

    /// Records `lit` as true, extracting both of the variable's polarities
    /// from the heap so neither can be picked again while assigned.
    pub fn assign(&mut self, lit: Lit) {
        let var = lit.var();
        self.values[var.index()] = Trit::from_bool(!lit.sign());
        self.heap.extract(var.pos_lit());
        self.heap.extract(var.neg_lit());
        self.trail.push(lit);
    }

    /// Undoes the most recent assignment, which must be `lit`. Restores both
    /// polarities to the heap and decays the reverted literal's priority, so
    /// variables that led to conflicts are tried differently next time.
    pub fn revert(&mut self, lit: Lit) {
        debug_assert_eq!(self.trail.last().copied(), Some(lit));
        self.trail.pop();
        let var = lit.var();
        self.values[var.index()] = Trit::Unassigned;
        self.heap.restore(var.pos_lit());
        self.heap.restore(var.neg_lit());
        self.heap.dec_prior(lit);
    }

    pub fn state(&self) -> usize {
        self.trail.len()
    }

    pub fn restore_to(&mut self, state: usize) {
        while self.trail.len() > state {
            let lit = *self.trail.last().unwrap();
            self.revert(lit);
        }
    }

    pub fn trail(&self) -> &[Lit] {
        &self.trail
    }
}
