use std::collections::HashMap;

use crate::integral::Integral;

use super::term::{Factors, Term};

/// Index-based accumulator of terms. Terms with equal integral and factors share one slot and
/// their prefactors are summed exactly; slots keep first-insertion order.
#[derive(Debug)]
pub(crate) struct TermArena<const N: usize> {
    terms: Vec<Term<N>>,
    slots: HashMap<(Integral<N>, Factors), usize>,
}

impl<const N: usize> Default for TermArena<N> {
    fn default() -> Self {
        Self {
            terms: Vec::new(),
            slots: HashMap::new(),
        }
    }
}

impl<const N: usize> TermArena<N> {
    pub(crate) fn insert(&mut self, term: Term<N>) {
        match self.slots.get(&term.signature()) {
            Some(&slot) => {
                let merged = self.terms[slot].prefactor() + term.prefactor();
                self.terms[slot].set_prefactor(merged);
            }
            None => {
                self.slots.insert(term.signature(), self.terms.len());
                self.terms.push(term);
            }
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Empties the arena, returning the merged terms without exact zeros.
    pub(crate) fn drain(&mut self) -> Vec<Term<N>> {
        self.slots.clear();
        self.terms
            .drain(..)
            .filter(|term| !term.prefactor().is_zero())
            .collect()
    }
}

impl<const N: usize> FromIterator<Term<N>> for TermArena<N> {
    fn from_iter<I: IntoIterator<Item = Term<N>>>(iter: I) -> Self {
        let mut arena = Self::default();
        for term in iter {
            arena.insert(term);
        }
        arena
    }
}
