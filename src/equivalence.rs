//! This module contains the language equivalence check for DFAs.
//! Both DFAs are run in lockstep with a breadth-first search over the reachable part of their
//! product automaton. Missing transitions lead to an implicit rejecting sink, represented by
//! `None` in a product state, and both alphabets are merged. Partial DFAs and DFAs over different
//! alphabets are therefore compared by the languages they accept.

use std::collections::{btree_map::Entry, BTreeMap, BTreeSet, VecDeque};

use log::{debug, trace};

use crate::{Dfa, StateID};

// A position in the product automaton. `None` is the implicit sink of the respective DFA.
type ProductState = (Option<StateID>, Option<StateID>);

// Maps each visited product state to the product state and symbol it was first reached from.
type Predecessors = BTreeMap<ProductState, Option<(ProductState, char)>>;

impl Dfa {
    /// Returns true if both DFAs accept the same language.
    pub fn is_equivalent(&self, other: &Dfa) -> bool {
        self.find_counterexample(other).is_none()
    }

    /// Search a shortest word that one DFA accepts and the other rejects.
    /// Among words of equal length the search prefers smaller symbols first.
    pub fn find_counterexample(&self, other: &Dfa) -> Option<String> {
        let alphabet: BTreeSet<char> = self.alphabet.union(&other.alphabet).copied().collect();
        let start: ProductState = (Some(self.start_state), Some(other.start_state));
        let mut predecessors = Predecessors::from([(start, None)]);
        let mut queue = VecDeque::from([start]);

        while let Some(pair) = queue.pop_front() {
            if self.accepts_in(pair.0) != other.accepts_in(pair.1) {
                let word = Self::word_to(&predecessors, pair);
                debug!(
                    "DFAs differ on '{}' after visiting {} product states",
                    word.escape_default(),
                    predecessors.len()
                );
                return Some(word);
            }
            // Both sinks reject everything from here on.
            if pair == (None, None) {
                continue;
            }
            for symbol in &alphabet {
                let next: ProductState = (
                    pair.0.and_then(|state| self.step(state, *symbol)),
                    pair.1.and_then(|state| other.step(state, *symbol)),
                );
                if let Entry::Vacant(entry) = predecessors.entry(next) {
                    trace!("{:?} -{}-> {:?}", pair, symbol, next);
                    entry.insert(Some((pair, *symbol)));
                    queue.push_back(next);
                }
            }
        }
        debug!(
            "DFAs are equivalent, {} product states visited",
            predecessors.len()
        );
        None
    }

    fn accepts_in(&self, state: Option<StateID>) -> bool {
        state.is_some_and(|state| self.accept_states.contains(&state))
    }

    // Follow the predecessor links back to the start and spell the word on the way.
    fn word_to(predecessors: &Predecessors, target: ProductState) -> String {
        let mut symbols = Vec::new();
        let mut current = target;
        while let Some(Some((previous, symbol))) = predecessors.get(&current) {
            symbols.push(*symbol);
            current = *previous;
        }
        symbols.into_iter().rev().collect()
    }
}
