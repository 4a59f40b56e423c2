//! This module contains the DFA (Deterministic Finite Automaton) implementation.
//! A DFA is built once from caller-supplied components and never mutated afterwards. Operations
//! like minimization or completion return new instances.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use itertools::Itertools;
use log::{debug, trace};

use crate::{automaton::state_marker, Automaton, StateID};

/// The label prefix of the sink state that [`Dfa::complete_over`] adds.
const SINK_LABEL: &str = "∅";

/// A deterministic finite automaton.
///
/// The transition function may be partial. A missing transition rejects the input, it is not an
/// error. Completeness can be queried with [`Dfa::is_complete`].
#[derive(Debug, Clone)]
pub struct Dfa {
    // The state labels. A state's id is its position in this vector.
    pub(crate) states: Vec<String>,
    index: BTreeMap<String, StateID>,
    pub(crate) alphabet: BTreeSet<char>,
    pub(crate) start_state: StateID,
    pub(crate) accept_states: BTreeSet<StateID>,
    // Transitions on symbols outside the alphabet may be stored but are never taken.
    pub(crate) transitions: BTreeMap<(StateID, char), StateID>,
}

impl Dfa {
    /// Create a DFA from its five components.
    ///
    /// States are registered in the order given. Labels referenced by the start state, the
    /// accepting states or a transition but missing from `states` are registered as well.
    /// If a (source, symbol) pair occurs more than once, the last target wins.
    pub fn new<I, J, K, S1, S2, S3, S4>(
        states: I,
        alphabet: impl IntoIterator<Item = char>,
        start_state: &str,
        accept_states: J,
        transitions: K,
    ) -> Self
    where
        I: IntoIterator<Item = S1>,
        S1: AsRef<str>,
        J: IntoIterator<Item = S2>,
        S2: AsRef<str>,
        K: IntoIterator<Item = (S3, char, S4)>,
        S3: AsRef<str>,
        S4: AsRef<str>,
    {
        let mut dfa = Dfa {
            states: Vec::new(),
            index: BTreeMap::new(),
            alphabet: alphabet.into_iter().collect(),
            start_state: StateID::default(),
            accept_states: BTreeSet::new(),
            transitions: BTreeMap::new(),
        };
        for label in states {
            dfa.register(label.as_ref(), false);
        }
        dfa.start_state = dfa.register(start_state, true);
        for label in accept_states {
            let id = dfa.register(label.as_ref(), true);
            dfa.accept_states.insert(id);
        }
        for (source, symbol, target) in transitions {
            let from = dfa.register(source.as_ref(), true);
            let to = dfa.register(target.as_ref(), true);
            if !dfa.alphabet.contains(&symbol) {
                debug!(
                    "Transition {} -{}-> {} uses a symbol outside the alphabet",
                    source.as_ref(),
                    symbol,
                    target.as_ref()
                );
            }
            dfa.transitions.insert((from, symbol), to);
        }
        dfa
    }

    /// Create a DFA from a two-level transition table `state -> symbol -> state`.
    pub fn from_table<I, J, S1, S2>(
        states: I,
        alphabet: impl IntoIterator<Item = char>,
        start_state: &str,
        accept_states: J,
        table: &BTreeMap<String, BTreeMap<char, String>>,
    ) -> Self
    where
        I: IntoIterator<Item = S1>,
        S1: AsRef<str>,
        J: IntoIterator<Item = S2>,
        S2: AsRef<str>,
    {
        let transitions = table.iter().flat_map(|(source, row)| {
            row.iter()
                .map(move |(symbol, target)| (source.as_str(), *symbol, target.as_str()))
        });
        Dfa::new(states, alphabet, start_state, accept_states, transitions)
    }

    /// Assemble a DFA from already indexed parts. Every id must be a valid index into `states`.
    pub(crate) fn from_parts(
        states: Vec<String>,
        alphabet: BTreeSet<char>,
        start_state: StateID,
        accept_states: BTreeSet<StateID>,
        transitions: BTreeMap<(StateID, char), StateID>,
    ) -> Self {
        let index = states
            .iter()
            .enumerate()
            .map(|(i, label)| (label.clone(), StateID::new(i)))
            .collect();
        debug_assert!(start_state.as_usize() < states.len());
        debug_assert!(accept_states.iter().all(|s| s.as_usize() < states.len()));
        Dfa {
            states,
            index,
            alphabet,
            start_state,
            accept_states,
            transitions,
        }
    }

    fn register(&mut self, label: &str, implicit: bool) -> StateID {
        if let Some(id) = self.index.get(label) {
            return *id;
        }
        if implicit {
            debug!("Registering undeclared state '{}'", label);
        }
        let id = StateID::new(self.states.len());
        self.states.push(label.to_string());
        self.index.insert(label.to_string(), id);
        id
    }

    /// Get the id of the state with the given label.
    pub fn state_id(&self, label: &str) -> Option<StateID> {
        self.index.get(label).copied()
    }

    /// Get the label of a state.
    pub fn label(&self, id: StateID) -> &str {
        &self.states[id]
    }

    /// Get the labels of all states in registration order.
    pub fn states(&self) -> impl Iterator<Item = &str> {
        self.states.iter().map(String::as_str)
    }

    /// Get the id of the start state.
    pub fn start_id(&self) -> StateID {
        self.start_state
    }

    /// Get the ids of the accepting states.
    pub fn accept_ids(&self) -> &BTreeSet<StateID> {
        &self.accept_states
    }

    /// Get the labels of the accepting states.
    pub fn accept_states(&self) -> BTreeSet<&str> {
        self.accept_states.iter().map(|id| self.label(*id)).collect()
    }

    /// All stored transitions as `(source, symbol, target)` triples, ordered by source id and
    /// symbol.
    pub fn transitions(&self) -> Vec<(&str, char, &str)> {
        self.transitions
            .iter()
            .map(|((source, symbol), target)| (self.label(*source), *symbol, self.label(*target)))
            .collect()
    }

    /// Look up the target of the transition from the state labeled `label` on `symbol`.
    pub fn transition(&self, label: &str, symbol: char) -> Option<&str> {
        let state = self.state_id(label)?;
        self.step(state, symbol).map(|target| self.label(target))
    }

    /// Advance by one symbol. `None` if the symbol isn't in the alphabet or the transition is
    /// undefined.
    #[inline]
    pub fn step(&self, state: StateID, symbol: char) -> Option<StateID> {
        if !self.alphabet.contains(&symbol) {
            return None;
        }
        self.transitions.get(&(state, symbol)).copied()
    }

    /// Returns true if the transition function is total over states × alphabet.
    pub fn is_complete(&self) -> bool {
        (0..self.states.len())
            .cartesian_product(self.alphabet.iter())
            .all(|(state, symbol)| self.transitions.contains_key(&(StateID::new(state), *symbol)))
    }

    /// The states reachable from the start state, the start state included.
    pub fn reachable_states(&self) -> BTreeSet<StateID> {
        let mut reachable = BTreeSet::from([self.start_state]);
        let mut queue = VecDeque::from([self.start_state]);
        while let Some(state) = queue.pop_front() {
            for symbol in &self.alphabet {
                if let Some(target) = self.step(state, *symbol) {
                    if reachable.insert(target) {
                        queue.push_back(target);
                    }
                }
            }
        }
        reachable
    }

    /// Return a DFA without the states that can't be reached from the start state.
    /// The remaining states keep their labels and relative order.
    pub fn prune_unreachable(&self) -> Dfa {
        let reachable = self.reachable_states();
        if reachable.len() == self.states.len() {
            return self.clone();
        }
        debug!(
            "Pruning {} unreachable state(s)",
            self.states.len() - reachable.len()
        );
        let renumbered: BTreeMap<StateID, StateID> = reachable
            .iter()
            .enumerate()
            .map(|(i, old)| (*old, StateID::new(i)))
            .collect();
        let states = reachable
            .iter()
            .map(|id| self.label(*id).to_string())
            .collect();
        let accept_states = self
            .accept_states
            .iter()
            .filter_map(|id| renumbered.get(id).copied())
            .collect();
        let transitions = self
            .transitions
            .iter()
            .filter(|((_, symbol), _)| self.alphabet.contains(symbol))
            .filter_map(|((source, symbol), target)| {
                Some(((*renumbered.get(source)?, *symbol), *renumbered.get(target)?))
            })
            .collect();
        Dfa::from_parts(
            states,
            self.alphabet.clone(),
            renumbered[&self.start_state],
            accept_states,
            transitions,
        )
    }

    /// Return a DFA over the union of the own alphabet and `alphabet` whose transition function
    /// is total. Missing transitions lead to a new rejecting sink state, which is only added if
    /// at least one transition is missing.
    pub fn complete_over(&self, alphabet: &BTreeSet<char>) -> Dfa {
        let alphabet: BTreeSet<char> = self.alphabet.union(alphabet).copied().collect();
        let mut states = self.states.clone();
        let mut transitions = BTreeMap::new();
        let mut sink = None;
        for state in (0..self.states.len()).map(StateID::new) {
            for symbol in &alphabet {
                let target = match self.step(state, *symbol) {
                    Some(target) => target,
                    None => *sink.get_or_insert_with(|| {
                        let mut label = SINK_LABEL.to_string();
                        while self.index.contains_key(&label) {
                            label.push('\'');
                        }
                        states.push(label);
                        StateID::new(states.len() - 1)
                    }),
                };
                transitions.insert((state, *symbol), target);
            }
        }
        if let Some(sink) = sink {
            trace!("Completed with sink state {}", states[sink]);
            for symbol in &alphabet {
                transitions.insert((sink, *symbol), sink);
            }
        }
        Dfa::from_parts(
            states,
            alphabet,
            self.start_state,
            self.accept_states.clone(),
            transitions,
        )
    }

    /// Get a structural summary for display purposes.
    pub fn summary(&self) -> DfaSummary {
        DfaSummary {
            num_states: self.states.len(),
            num_accept_states: self.accept_states.len(),
            alphabet_size: self.alphabet.len(),
            num_transitions: self.transitions.len(),
            is_complete: self.is_complete(),
        }
    }
}

impl Automaton for Dfa {
    fn simulate(&self, input: &str) -> bool {
        let mut current_state = self.start_state;
        for c in input.chars() {
            match self.step(current_state, c) {
                Some(next_state) => {
                    trace!(
                        "{} -{}-> {}",
                        self.label(current_state),
                        c,
                        self.label(next_state)
                    );
                    current_state = next_state;
                }
                None => {
                    trace!("{} has no transition on '{}'", self.label(current_state), c);
                    return false;
                }
            }
        }
        self.accept_states.contains(&current_state)
    }

    fn num_states(&self) -> usize {
        self.states.len()
    }

    fn num_accept_states(&self) -> usize {
        self.accept_states.len()
    }

    fn alphabet(&self) -> BTreeSet<char> {
        self.alphabet.clone()
    }

    fn start_state(&self) -> &str {
        self.label(self.start_state)
    }

    fn is_accept_state(&self, label: &str) -> bool {
        self.state_id(label)
            .is_some_and(|id| self.accept_states.contains(&id))
    }
}

impl std::fmt::Display for Dfa {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "DFA")?;
        writeln!(f, "Alphabet: {}", self.alphabet.iter().join(", "))?;
        for (i, label) in self.states.iter().enumerate() {
            let id = StateID::new(i);
            let marker = state_marker(id == self.start_state, self.accept_states.contains(&id));
            let edges = self
                .transitions
                .range((id, '\0')..=(id, char::MAX))
                .map(|((_, symbol), target)| {
                    format!("{} -> {}", symbol.escape_default(), self.label(*target))
                })
                .join(", ");
            if edges.is_empty() {
                writeln!(f, "{} {}", marker, label)?;
            } else {
                writeln!(f, "{} {}: {}", marker, label, edges)?;
            }
        }
        Ok(())
    }
}

/// Structural facts about a DFA, meant for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DfaSummary {
    /// The number of states.
    pub num_states: usize,
    /// The number of accepting states.
    pub num_accept_states: usize,
    /// The number of symbols in the alphabet.
    pub alphabet_size: usize,
    /// The number of stored transitions.
    pub num_transitions: usize,
    /// True if the transition function is total over states × alphabet.
    pub is_complete: bool,
}
