//! This module contains the NFA (Non-deterministic Finite Automaton) implementation.
//! NFAs are produced by the regex compiler and simulated directly with an on-the-fly subset
//! construction over ε-closures.

use std::collections::{BTreeMap, BTreeSet};

use itertools::Itertools;
use log::trace;

use crate::{automaton::state_marker, Automaton, StateID};

/// A set of NFA states. Sets of this type are the "current position" of an NFA simulation.
pub type StateSet = BTreeSet<StateID>;

/// A non-deterministic finite automaton with ε-transitions.
///
/// The transition relation is built incrementally with [`Nfa::add_transition`], which unions the
/// new destination into the existing ones and registers unknown states on the fly.
#[derive(Debug, Clone)]
pub struct Nfa {
    states: Vec<NfaState>,
    // Maps state labels to their position in `states`.
    index: BTreeMap<String, StateID>,
    start_state: StateID,
    accept_states: StateSet,
}

impl Nfa {
    /// Create an NFA that consists of its start state only.
    pub fn new(start_state: &str) -> Self {
        let mut nfa = Nfa::blank();
        nfa.start_state = nfa.add_state(start_state);
        nfa
    }

    // An NFA without any state. The start state has to be registered before the NFA leaves the
    // crate.
    pub(crate) fn blank() -> Self {
        Self {
            states: Vec::new(),
            index: BTreeMap::new(),
            start_state: StateID::default(),
            accept_states: StateSet::new(),
        }
    }

    /// Register a state and return its id. An already known label returns the existing id.
    pub fn add_state(&mut self, label: &str) -> StateID {
        if let Some(id) = self.index.get(label) {
            return *id;
        }
        self.push_state(label.to_string())
    }

    // Registers a state that is known to be new. The regex compiler guarantees this through its
    // state counter.
    pub(crate) fn push_state(&mut self, label: String) -> StateID {
        let id = StateID::new(self.states.len());
        debug_assert!(!self.index.contains_key(&label));
        self.index.insert(label.clone(), id);
        self.states.push(NfaState::new(label));
        id
    }

    /// Add a transition from `src` to `dest`. `None` as symbol denotes an ε-transition.
    pub fn add_transition(&mut self, src: &str, symbol: Option<char>, dest: &str) {
        let from = self.add_state(src);
        let to = self.add_state(dest);
        self.link(from, symbol, to);
    }

    /// Add an ε-transition from `src` to `dest`.
    pub fn add_epsilon_transition(&mut self, src: &str, dest: &str) {
        self.add_transition(src, None, dest);
    }

    pub(crate) fn link(&mut self, from: StateID, symbol: Option<char>, to: StateID) {
        let state = &mut self.states[from];
        match symbol {
            Some(c) => {
                state.transitions.entry(c).or_default().insert(to);
            }
            None => {
                state.epsilon_transitions.insert(to);
            }
        }
    }

    /// Mark the state with the given label as accepting. The state is registered if necessary.
    pub fn add_accept_state(&mut self, label: &str) {
        let id = self.add_state(label);
        self.accept_states.insert(id);
    }

    /// Make the state with the given label the start state. The state is registered if necessary.
    pub fn set_start_state(&mut self, label: &str) {
        self.start_state = self.add_state(label);
    }

    pub(crate) fn set_start_id(&mut self, id: StateID) {
        self.start_state = id;
    }

    pub(crate) fn set_accept_ids(&mut self, accept_states: StateSet) {
        self.accept_states = accept_states;
    }

    /// Get the id of the state with the given label.
    pub fn state_id(&self, label: &str) -> Option<StateID> {
        self.index.get(label).copied()
    }

    /// Get the label of a state.
    pub fn label(&self, id: StateID) -> &str {
        &self.states[id].label
    }

    /// Get the labels of all states in the order they were registered.
    pub fn states(&self) -> impl Iterator<Item = &str> {
        self.states.iter().map(|s| s.label.as_str())
    }

    /// Get the id of the start state.
    pub fn start_id(&self) -> StateID {
        self.start_state
    }

    /// Get the ids of the accepting states.
    pub fn accept_ids(&self) -> &StateSet {
        &self.accept_states
    }

    /// Get the labels of the accepting states.
    pub fn accept_states(&self) -> BTreeSet<&str> {
        self.accept_states.iter().map(|id| self.label(*id)).collect()
    }

    /// All transitions as `(source, symbol, target)` triples, ε-transitions first per state.
    pub fn transitions(&self) -> Vec<(&str, Option<char>, &str)> {
        let mut transitions = Vec::new();
        for state in &self.states {
            for target in &state.epsilon_transitions {
                transitions.push((state.label.as_str(), None, self.label(*target)));
            }
            for (c, targets) in &state.transitions {
                for target in targets {
                    transitions.push((state.label.as_str(), Some(*c), self.label(*target)));
                }
            }
        }
        transitions
    }

    /// Returns true if at least one ε-transition exists.
    pub fn has_epsilon(&self) -> bool {
        self.states
            .iter()
            .any(|state| !state.epsilon_transitions.is_empty())
    }

    /// The smallest superset of `states` that is closed under ε-transitions.
    pub fn epsilon_closure<I>(&self, states: I) -> StateSet
    where
        I: IntoIterator<Item = StateID>,
    {
        let mut closure = StateSet::new();
        let mut stack = Vec::new();
        for state in states {
            if closure.insert(state) {
                stack.push(state);
            }
        }
        while let Some(state) = stack.pop() {
            for next in &self.states[state].epsilon_transitions {
                if closure.insert(*next) {
                    stack.push(*next);
                }
            }
        }
        closure
    }

    /// The states reachable from any state in `states` by exactly one transition on `symbol`.
    /// No ε-closure is applied.
    pub fn move_set(&self, states: &StateSet, symbol: char) -> StateSet {
        states
            .iter()
            .filter_map(|state| self.states[*state].transitions.get(&symbol))
            .flatten()
            .copied()
            .collect()
    }

    /// Get a structural summary for display purposes.
    pub fn summary(&self) -> NfaSummary {
        NfaSummary {
            num_states: self.states.len(),
            num_accept_states: self.accept_states.len(),
            alphabet_size: self.alphabet().len(),
            num_transitions: self.transitions().len(),
            has_epsilon: self.has_epsilon(),
        }
    }
}

impl Automaton for Nfa {
    fn simulate(&self, input: &str) -> bool {
        let mut current_states = self.epsilon_closure([self.start_state]);
        for c in input.chars() {
            current_states = self.epsilon_closure(self.move_set(&current_states, c));
            trace!("'{}' -> {{{}}}", c, current_states.iter().join(", "));
            if current_states.is_empty() {
                return false;
            }
        }
        !current_states.is_disjoint(&self.accept_states)
    }

    fn num_states(&self) -> usize {
        self.states.len()
    }

    fn num_accept_states(&self) -> usize {
        self.accept_states.len()
    }

    fn alphabet(&self) -> BTreeSet<char> {
        self.states
            .iter()
            .flat_map(|state| state.transitions.keys().copied())
            .collect()
    }

    fn start_state(&self) -> &str {
        self.label(self.start_state)
    }

    fn is_accept_state(&self, label: &str) -> bool {
        self.state_id(label)
            .is_some_and(|id| self.accept_states.contains(&id))
    }
}

impl std::fmt::Display for Nfa {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "NFA")?;
        for (i, state) in self.states.iter().enumerate() {
            let id = StateID::new(i);
            let marker = state_marker(id == self.start_state, self.accept_states.contains(&id));
            let edges = state
                .epsilon_transitions
                .iter()
                .map(|target| format!("ε -> {}", self.label(*target)))
                .chain(state.transitions.iter().flat_map(|(c, targets)| {
                    targets.iter().map(move |target| {
                        format!("{} -> {}", c.escape_default(), self.label(*target))
                    })
                }))
                .join(", ");
            if edges.is_empty() {
                writeln!(f, "{} {}", marker, state.label)?;
            } else {
                writeln!(f, "{} {}: {}", marker, state.label, edges)?;
            }
        }
        Ok(())
    }
}

/// Structural facts about an NFA, meant for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NfaSummary {
    /// The number of states.
    pub num_states: usize,
    /// The number of accepting states.
    pub num_accept_states: usize,
    /// The number of distinct non-ε symbols on transitions.
    pub alphabet_size: usize,
    /// The number of (source, symbol, target) edges, ε-edges included.
    pub num_transitions: usize,
    /// True if the NFA has at least one ε-transition.
    pub has_epsilon: bool,
}

#[derive(Debug, Clone)]
struct NfaState {
    label: String,
    transitions: BTreeMap<char, StateSet>,
    epsilon_transitions: StateSet,
}

impl NfaState {
    fn new(label: String) -> Self {
        Self {
            label,
            transitions: BTreeMap::new(),
            epsilon_transitions: StateSet::new(),
        }
    }
}
