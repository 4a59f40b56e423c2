//! Subset construction for converting an NFA into a DFA.
//! Each DFA state stands for the ε-closed set of NFA states the NFA can be in after reading the
//! same input. Empty target sets are not materialized, so the resulting DFA may be partial.

use std::collections::{BTreeMap, VecDeque};

use itertools::Itertools;
use log::{debug, trace};

use crate::{nfa::StateSet, Automaton, Dfa, Nfa, StateID};

impl From<&Nfa> for Dfa {
    fn from(nfa: &Nfa) -> Self {
        let alphabet = nfa.alphabet();
        let mut subsets: Vec<StateSet> = Vec::new();
        let mut subset_ids: BTreeMap<StateSet, StateID> = BTreeMap::new();
        let mut transitions = BTreeMap::new();
        // The work list holds the DFA states whose transitions still need to be computed.
        let mut work_list = VecDeque::new();

        let start_state = add_state_if_new(
            nfa.epsilon_closure([nfa.start_id()]),
            &mut subsets,
            &mut subset_ids,
            &mut work_list,
        );
        while let Some(state) = work_list.pop_front() {
            let nfa_states = subsets[state].clone();
            for symbol in &alphabet {
                let target_states = nfa.epsilon_closure(nfa.move_set(&nfa_states, *symbol));
                if !target_states.is_empty() {
                    let target_state = add_state_if_new(
                        target_states,
                        &mut subsets,
                        &mut subset_ids,
                        &mut work_list,
                    );
                    transitions.insert((state, *symbol), target_state);
                }
            }
        }

        let accept_states = subsets
            .iter()
            .enumerate()
            .filter(|(_, set)| !set.is_disjoint(nfa.accept_ids()))
            .map(|(i, _)| StateID::new(i))
            .collect();
        let states: Vec<String> = (0..subsets.len()).map(|i| format!("D{}", i)).collect();
        debug!(
            "Subset construction created {} DFA states from {} NFA states",
            states.len(),
            nfa.num_states()
        );
        Dfa::from_parts(states, alphabet, start_state, accept_states, transitions)
    }
}

/// Add a DFA state for the given set of NFA states if the set wasn't seen before.
/// New states are queued on the work list. The id of the DFA state is returned.
fn add_state_if_new(
    nfa_states: StateSet,
    subsets: &mut Vec<StateSet>,
    subset_ids: &mut BTreeMap<StateSet, StateID>,
    work_list: &mut VecDeque<StateID>,
) -> StateID {
    if let Some(id) = subset_ids.get(&nfa_states) {
        return *id;
    }
    let id = StateID::new(subsets.len());
    trace!("D{} = {{{}}}", id, nfa_states.iter().join(", "));
    subset_ids.insert(nfa_states.clone(), id);
    subsets.push(nfa_states);
    work_list.push_back(id);
    id
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compile_regex;
    use crate::test_support::{init, words_up_to};

    fn dfa_of(pattern: &str) -> Dfa {
        Dfa::from(&compile_regex(pattern).unwrap())
    }

    #[test]
    fn test_dfa_from_regex_nfa() {
        init();
        let nfa = compile_regex("(a|b)*abb").unwrap();
        let dfa = Dfa::from(&nfa);
        assert_eq!(dfa.start_state(), "D0");
        assert!(dfa.is_complete());
        for word in words_up_to(&['a', 'b'], 6) {
            assert_eq!(nfa.simulate(&word), dfa.simulate(&word), "'{}'", word);
        }

        let minimized_dfa = dfa.minimize();
        assert_eq!(minimized_dfa.num_states(), 4);
        assert_eq!(minimized_dfa.num_accept_states(), 1);
    }

    #[test]
    fn test_dfa_from_empty_pattern() {
        let dfa = dfa_of("");
        assert_eq!(dfa.num_states(), 1);
        assert!(dfa.simulate(""));
        assert!(dfa.alphabet().is_empty());
        assert!(dfa.transitions().is_empty());
    }

    #[test]
    fn test_dfa_is_partial_where_nfa_is_stuck() {
        let dfa = dfa_of("ab");
        assert!(!dfa.is_complete());
        assert_eq!(dfa.num_states(), 3);
        assert!(dfa.simulate("ab"));
        assert!(!dfa.simulate("ba"));
    }

    #[test]
    fn test_dfa_from_nfa_without_transitions() {
        let nfa = Nfa::new("s");
        assert_eq!(nfa.start_state(), "s");
        let dfa = Dfa::from(&nfa);
        assert_eq!(dfa.num_states(), 1);
        assert_eq!(dfa.start_state(), "D0");
        assert!(!dfa.simulate(""));
        assert!(!dfa.simulate("a"));
    }

    #[test]
    fn test_compare_patterns() {
        init();
        assert!(dfa_of("a|b").is_equivalent(&dfa_of("b|a")));
        assert!(dfa_of("a*").is_equivalent(&dfa_of("(a*)*")));
        assert!(dfa_of("(a|b)*").is_equivalent(&dfa_of("(a*b*)*")));
        assert!(dfa_of("a(b|a)*").is_equivalent(&dfa_of("a(a*b*)*")));
        assert!(!dfa_of("ab").is_equivalent(&dfa_of("ba")));
        assert_eq!(
            dfa_of("a*").find_counterexample(&dfa_of("aa*")),
            Some(String::new())
        );
    }
}
