#![forbid(missing_docs)]
//! The `finautomata` crate provides the core algorithms of finite automata theory.
//! DFAs and NFAs can be simulated on input strings, regular expressions are compiled into NFAs
//! with Thompson's construction, DFAs are minimized by partition refinement and two DFAs can be
//! checked for language equivalence.

/// Module that provides the state id type used by both automaton kinds.
mod ids;
pub use ids::StateID;

/// Module with error definitions
mod errors;
pub use errors::{RegexCompileError, RegexErrorKind, Result};

/// Module with the query surface common to DFAs and NFAs.
mod automaton;
pub use automaton::{simulate, Automaton};

/// The dfa module contains the DFA type and its simulation.
mod dfa;
pub use dfa::{Dfa, DfaSummary};

/// The nfa module contains the NFA type and its simulation.
mod nfa;
pub use nfa::{Nfa, NfaSummary, StateSet};

/// The regex_compiler module contains the regex to NFA compiler.
mod regex_compiler;
pub use regex_compiler::compile_regex;

/// Module with the DFA minimization.
mod minimize;

/// Module with the DFA equivalence check.
mod equivalence;

/// Module with the conversion from NFA to DFA.
mod subset_construction;

#[cfg(test)]
mod test_support;

/// Minimize the DFA. The input is left untouched.
pub fn minimize(dfa: &Dfa) -> Dfa {
    dfa.minimize()
}

/// Returns true if both DFAs accept the same language.
pub fn is_equivalent(first: &Dfa, second: &Dfa) -> bool {
    first.is_equivalent(second)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::init;

    #[test]
    fn test_free_functions() {
        init();
        let nfa = compile_regex("(a|b)*abb").unwrap();
        let dfa = Dfa::from(&nfa);
        let minimized_dfa = minimize(&dfa);
        assert_eq!(minimized_dfa.num_states(), 4);
        assert!(is_equivalent(&dfa, &minimized_dfa));
        assert!(!is_equivalent(&minimized_dfa, &Dfa::from(&compile_regex("abb").unwrap())));

        assert!(simulate(&nfa, "babb"));
        assert!(simulate(&minimized_dfa, "aabb"));
        assert!(!simulate(&minimized_dfa, "abba"));
        // Through a trait object
        let automaton: &dyn Automaton = &minimized_dfa;
        assert!(simulate(automaton, "abb"));
    }
}
