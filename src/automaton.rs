use std::collections::BTreeSet;

/// The read-only query surface shared by [`crate::Dfa`] and [`crate::Nfa`].
///
/// Acceptance is a total function of the automaton and the input. A symbol the automaton can't
/// process leads to rejection, never to an error.
pub trait Automaton {
    /// Returns true if the automaton accepts the whole input.
    fn simulate(&self, input: &str) -> bool;

    /// The number of states.
    fn num_states(&self) -> usize;

    /// The number of accepting states.
    fn num_accept_states(&self) -> usize;

    /// The input symbols of the automaton. For an NFA this is derived from its non-ε transitions.
    fn alphabet(&self) -> BTreeSet<char>;

    /// The label of the start state.
    fn start_state(&self) -> &str;

    /// Returns true if the state with the given label exists and is accepting.
    fn is_accept_state(&self, label: &str) -> bool;
}

/// Run the automaton on the input and report acceptance.
pub fn simulate<A: Automaton + ?Sized>(automaton: &A, input: &str) -> bool {
    automaton.simulate(input)
}

// The prefix of a state line in the textual rendering: `->` marks the start state, `*` an
// accepting state.
pub(crate) fn state_marker(is_start: bool, is_accepting: bool) -> &'static str {
    match (is_start, is_accepting) {
        (true, true) => "->*",
        (true, false) => "-> ",
        (false, true) => "  *",
        (false, false) => "   ",
    }
}
