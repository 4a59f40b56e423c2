//! This module contains the regex compiler.
//! A pattern is translated into an NFA with Thompson's construction. The supported syntax is
//! literal symbols, implicit concatenation, alternation with `|`, the Kleene star `*` and
//! grouping with parentheses.
//!
//! Precedence from weakest to strongest binding: alternation, concatenation, star.
//! The star applies to the single symbol or the parenthesized group in front of it.

use std::time::Instant;

use log::{debug, trace};

use crate::{nfa::StateSet, Automaton, Nfa, RegexCompileError, RegexErrorKind, Result, StateID};

type ParseResult<T> = std::result::Result<T, RegexErrorKind>;

/// Compile a pattern into an NFA.
/// # Arguments
/// * `pattern` - The regular expression. The empty pattern matches the empty string only.
/// # Returns
/// An NFA whose states are named `q0`, `q1`, ... in order of creation.
/// # Errors
/// An error is returned for unbalanced parentheses, empty subexpressions and misplaced stars.
pub fn compile_regex(pattern: &str) -> Result<Nfa> {
    let now = Instant::now();
    let symbols: Vec<char> = pattern.chars().collect();
    let mut compiler = Compiler::new(&symbols);
    let fragment = if symbols.is_empty() {
        compiler.empty()
    } else {
        compiler
            .parse()
            .map_err(|kind| RegexCompileError::new(pattern, kind))?
    };
    let nfa = compiler.finish(fragment);
    trace!(
        "Compiling the regex took {} milliseconds.",
        now.elapsed().as_millis()
    );
    debug!(
        "Compiled '{}' into an NFA with {} states",
        pattern.escape_default(),
        nfa.num_states()
    );
    Ok(nfa)
}

// A partial NFA inside the compiler's arena: an entry state and the states that accept.
#[derive(Debug)]
struct Fragment {
    start_state: StateID,
    accept_states: StateSet,
}

// A group under construction. The top level of the pattern is a group without parenthesis.
#[derive(Debug)]
struct Group {
    // The position of the opening parenthesis
    open: Option<usize>,
    // Where the current alternative begins
    alternative_start: usize,
    // The union of the alternatives completed so far
    alternatives: Option<Fragment>,
    // The concatenation of the current alternative, without its last atom
    sequence: Option<Fragment>,
    last: Option<Fragment>,
}

impl Group {
    fn new(open: Option<usize>, alternative_start: usize) -> Self {
        Self {
            open,
            alternative_start,
            alternatives: None,
            sequence: None,
            last: None,
        }
    }
}

// The state of one compilation. Every fragment lives in the same NFA and the counter names the
// states, so labels are unique within a compilation and independent between compilations.
struct Compiler<'a> {
    pattern: &'a [char],
    nfa: Nfa,
    state_counter: usize,
}

impl<'a> Compiler<'a> {
    fn new(pattern: &'a [char]) -> Self {
        Self {
            pattern,
            nfa: Nfa::blank(),
            state_counter: 0,
        }
    }

    fn new_state(&mut self) -> StateID {
        let label = format!("q{}", self.state_counter);
        self.state_counter += 1;
        self.nfa.push_state(label)
    }

    fn finish(mut self, fragment: Fragment) -> Nfa {
        self.nfa.set_start_id(fragment.start_state);
        self.nfa.set_accept_ids(fragment.accept_states);
        self.nfa
    }

    // The part of the pattern in `lo..hi` as string, used in error messages.
    fn fragment_text(&self, lo: usize, hi: usize) -> String {
        self.pattern[lo..hi].iter().collect()
    }

    /// Parse the whole pattern in one left to right pass.
    ///
    /// Open groups are kept on an explicit stack, so neither the nesting depth nor the number of
    /// alternatives is limited by the call stack. Errors are reported at the first offending
    /// position, an unclosed group at the end of the pattern.
    fn parse(&mut self) -> ParseResult<Fragment> {
        let mut open_groups: Vec<Group> = Vec::new();
        let mut current = Group::new(None, 0);
        let pattern = self.pattern;
        for (i, c) in pattern.iter().copied().enumerate() {
            match c {
                '(' => {
                    let parent = std::mem::replace(&mut current, Group::new(Some(i), i + 1));
                    open_groups.push(parent);
                }
                ')' => {
                    let Some(parent) = open_groups.pop() else {
                        return Err(RegexErrorKind::UnbalancedGroup {
                            position: i,
                            fragment: self.fragment_text(i, self.pattern.len()),
                        });
                    };
                    let group = std::mem::replace(&mut current, parent);
                    let fragment = self.close(group)?;
                    self.push_atom(&mut current, fragment);
                }
                '|' => {
                    let sequence = self.take_sequence(&mut current)?;
                    let alternatives = current.alternatives.take();
                    current.alternatives = Some(self.alternate(alternatives, sequence));
                    current.alternative_start = i + 1;
                }
                '*' => match current.last.take() {
                    // A star right after another star has no operand of its own.
                    Some(inner) if pattern[i - 1] != '*' => {
                        current.last = Some(self.star(inner));
                    }
                    _ => {
                        return Err(RegexErrorKind::MalformedPattern {
                            position: i,
                            character: c,
                        })
                    }
                },
                c => {
                    let fragment = self.symbol(c);
                    self.push_atom(&mut current, fragment);
                }
            }
        }
        if let Some(open) = open_groups
            .iter()
            .chain(std::iter::once(&current))
            .find_map(|group| group.open)
        {
            return Err(RegexErrorKind::UnbalancedGroup {
                position: open,
                fragment: self.fragment_text(open, self.pattern.len()),
            });
        }
        self.close(current)
    }

    // Append an atom to the sequence of the group. The previous atom is concatenated first, the
    // new one stays separate so that a following star can apply to it.
    fn push_atom(&mut self, group: &mut Group, atom: Fragment) {
        if let Some(previous) = group.last.replace(atom) {
            group.sequence = Some(match group.sequence.take() {
                Some(sequence) => self.concat(sequence, previous),
                None => previous,
            });
        }
    }

    // Take the concatenation of the current alternative out of the group.
    fn take_sequence(&mut self, group: &mut Group) -> ParseResult<Fragment> {
        match (group.sequence.take(), group.last.take()) {
            (Some(sequence), Some(last)) => Ok(self.concat(sequence, last)),
            (Some(fragment), None) | (None, Some(fragment)) => Ok(fragment),
            (None, None) => Err(RegexErrorKind::EmptySubexpression {
                position: group.alternative_start,
            }),
        }
    }

    fn alternate(&mut self, alternatives: Option<Fragment>, sequence: Fragment) -> Fragment {
        match alternatives {
            Some(alternatives) => self.union(alternatives, sequence),
            None => sequence,
        }
    }

    // Finish a group: its last alternative is joined with the ones before.
    fn close(&mut self, mut group: Group) -> ParseResult<Fragment> {
        let sequence = self.take_sequence(&mut group)?;
        Ok(self.alternate(group.alternatives, sequence))
    }

    /// Matches the empty string only.
    fn empty(&mut self) -> Fragment {
        let state = self.new_state();
        Fragment {
            start_state: state,
            accept_states: StateSet::from([state]),
        }
    }

    fn symbol(&mut self, c: char) -> Fragment {
        let start_state = self.new_state();
        let end_state = self.new_state();
        self.nfa.link(start_state, Some(c), end_state);
        Fragment {
            start_state,
            accept_states: StateSet::from([end_state]),
        }
    }

    fn union(&mut self, left: Fragment, right: Fragment) -> Fragment {
        let start_state = self.new_state();
        let end_state = self.new_state();
        self.nfa.link(start_state, None, left.start_state);
        self.nfa.link(start_state, None, right.start_state);
        for state in left.accept_states.iter().chain(right.accept_states.iter()) {
            self.nfa.link(*state, None, end_state);
        }
        Fragment {
            start_state,
            accept_states: StateSet::from([end_state]),
        }
    }

    fn concat(&mut self, first: Fragment, second: Fragment) -> Fragment {
        for state in &first.accept_states {
            self.nfa.link(*state, None, second.start_state);
        }
        Fragment {
            start_state: first.start_state,
            accept_states: second.accept_states,
        }
    }

    fn star(&mut self, inner: Fragment) -> Fragment {
        let start_state = self.new_state();
        let end_state = self.new_state();
        // Zero repetitions
        self.nfa.link(start_state, None, end_state);
        self.nfa.link(start_state, None, inner.start_state);
        for state in &inner.accept_states {
            // Repeat
            self.nfa.link(*state, None, inner.start_state);
            self.nfa.link(*state, None, end_state);
        }
        Fragment {
            start_state,
            accept_states: StateSet::from([end_state]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{init, words_up_to};
    use ::regex::Regex;

    fn error_kind(pattern: &str) -> RegexErrorKind {
        compile_regex(pattern).unwrap_err().kind().clone()
    }

    #[test]
    fn test_symbol() {
        let nfa = compile_regex("a").unwrap();
        assert_eq!(nfa.num_states(), 2);
        assert_eq!(nfa.start_state(), "q0");
        assert_eq!(nfa.accept_states().into_iter().collect::<Vec<_>>(), vec!["q1"]);
        assert!(nfa.simulate("a"));
        assert!(!nfa.simulate(""));
        assert!(!nfa.simulate("aa"));
    }

    #[test]
    fn test_symbol_followed_by_group_star() {
        init();
        let nfa = compile_regex("a(b|a)*").unwrap();
        assert!(nfa.simulate("abaa"));
        assert!(nfa.simulate("a"));
        assert!(!nfa.simulate("b"));
        assert!(!nfa.simulate("abc"));

        // a: q0,q1  b: q2,q3  a: q4,q5  union: q6,q7  star: q8,q9
        assert_eq!(nfa.num_states(), 10);
        assert_eq!(nfa.start_state(), "q0");
        assert_eq!(nfa.accept_states().into_iter().collect::<Vec<_>>(), vec!["q9"]);
        assert!(nfa.summary().has_epsilon);
    }

    #[test]
    fn test_empty_pattern() {
        let nfa = compile_regex("").unwrap();
        assert_eq!(nfa.num_states(), 1);
        assert_eq!(nfa.num_accept_states(), 1);
        assert!(nfa.simulate(""));
        assert!(!nfa.simulate("a"));
        assert!(!nfa.has_epsilon());
    }

    #[test]
    fn test_state_names_are_scoped_per_compilation() {
        let first = compile_regex("ab").unwrap();
        let second = compile_regex("ab").unwrap();
        assert_eq!(
            first.states().collect::<Vec<_>>(),
            second.states().collect::<Vec<_>>()
        );
        assert_eq!(second.start_state(), "q0");
    }

    #[test]
    fn test_unicode_symbols() {
        let nfa = compile_regex("é*ü").unwrap();
        assert!(nfa.simulate("ü"));
        assert!(nfa.simulate("ééü"));
        assert!(!nfa.simulate("e"));
        assert_eq!(nfa.alphabet(), ['é', 'ü'].into_iter().collect());
    }

    #[test]
    fn test_unbalanced_open_group() {
        init();
        let error = compile_regex("(a|b").unwrap_err();
        assert_eq!(
            error.kind(),
            &RegexErrorKind::UnbalancedGroup {
                position: 0,
                fragment: "(a|b".to_string()
            }
        );
        assert_eq!(error.pattern, "(a|b");
        assert_eq!(
            error.to_string(),
            "failed to compile regex '(a|b': unbalanced group at position 0 in '(a|b'"
        );
    }

    #[test]
    fn test_unbalanced_nested_group() {
        assert_eq!(
            error_kind("a((b)c"),
            RegexErrorKind::UnbalancedGroup {
                position: 1,
                fragment: "((b)c".to_string()
            }
        );
    }

    #[test]
    fn test_unbalanced_close_group() {
        assert_eq!(
            error_kind("a)b"),
            RegexErrorKind::UnbalancedGroup {
                position: 1,
                fragment: ")b".to_string()
            }
        );
        assert!(matches!(
            error_kind("(a))"),
            RegexErrorKind::UnbalancedGroup { position: 3, .. }
        ));
    }

    #[test]
    fn test_empty_subexpressions() {
        assert_eq!(
            error_kind("()"),
            RegexErrorKind::EmptySubexpression { position: 1 }
        );
        assert_eq!(
            error_kind("|a"),
            RegexErrorKind::EmptySubexpression { position: 0 }
        );
        assert_eq!(
            error_kind("a|"),
            RegexErrorKind::EmptySubexpression { position: 2 }
        );
        assert_eq!(
            error_kind("a||b"),
            RegexErrorKind::EmptySubexpression { position: 2 }
        );
        assert_eq!(
            error_kind("(a|)b"),
            RegexErrorKind::EmptySubexpression { position: 3 }
        );
    }

    #[test]
    fn test_misplaced_star() {
        assert_eq!(
            error_kind("*a"),
            RegexErrorKind::MalformedPattern {
                position: 0,
                character: '*'
            }
        );
        assert_eq!(
            error_kind("a**"),
            RegexErrorKind::MalformedPattern {
                position: 2,
                character: '*'
            }
        );
        assert_eq!(
            error_kind("(*a)"),
            RegexErrorKind::MalformedPattern {
                position: 1,
                character: '*'
            }
        );
        assert_eq!(
            error_kind("a|*"),
            RegexErrorKind::MalformedPattern {
                position: 2,
                character: '*'
            }
        );
    }

    #[test]
    fn test_long_alternation() {
        init();
        let pattern = vec!["a"; 50_000].join("|");
        let nfa = compile_regex(&pattern).unwrap();
        // Two states per symbol and per union
        assert_eq!(nfa.num_states(), 4 * 50_000 - 2);
        assert!(nfa.simulate("a"));
        assert!(!nfa.simulate("aa"));
        assert!(!nfa.simulate(""));
    }

    #[test]
    fn test_deeply_nested_groups() {
        init();
        let pattern = format!("{}a{}", "(".repeat(50_000), ")".repeat(50_000));
        let nfa = compile_regex(&pattern).unwrap();
        assert_eq!(nfa.num_states(), 2);
        assert!(nfa.simulate("a"));

        let unclosed = format!("{}a", "(".repeat(50_000));
        assert!(matches!(
            error_kind(&unclosed),
            RegexErrorKind::UnbalancedGroup { position: 0, .. }
        ));
    }

    #[test]
    fn test_first_error_in_reading_order() {
        assert_eq!(
            error_kind("*)"),
            RegexErrorKind::MalformedPattern {
                position: 0,
                character: '*'
            }
        );
        assert_eq!(
            error_kind("(|a"),
            RegexErrorKind::EmptySubexpression { position: 1 }
        );
    }

    #[test]
    fn test_against_reference_regex() {
        init();
        const PATTERNS: &[&str] = &[
            "a",
            "abc",
            "a|b",
            "a|b|c",
            "a*",
            "a*b*",
            "(ab)*",
            "a(b|a)*",
            "(a|b)*abb",
            "(a|bc)*c",
            "((a|b)c)*|a",
            "(a*|b)*",
            "((a))",
            "c(a*)*b",
            "ab|ba|(cc)*",
        ];
        let words = words_up_to(&['a', 'b', 'c'], 5);
        for pattern in PATTERNS {
            let nfa = compile_regex(pattern).unwrap();
            let reference = Regex::new(&format!("^(?:{})$", pattern)).unwrap();
            for word in &words {
                assert_eq!(
                    nfa.simulate(word),
                    reference.is_match(word),
                    "pattern '{}' on '{}'",
                    pattern,
                    word
                );
            }
        }
    }
}
