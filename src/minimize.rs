//! This module contains the DFA minimization.
//! The minimization removes unreachable states and then merges indistinguishable states with a
//! Hopcroft-style partition refinement driven by a worklist of splitter groups.

use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::time::Instant;

use itertools::Itertools;
use log::{debug, trace};

use crate::{Dfa, StateID};

// The type definitions for the partition refinement.
pub(crate) type StateGroup = BTreeSet<StateID>;
pub(crate) type Partition = Vec<StateGroup>;

impl Dfa {
    /// Minimize the DFA.
    ///
    /// The result accepts the same language. Its states are named `S0`, `S1`, ... in the order
    /// of the final partition. A missing transition counts as its own behavior, so two states
    /// are only merged if they agree on which transitions are defined.
    pub fn minimize(&self) -> Dfa {
        let now = Instant::now();
        let dfa = self.prune_unreachable();
        let partition = dfa.refine_partition();
        Self::trace_partition("final", &partition);
        let minimized = dfa.create_from_partition(&partition);
        trace!(
            "Minimization took {} milliseconds.",
            now.elapsed().as_millis()
        );
        debug!(
            "Minimized DFA from {} to {} states",
            self.states.len(),
            minimized.states.len()
        );
        minimized
    }

    /// The start partition separates accepting from non-accepting states. An empty group is
    /// left out.
    fn calculate_initial_partition(&self) -> Partition {
        let (accepting, non_accepting): (StateGroup, StateGroup) = (0..self.states.len())
            .map(StateID::new)
            .partition(|state| self.accept_states.contains(state));
        [accepting, non_accepting]
            .into_iter()
            .filter(|group| !group.is_empty())
            .collect()
    }

    /// For each (target, symbol) the states whose transition on symbol leads to target.
    fn reverse_transitions(&self) -> BTreeMap<(StateID, char), StateGroup> {
        let mut reverse: BTreeMap<(StateID, char), StateGroup> = BTreeMap::new();
        for ((source, symbol), target) in &self.transitions {
            if self.alphabet.contains(symbol) {
                reverse.entry((*target, *symbol)).or_default().insert(*source);
            }
        }
        reverse
    }

    fn refine_partition(&self) -> Partition {
        let reverse = self.reverse_transitions();
        let mut partition = self.calculate_initial_partition();
        let mut waiting: VecDeque<StateGroup> = partition.iter().cloned().collect();
        Self::trace_partition("initial", &partition);

        while let Some(splitter) = waiting.pop_front() {
            for symbol in &self.alphabet {
                // The states that enter the splitter on this symbol
                let predecessors: StateGroup = splitter
                    .iter()
                    .filter_map(|state| reverse.get(&(*state, *symbol)))
                    .flatten()
                    .copied()
                    .collect();
                if predecessors.is_empty() {
                    continue;
                }
                for group in partition.clone() {
                    let (inside, outside): (StateGroup, StateGroup) = group
                        .iter()
                        .partition(|state| predecessors.contains(*state));
                    if inside.is_empty() || outside.is_empty() {
                        continue;
                    }
                    trace!(
                        "Split {{{}}} on '{}' into {{{}}} and {{{}}}",
                        group.iter().join(", "),
                        symbol,
                        inside.iter().join(", "),
                        outside.iter().join(", ")
                    );
                    if let Some(pos) = partition.iter().position(|g| *g == group) {
                        partition.remove(pos);
                    }
                    if let Some(pos) = waiting.iter().position(|g| *g == group) {
                        waiting.remove(pos);
                        waiting.push_back(inside.clone());
                        waiting.push_back(outside.clone());
                    } else if inside.len() <= outside.len() {
                        waiting.push_back(inside.clone());
                    } else {
                        waiting.push_back(outside.clone());
                    }
                    partition.push(inside);
                    partition.push(outside);
                }
            }
        }
        partition
    }

    /// Create a DFA with one state per group of the partition.
    /// Transitions, the start state and the accepting states are mapped through the group
    /// membership.
    fn create_from_partition(&self, partition: &[StateGroup]) -> Dfa {
        let mut group_of = vec![StateID::default(); self.states.len()];
        for (index, group) in partition.iter().enumerate() {
            for state in group {
                group_of[*state] = StateID::new(index);
            }
        }
        debug_assert_eq!(
            partition.iter().map(BTreeSet::len).sum::<usize>(),
            self.states.len()
        );

        let states = (0..partition.len()).map(|i| format!("S{}", i)).collect();
        let transitions = self
            .transitions
            .iter()
            .filter(|((_, symbol), _)| self.alphabet.contains(symbol))
            .map(|((source, symbol), target)| ((group_of[*source], *symbol), group_of[*target]))
            .collect();
        let accept_states = self
            .accept_states
            .iter()
            .map(|state| group_of[*state])
            .collect();
        Dfa::from_parts(
            states,
            self.alphabet.clone(),
            group_of[self.start_state],
            accept_states,
            transitions,
        )
    }

    fn trace_partition(context: &str, partition: &[StateGroup]) {
        trace!("Partition {}:", context);
        for (i, group) in partition.iter().enumerate() {
            trace!("Group {}: {{{}}}", i, group.iter().join(", "));
        }
    }
}
