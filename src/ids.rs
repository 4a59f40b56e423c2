/// The index of a state in the state table of a [`crate::Dfa`] or [`crate::Nfa`].
///
/// State ids are only meaningful together with the automaton that issued them. The string label
/// of a state is looked up through the automaton, e.g. [`crate::Dfa::label`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct StateID(usize);

impl StateID {
    /// Create a new id.
    #[inline]
    pub const fn new(index: usize) -> Self {
        StateID(index)
    }

    /// Get the id as usize.
    #[inline]
    pub fn as_usize(&self) -> usize {
        self.0
    }
}

impl<T> std::ops::Index<StateID> for [T] {
    type Output = T;

    #[inline]
    fn index(&self, index: StateID) -> &Self::Output {
        &self[index.0]
    }
}

impl<T> std::ops::IndexMut<StateID> for [T] {
    #[inline]
    fn index_mut(&mut self, index: StateID) -> &mut T {
        &mut self[index.0]
    }
}

impl<T> std::ops::Index<StateID> for Vec<T> {
    type Output = T;

    #[inline]
    fn index(&self, index: StateID) -> &Self::Output {
        &self[index.0]
    }
}

impl<T> std::ops::IndexMut<StateID> for Vec<T> {
    #[inline]
    fn index_mut(&mut self, index: StateID) -> &mut T {
        &mut self[index.0]
    }
}

impl std::fmt::Display for StateID {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<usize> for StateID {
    fn from(index: usize) -> Self {
        StateID::new(index)
    }
}
