use thiserror::Error;

/// The result type for the `finautomata` crate.
pub type Result<T> = std::result::Result<T, RegexCompileError>;

/// The error returned when a pattern can't be compiled into an NFA.
/// It carries the complete pattern and the cause that stopped the compiler.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub struct RegexCompileError {
    /// The pattern that failed to compile.
    pub pattern: String,
    /// The source of the error.
    pub source: Box<RegexErrorKind>,
}

impl RegexCompileError {
    /// Create a new `RegexCompileError`.
    pub fn new<S: Into<String>>(pattern: S, kind: RegexErrorKind) -> Self {
        RegexCompileError {
            pattern: pattern.into(),
            source: Box::new(kind),
        }
    }

    /// Get the kind of the error.
    pub fn kind(&self) -> &RegexErrorKind {
        &self.source
    }
}

impl std::fmt::Display for RegexCompileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "failed to compile regex '{}': {}",
            self.pattern.escape_default(),
            self.source
        )
    }
}

/// The error kind type.
/// Positions are counted in characters from the start of the pattern.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegexErrorKind {
    /// A parenthesis without its counterpart.
    #[error("unbalanced group at position {position} in '{fragment}'")]
    UnbalancedGroup {
        /// Position of the offending parenthesis.
        position: usize,
        /// The part of the pattern starting at the offending parenthesis.
        fragment: String,
    },

    /// A character that can't appear where it was found, e.g. a `*` without operand.
    #[error("unexpected '{character}' at position {position}")]
    MalformedPattern {
        /// Position of the offending character.
        position: usize,
        /// The offending character.
        character: char,
    },

    /// An empty group or an empty branch of an alternation.
    #[error("empty subexpression at position {position}")]
    EmptySubexpression {
        /// Position where a subexpression was expected.
        position: usize,
    },
}
