use thiserror::Error;

use optigen_symbolic::{Symbol, SymbolicError};

/// Errors in the definition of a [`Problem`](crate::Problem).
///
/// All of these are detected before a build touches the file system.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProblemError {
    /// A decision variable or parameter entry is not a plain symbol.
    #[error("{role} entry `{expr}` is not a symbol")]
    NotSymbolic { role: &'static str, expr: String },

    /// The problem has no decision variables.
    #[error("a problem needs at least one decision variable")]
    NoDecisionVariables,

    /// A symbol is declared more than once across decision variables and
    /// parameters.
    #[error("symbol `{0}` is declared more than once")]
    DuplicateSymbol(Symbol),

    /// The cost or a constraint uses a symbol that is neither a decision
    /// variable nor a parameter.
    #[error("{role} references undeclared symbol `{symbol}`")]
    UndeclaredSymbol { role: &'static str, symbol: Symbol },

    /// The penalty function returned the wrong number of entries.
    #[error("penalty function returned {actual} entries for {expected} constraints")]
    PenaltyDimension { expected: usize, actual: usize },

    /// A hard-constraint center or bound does not have one entry per
    /// decision variable.
    #[error("constraint {name} has {actual} entries, expected {expected}")]
    ConstraintDimension {
        name: &'static str,
        expected: usize,
        actual: usize,
    },

    /// A hard-constraint set is empty or not finite.
    #[error("invalid constraint set: {0}")]
    InvalidConstraints(String),

    /// Sample function called with an unsupported argument shape.
    #[error("invalid argument `{name}`: {reason}")]
    InvalidArgument { name: &'static str, reason: String },

    #[error(transparent)]
    Symbolic(#[from] SymbolicError),
}
