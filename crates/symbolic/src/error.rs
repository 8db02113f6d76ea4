use thiserror::Error;

use crate::Symbol;

/// Errors produced while building, evaluating, or lowering expressions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SymbolicError {
    /// An entry that must be a plain symbol is a compound expression.
    #[error("expression `{0}` is not a symbol")]
    NotSymbolic(String),

    /// The same symbol is used for more than one input slot.
    #[error("symbol `{0}` appears more than once")]
    DuplicateSymbol(Symbol),

    /// Evaluation reached a symbol with no value.
    #[error("symbol `{0}` is not bound to a value")]
    Unbound(Symbol),

    /// A function output depends on a symbol that is not one of its inputs.
    #[error("function `{function}` references `{symbol}`, which is not one of its inputs")]
    FreeSymbol { function: String, symbol: Symbol },

    /// Two vectors that must have the same length do not.
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// A function name cannot be used as a C identifier.
    #[error("`{0}` is not a valid C identifier")]
    InvalidIdentifier(String),

    /// A lowered program was called with the wrong number of arguments.
    #[error("expected {expected} arguments, got {actual}")]
    ArgumentCount { expected: usize, actual: usize },

    /// A lowered program argument has the wrong length.
    #[error("argument {arg} has {actual} entries, expected {expected}")]
    ArgumentSize {
        arg: usize,
        expected: usize,
        actual: usize,
    },
}
