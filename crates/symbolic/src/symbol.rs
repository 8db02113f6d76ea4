use std::{fmt, sync::Arc};

/// A named scalar leaf of an expression.
///
/// Symbols are identified by their name and their index within a symbolic
/// vector, so `Vector::symbolic("u", 3)` always produces the same three
/// symbols. Two symbols with the same name and index are the same symbol.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Symbol {
    name: Arc<str>,
    index: usize,
}

impl Symbol {
    /// Creates the symbol `name[index]`.
    pub fn new(name: impl Into<Arc<str>>, index: usize) -> Self {
        Self {
            name: name.into(),
            index,
        }
    }

    /// Returns the name shared by all entries of the symbol's vector.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the position of the symbol within its vector.
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.name, self.index)
    }
}
