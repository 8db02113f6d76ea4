mod c;
mod program;

use std::collections::HashSet;

use crate::{Expr, SymbolicError, Vector, expr::post_order, is_c_identifier};

pub use program::{Op, Program};

/// A named mapping from symbolic input vectors to output vectors.
///
/// A `Function` is the unit of code generation: it is lowered to a
/// [`Program`], which can be interpreted directly or emitted as C source with
/// a CasADi-compatible calling convention.
#[derive(Debug, Clone)]
pub struct Function {
    name: String,
    inputs: Vec<Vector>,
    outputs: Vec<Vector>,
}

impl Function {
    /// Creates a function after validating its signature.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `name` is not a valid C identifier
    /// - an input entry is not a plain symbol, or a symbol is used twice
    /// - an output depends on a symbol that is not an input
    pub fn new(
        name: impl Into<String>,
        inputs: Vec<Vector>,
        outputs: Vec<Vector>,
    ) -> Result<Self, SymbolicError> {
        let name = name.into();
        if !is_c_identifier(&name) {
            return Err(SymbolicError::InvalidIdentifier(name));
        }

        let mut known = HashSet::new();
        for input in &inputs {
            for symbol in input.symbols()? {
                if !known.insert(symbol.clone()) {
                    return Err(SymbolicError::DuplicateSymbol(symbol));
                }
            }
        }

        let unknown = post_order(outputs.iter().flat_map(Vector::iter))
            .into_iter()
            .filter_map(Expr::as_symbol)
            .find(|s| !known.contains(*s));
        if let Some(symbol) = unknown {
            return Err(SymbolicError::FreeSymbol {
                function: name,
                symbol: symbol.clone(),
            });
        }

        Ok(Self {
            name,
            inputs,
            outputs,
        })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn inputs(&self) -> &[Vector] {
        &self.inputs
    }

    #[must_use]
    pub fn outputs(&self) -> &[Vector] {
        &self.outputs
    }

    /// Lowers the function to a flat instruction list.
    #[must_use]
    pub fn lower(&self) -> Program {
        program::lower(self)
    }
}

/// Lowers `function` and returns its C source text.
#[must_use]
pub fn lower(function: &Function) -> String {
    function.lower().to_c()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Symbol;

    #[test]
    fn rejects_invalid_names() {
        let u = Vector::symbolic("u", 1);
        let err = Function::new("grad-phi", vec![u.clone()], vec![u]).unwrap_err();
        assert_eq!(err, SymbolicError::InvalidIdentifier("grad-phi".into()));
    }

    #[test]
    fn rejects_free_symbols() {
        let u = Vector::symbolic("u", 1);
        let p = Vector::symbolic("p", 1);
        let f = Vector::from(&u[0] * &p[0]);

        let err = Function::new("f", vec![u], vec![f]).unwrap_err();
        assert_eq!(
            err,
            SymbolicError::FreeSymbol {
                function: "f".into(),
                symbol: Symbol::new("p", 0),
            }
        );
    }

    #[test]
    fn rejects_repeated_inputs() {
        let u = Vector::symbolic("u", 2);
        let err = Function::new("f", vec![u.clone(), u], vec![]).unwrap_err();
        assert_eq!(err, SymbolicError::DuplicateSymbol(Symbol::new("u", 0)));
    }

    #[test]
    fn accepts_empty_outputs() {
        let u = Vector::symbolic("u", 2);
        let f = Function::new("f", vec![u], vec![Vector::empty()]).unwrap();
        assert_eq!(f.outputs()[0].len(), 0);
    }
}
