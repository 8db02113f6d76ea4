use std::collections::HashMap;

use crate::{Expr, Node, Symbol, SymbolicError, Vector, expr::post_order};

/// Numeric values assigned to symbols.
#[derive(Debug, Clone, Default)]
pub struct Bindings {
    values: HashMap<Symbol, f64>,
}

impl Bindings {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Assigns `value` to `symbol`, replacing any previous value.
    pub fn bind(&mut self, symbol: Symbol, value: f64) -> &mut Self {
        self.values.insert(symbol, value);
        self
    }

    /// Assigns `values` entry-wise to the symbols of `vector`.
    ///
    /// # Errors
    ///
    /// Returns an error if `vector` is not purely symbolic or its length does
    /// not match `values`.
    pub fn bind_vector(&mut self, vector: &Vector, values: &[f64]) -> Result<&mut Self, SymbolicError> {
        if vector.len() != values.len() {
            return Err(SymbolicError::DimensionMismatch {
                expected: vector.len(),
                actual: values.len(),
            });
        }
        for (symbol, value) in vector.symbols()?.into_iter().zip(values) {
            self.values.insert(symbol, *value);
        }
        Ok(self)
    }

    #[must_use]
    pub fn get(&self, symbol: &Symbol) -> Option<f64> {
        self.values.get(symbol).copied()
    }
}

impl Expr {
    /// Evaluates the expression numerically.
    ///
    /// # Errors
    ///
    /// Returns [`SymbolicError::Unbound`] if the expression depends on a
    /// symbol that has no value in `bindings`.
    pub fn eval(&self, bindings: &Bindings) -> Result<f64, SymbolicError> {
        let values = evaluate([self], bindings)?;
        Ok(values[&self.id()])
    }
}

impl Vector {
    /// Evaluates every entry numerically.
    ///
    /// # Errors
    ///
    /// Returns [`SymbolicError::Unbound`] if an entry depends on an unbound
    /// symbol.
    pub fn eval(&self, bindings: &Bindings) -> Result<Vec<f64>, SymbolicError> {
        let values = evaluate(self, bindings)?;
        Ok(self.iter().map(|e| values[&e.id()]).collect())
    }
}

/// Values of every node reachable from `roots`, keyed by node identity.
fn evaluate<'a>(
    roots: impl IntoIterator<Item = &'a Expr>,
    bindings: &Bindings,
) -> Result<HashMap<usize, f64>, SymbolicError> {
    let mut values: HashMap<usize, f64> = HashMap::new();

    for expr in post_order(roots) {
        let v = |e: &Expr| values[&e.id()];
        let value = match expr.node() {
            Node::Constant(c) => *c,
            Node::Symbol(s) => bindings
                .get(s)
                .ok_or_else(|| SymbolicError::Unbound(s.clone()))?,
            Node::Neg(a) => -v(a),
            Node::Add(a, b) => v(a) + v(b),
            Node::Sub(a, b) => v(a) - v(b),
            Node::Mul(a, b) => v(a) * v(b),
            Node::Div(a, b) => v(a) / v(b),
            Node::Powi(a, n) => v(a).powi(*n),
            Node::Unary(f, a) => f.apply(v(a)),
            Node::Max(a, b) => v(a).max(v(b)),
            Node::Min(a, b) => v(a).min(v(b)),
            Node::Ge(a, b) => {
                if v(a) >= v(b) {
                    1.0
                } else {
                    0.0
                }
            }
        };
        values.insert(expr.id(), value);
    }

    Ok(values)
}
