use std::ops::Index;

use crate::{Expr, Symbol, SymbolicError};

/// A column vector of scalar expressions.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Vector(Vec<Expr>);

impl Vector {
    /// Creates a vector from its entries.
    #[must_use]
    pub fn new(entries: Vec<Expr>) -> Self {
        Self(entries)
    }

    /// Creates a vector with no entries.
    #[must_use]
    pub fn empty() -> Self {
        Self(Vec::new())
    }

    /// Creates `n` fresh symbols `name[0]`, ..., `name[n - 1]`.
    #[must_use]
    pub fn symbolic(name: &str, n: usize) -> Self {
        (0..n).map(|i| Expr::symbol(Symbol::new(name, i))).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Expr> {
        self.0.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Expr> {
        self.0.iter()
    }

    #[must_use]
    pub fn entries(&self) -> &[Expr] {
        &self.0
    }

    /// Stacks `other` below `self`.
    #[must_use]
    pub fn concat(&self, other: &Vector) -> Vector {
        self.0.iter().chain(other.0.iter()).cloned().collect()
    }

    /// Applies `f` to every entry.
    #[must_use]
    pub fn map(&self, f: impl FnMut(&Expr) -> Expr) -> Vector {
        self.0.iter().map(f).collect()
    }

    /// Returns the sum of the entries, or `0` for an empty vector.
    #[must_use]
    pub fn sum(&self) -> Expr {
        self.0.iter().sum()
    }

    /// Returns the sum of squared entries.
    #[must_use]
    pub fn sum_squares(&self) -> Expr {
        self.0.iter().map(|e| e.powi(2)).sum()
    }

    /// Returns the inner product with `other`.
    ///
    /// # Errors
    ///
    /// Returns [`SymbolicError::DimensionMismatch`] if the lengths differ.
    pub fn dot(&self, other: &Vector) -> Result<Expr, SymbolicError> {
        if self.len() != other.len() {
            return Err(SymbolicError::DimensionMismatch {
                expected: self.len(),
                actual: other.len(),
            });
        }

        Ok(self.0.iter().zip(&other.0).map(|(a, b)| a * b).sum())
    }

    /// Returns the gradient of the scalar `expr` with respect to this vector.
    ///
    /// # Errors
    ///
    /// Returns [`SymbolicError::NotSymbolic`] if any entry is not a symbol.
    pub fn jacobian(&self, expr: &Expr) -> Result<Vector, SymbolicError> {
        expr.gradient(self)
    }

    /// Returns the symbols of a purely symbolic vector, in order.
    ///
    /// # Errors
    ///
    /// Returns [`SymbolicError::NotSymbolic`] if any entry is not a symbol.
    pub fn symbols(&self) -> Result<Vec<Symbol>, SymbolicError> {
        self.0
            .iter()
            .map(|e| {
                e.as_symbol()
                    .cloned()
                    .ok_or_else(|| SymbolicError::NotSymbolic(e.to_string()))
            })
            .collect()
    }
}

impl Index<usize> for Vector {
    type Output = Expr;

    fn index(&self, index: usize) -> &Expr {
        &self.0[index]
    }
}

impl FromIterator<Expr> for Vector {
    fn from_iter<I: IntoIterator<Item = Expr>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl From<Vec<Expr>> for Vector {
    fn from(entries: Vec<Expr>) -> Self {
        Self(entries)
    }
}

impl From<Expr> for Vector {
    fn from(entry: Expr) -> Self {
        Self(vec![entry])
    }
}

impl<'a> IntoIterator for &'a Vector {
    type Item = &'a Expr;
    type IntoIter = std::slice::Iter<'a, Expr>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbolic_vectors_are_reproducible() {
        assert_eq!(Vector::symbolic("u", 3), Vector::symbolic("u", 3));
        assert_ne!(Vector::symbolic("u", 3), Vector::symbolic("p", 3));
    }

    #[test]
    fn concat_appends_entries() {
        let p = Vector::symbolic("p", 2);
        let mu = Vector::symbolic("mu", 1);
        let joined = p.concat(&mu);

        assert_eq!(joined.len(), 3);
        assert_eq!(joined[2], mu[0]);
    }

    #[test]
    fn dot_requires_matching_lengths() {
        let a = Vector::symbolic("a", 2);
        let b = Vector::symbolic("b", 3);
        assert_eq!(
            a.dot(&b),
            Err(SymbolicError::DimensionMismatch {
                expected: 2,
                actual: 3
            })
        );
    }

    #[test]
    fn dot_of_empty_vectors_is_zero() {
        let empty = Vector::empty();
        assert_eq!(empty.dot(&empty), Ok(Expr::zero()));
    }

    #[test]
    fn symbols_rejects_compound_entries() {
        let u = Vector::symbolic("u", 2);
        let mixed = Vector::new(vec![u[0].clone(), &u[1] * 2.0]);
        assert!(matches!(
            mixed.symbols(),
            Err(SymbolicError::NotSymbolic(_))
        ));
    }
}
