mod ops;

use std::{
    collections::{BTreeSet, HashSet},
    fmt,
    sync::{Arc, LazyLock},
};

use crate::{Symbol, Vector};

/// An immutable scalar expression.
///
/// Cloning is cheap: subexpressions are shared behind an [`Arc`], so an
/// expression is a directed acyclic graph rather than a tree. Equality is
/// structural.
///
/// No operation on an expression recurses on its depth, so arbitrarily long
/// chains such as a left-folded sum of many terms are safe to compare,
/// print, differentiate, evaluate, lower, and drop.
///
/// Expressions are usually built with the overloaded arithmetic operators,
/// which accept any mix of `Expr`, `&Expr`, and `f64`:
///
/// ```
/// use optigen_symbolic::{Expr, Vector};
///
/// let u = Vector::symbolic("u", 2);
/// let f = (1.0 - &u[0]).powi(2) + 100.0 * (&u[1] - u[0].powi(2)).powi(2);
/// assert_eq!(f.free_symbols().len(), 2);
/// ```
#[derive(Clone)]
pub struct Expr(Arc<Node>);

/// A single node of an expression graph.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Constant(f64),
    Symbol(Symbol),
    Neg(Expr),
    Add(Expr, Expr),
    Sub(Expr, Expr),
    Mul(Expr, Expr),
    Div(Expr, Expr),
    /// Integer power.
    Powi(Expr, i32),
    Unary(UnaryFn, Expr),
    Max(Expr, Expr),
    Min(Expr, Expr),
    /// Indicator `a >= b`, evaluating to `1.0` or `0.0`.
    Ge(Expr, Expr),
}

impl Node {
    /// The direct operands of the node, left to right.
    pub fn operands(&self) -> impl DoubleEndedIterator<Item = &Expr> {
        let (a, b) = match self {
            Node::Constant(_) | Node::Symbol(_) => (None, None),
            Node::Neg(a) | Node::Powi(a, _) | Node::Unary(_, a) => (Some(a), None),
            Node::Add(a, b)
            | Node::Sub(a, b)
            | Node::Mul(a, b)
            | Node::Div(a, b)
            | Node::Max(a, b)
            | Node::Min(a, b)
            | Node::Ge(a, b) => (Some(a), Some(b)),
        };
        a.into_iter().chain(b)
    }

    /// Compares everything but the operands.
    fn same_head(&self, other: &Node) -> bool {
        match (self, other) {
            (Node::Constant(a), Node::Constant(b)) => a == b,
            (Node::Symbol(a), Node::Symbol(b)) => a == b,
            (Node::Powi(_, m), Node::Powi(_, n)) => m == n,
            (Node::Unary(f, _), Node::Unary(g, _)) => f == g,
            _ => std::mem::discriminant(self) == std::mem::discriminant(other),
        }
    }

    /// Moves the operands out, leaving shared placeholders behind.
    fn take_operands(&mut self, out: &mut Vec<Expr>) {
        let mut take = |e: &mut Expr| out.push(std::mem::replace(e, PLACEHOLDER.clone()));
        match self {
            Node::Constant(_) | Node::Symbol(_) => {}
            Node::Neg(a) | Node::Powi(a, _) | Node::Unary(_, a) => take(a),
            Node::Add(a, b)
            | Node::Sub(a, b)
            | Node::Mul(a, b)
            | Node::Div(a, b)
            | Node::Max(a, b)
            | Node::Min(a, b)
            | Node::Ge(a, b) => {
                take(a);
                take(b);
            }
        }
    }
}

/// Stand-in operand for nodes being torn down.
static PLACEHOLDER: LazyLock<Expr> = LazyLock::new(Expr::zero);

impl Drop for Node {
    fn drop(&mut self) {
        let mut pending = Vec::new();
        self.take_operands(&mut pending);
        while let Some(expr) = pending.pop() {
            if let Some(mut node) = Arc::into_inner(expr.0) {
                node.take_operands(&mut pending);
            }
        }
    }
}

/// Every node reachable from `roots`, each once, operands before the nodes
/// that use them.
///
/// Nodes are identified by allocation. The order matches a left-to-right
/// depth-first traversal of the roots in turn.
pub(crate) fn post_order<'a>(roots: impl IntoIterator<Item = &'a Expr>) -> Vec<&'a Expr> {
    let mut order = Vec::new();
    let mut expanded = HashSet::new();
    let mut stack: Vec<(&Expr, bool)> = roots.into_iter().map(|e| (e, false)).collect();
    stack.reverse();

    while let Some((expr, ready)) = stack.pop() {
        if ready {
            order.push(expr);
        } else if expanded.insert(expr.id()) {
            stack.push((expr, true));
            stack.extend(expr.node().operands().rev().map(|e| (e, false)));
        }
    }

    order
}

/// Elementary functions of one argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryFn {
    Sqrt,
    Exp,
    Ln,
    Sin,
    Cos,
    Tan,
    Tanh,
    Abs,
}

impl UnaryFn {
    /// Applies the function to a number.
    #[must_use]
    pub fn apply(self, x: f64) -> f64 {
        match self {
            Self::Sqrt => x.sqrt(),
            Self::Exp => x.exp(),
            Self::Ln => x.ln(),
            Self::Sin => x.sin(),
            Self::Cos => x.cos(),
            Self::Tan => x.tan(),
            Self::Tanh => x.tanh(),
            Self::Abs => x.abs(),
        }
    }

    /// Returns the name of the equivalent `<math.h>` function.
    #[must_use]
    pub fn c_name(self) -> &'static str {
        match self {
            Self::Sqrt => "sqrt",
            Self::Exp => "exp",
            Self::Ln => "log",
            Self::Sin => "sin",
            Self::Cos => "cos",
            Self::Tan => "tan",
            Self::Tanh => "tanh",
            Self::Abs => "fabs",
        }
    }
}

impl Expr {
    fn from_node(node: Node) -> Self {
        Self(Arc::new(node))
    }

    /// Creates a constant expression.
    #[must_use]
    pub fn constant(value: f64) -> Self {
        Self::from_node(Node::Constant(value))
    }

    /// The constant `0`.
    #[must_use]
    pub fn zero() -> Self {
        Self::constant(0.0)
    }

    /// The constant `1`.
    #[must_use]
    pub fn one() -> Self {
        Self::constant(1.0)
    }

    /// Creates an expression consisting of a single symbol.
    #[must_use]
    pub fn symbol(symbol: Symbol) -> Self {
        Self::from_node(Node::Symbol(symbol))
    }

    /// Returns the root node.
    #[must_use]
    pub fn node(&self) -> &Node {
        &self.0
    }

    /// Returns the constant value if this expression is a constant.
    #[must_use]
    pub fn as_constant(&self) -> Option<f64> {
        match self.node() {
            Node::Constant(c) => Some(*c),
            _ => None,
        }
    }

    /// Returns the symbol if this expression is a single symbol.
    #[must_use]
    pub fn as_symbol(&self) -> Option<&Symbol> {
        match self.node() {
            Node::Symbol(s) => Some(s),
            _ => None,
        }
    }

    /// Returns `true` if this expression is the constant `value`.
    #[must_use]
    pub fn is_constant(&self, value: f64) -> bool {
        self.as_constant() == Some(value)
    }

    /// Returns `true` if both expressions share the same root allocation.
    pub(crate) fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// An address that identifies the root node while it is alive.
    pub(crate) fn id(&self) -> usize {
        Arc::as_ptr(&self.0) as usize
    }

    /// Raises the expression to an integer power.
    #[must_use]
    pub fn powi(&self, n: i32) -> Self {
        match (n, self.as_constant()) {
            (0, _) => Self::one(),
            (1, _) => self.clone(),
            (_, Some(c)) => Self::constant(c.powi(n)),
            _ => Self::from_node(Node::Powi(self.clone(), n)),
        }
    }

    /// Applies an elementary function.
    #[must_use]
    pub fn apply(&self, f: UnaryFn) -> Self {
        match self.as_constant() {
            Some(c) => Self::constant(f.apply(c)),
            None => Self::from_node(Node::Unary(f, self.clone())),
        }
    }

    #[must_use]
    pub fn sqrt(&self) -> Self {
        self.apply(UnaryFn::Sqrt)
    }

    #[must_use]
    pub fn exp(&self) -> Self {
        self.apply(UnaryFn::Exp)
    }

    /// Natural logarithm.
    #[must_use]
    pub fn ln(&self) -> Self {
        self.apply(UnaryFn::Ln)
    }

    #[must_use]
    pub fn sin(&self) -> Self {
        self.apply(UnaryFn::Sin)
    }

    #[must_use]
    pub fn cos(&self) -> Self {
        self.apply(UnaryFn::Cos)
    }

    #[must_use]
    pub fn tan(&self) -> Self {
        self.apply(UnaryFn::Tan)
    }

    #[must_use]
    pub fn tanh(&self) -> Self {
        self.apply(UnaryFn::Tanh)
    }

    #[must_use]
    pub fn abs(&self) -> Self {
        self.apply(UnaryFn::Abs)
    }

    /// The larger of two expressions.
    #[must_use]
    pub fn max(&self, other: impl Into<Expr>) -> Self {
        let other = other.into();
        match (self.as_constant(), other.as_constant()) {
            (Some(a), Some(b)) => Self::constant(a.max(b)),
            _ => Self::from_node(Node::Max(self.clone(), other)),
        }
    }

    /// The smaller of two expressions.
    #[must_use]
    pub fn min(&self, other: impl Into<Expr>) -> Self {
        let other = other.into();
        match (self.as_constant(), other.as_constant()) {
            (Some(a), Some(b)) => Self::constant(a.min(b)),
            _ => Self::from_node(Node::Min(self.clone(), other)),
        }
    }

    /// The indicator `self >= other` as `1.0` or `0.0`.
    #[must_use]
    pub fn ge(&self, other: impl Into<Expr>) -> Self {
        let other = other.into();
        match (self.as_constant(), other.as_constant()) {
            (Some(a), Some(b)) => Self::constant(if a >= b { 1.0 } else { 0.0 }),
            _ => Self::from_node(Node::Ge(self.clone(), other)),
        }
    }

    /// Returns the gradient of this expression with respect to `wrt`.
    ///
    /// Every entry of `wrt` must be a symbol.
    ///
    /// # Errors
    ///
    /// Returns [`crate::SymbolicError::NotSymbolic`] if an entry of `wrt` is
    /// a compound expression.
    pub fn gradient(&self, wrt: &Vector) -> Result<Vector, crate::SymbolicError> {
        crate::diff::gradient(self, wrt)
    }

    /// Returns every symbol the expression depends on, in sorted order.
    #[must_use]
    pub fn free_symbols(&self) -> BTreeSet<Symbol> {
        post_order([self])
            .into_iter()
            .filter_map(Expr::as_symbol)
            .cloned()
            .collect()
    }
}

impl PartialEq for Expr {
    fn eq(&self, other: &Self) -> bool {
        let mut compared = HashSet::new();
        let mut pending = vec![(self, other)];

        while let Some((a, b)) = pending.pop() {
            if a.ptr_eq(b) || !compared.insert((a.id(), b.id())) {
                continue;
            }
            if !a.node().same_head(b.node()) {
                return false;
            }
            pending.extend(a.node().operands().zip(b.node().operands()));
        }

        true
    }
}

impl From<f64> for Expr {
    fn from(value: f64) -> Self {
        Self::constant(value)
    }
}

impl From<Symbol> for Expr {
    fn from(symbol: Symbol) -> Self {
        Self::symbol(symbol)
    }
}

impl From<&Expr> for Expr {
    fn from(expr: &Expr) -> Self {
        expr.clone()
    }
}

impl fmt::Debug for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

/// A pending piece of infix output.
enum Piece<'a> {
    Expr(&'a Expr),
    Text(&'static str),
    Owned(String),
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut pending = vec![Piece::Expr(self)];

        while let Some(piece) = pending.pop() {
            let expr = match piece {
                Piece::Expr(expr) => expr,
                Piece::Text(text) => {
                    f.write_str(text)?;
                    continue;
                }
                Piece::Owned(text) => {
                    f.write_str(&text)?;
                    continue;
                }
            };

            // Pieces are pushed in reverse output order.
            let (open, separator, close) = match expr.node() {
                Node::Constant(c) => {
                    write!(f, "{c}")?;
                    continue;
                }
                Node::Symbol(s) => {
                    write!(f, "{s}")?;
                    continue;
                }
                Node::Neg(a) => {
                    pending.extend([Piece::Text(")"), Piece::Expr(a), Piece::Text("(-")]);
                    continue;
                }
                Node::Powi(a, n) => {
                    pending.extend([Piece::Owned(format!("^{n}")), Piece::Expr(a)]);
                    continue;
                }
                Node::Unary(func, a) => {
                    pending.extend([
                        Piece::Text(")"),
                        Piece::Expr(a),
                        Piece::Owned(format!("{}(", func.c_name())),
                    ]);
                    continue;
                }
                Node::Add(..) => ("(", " + ", ")"),
                Node::Sub(..) => ("(", " - ", ")"),
                Node::Mul(..) => ("(", " * ", ")"),
                Node::Div(..) => ("(", " / ", ")"),
                Node::Max(..) => ("max(", ", ", ")"),
                Node::Min(..) => ("min(", ", ", ")"),
                Node::Ge(..) => ("(", " >= ", ")"),
            };

            let mut operands = expr.node().operands();
            if let (Some(a), Some(b)) = (operands.next(), operands.next()) {
                pending.extend([
                    Piece::Text(close),
                    Piece::Expr(b),
                    Piece::Text(separator),
                    Piece::Expr(a),
                    Piece::Text(open),
                ]);
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn x() -> Expr {
        Expr::symbol(Symbol::new("x", 0))
    }

    #[test]
    fn folds_identities() {
        let x = x();
        assert_eq!(&x + 0.0, x);
        assert_eq!(0.0 + &x, x);
        assert_eq!(&x * 1.0, x);
        assert_eq!(&x * 0.0, Expr::zero());
        assert_eq!(&x - 0.0, x);
        assert_eq!(&x / 1.0, x);
        assert_eq!(-(-&x), x);
        assert_eq!(x.powi(1), x);
        assert_eq!(x.powi(0), Expr::one());
    }

    #[test]
    fn folds_constants() {
        let e = (Expr::constant(2.0) + 3.0) * 4.0;
        assert_eq!(e.as_constant(), Some(20.0));
        assert_eq!(Expr::constant(4.0).sqrt().as_constant(), Some(2.0));
        assert_eq!(Expr::constant(-1.0).max(0.0).as_constant(), Some(0.0));
        assert_eq!(Expr::constant(3.0).ge(2.0).as_constant(), Some(1.0));
    }

    #[test]
    fn equality_is_structural() {
        let a = x().sin() * 2.0;
        let b = x().sin() * 2.0;
        assert_eq!(a, b);
        assert_ne!(a, x().cos() * 2.0);
    }

    #[test]
    fn collects_free_symbols() {
        let y = Expr::symbol(Symbol::new("y", 3));
        let e = (x() * &y).exp() + x();
        let symbols: Vec<_> = e.free_symbols().into_iter().collect();
        assert_eq!(symbols, vec![Symbol::new("x", 0), Symbol::new("y", 3)]);
    }

    #[test]
    fn displays_infix() {
        let e = (x() + 1.0).powi(2);
        assert_eq!(e.to_string(), "(x[0] + 1)^2");

        let e = (-x()).sin().max(x() / 2.0);
        assert_eq!(e.to_string(), "max(sin((-x[0])), (x[0] / 2))");
    }

    /// `(x * 1.5 + y[0]) * 1.5 + y[1] ...`, built left to right.
    fn chain(n: usize) -> Expr {
        let mut e = x();
        for i in 0..n {
            e = e * 1.5 + Expr::symbol(Symbol::new("y", i));
        }
        e
    }

    #[test]
    fn deep_chains_compare_print_and_drop() {
        let a = chain(200_000);
        let b = chain(200_000);

        assert_eq!(a, b);
        assert_ne!(a, chain(199_999));
        assert!(a.to_string().ends_with("y[199999])"));
        assert_eq!(a.free_symbols().len(), 200_001);

        drop(a);
        drop(b);
    }

    #[test]
    fn post_order_visits_operands_first() {
        let shared = x().sin();
        let e = &shared * &shared + 1.0;
        let order = post_order([&e]);

        assert_eq!(order.len(), 5);
        assert_eq!(order[0], &x());
        assert_eq!(order[1], &shared);
        assert_eq!(order[4], &e);
    }
}
