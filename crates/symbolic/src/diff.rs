use std::collections::HashMap;

use crate::{Expr, Node, Symbol, SymbolicError, UnaryFn, Vector, expr::post_order};

/// Returns the derivative of `expr` with respect to `wrt`.
///
/// Subexpressions shared within `expr` are differentiated once.
#[must_use]
pub fn differentiate(expr: &Expr, wrt: &Symbol) -> Expr {
    adjoints(expr).remove(wrt).unwrap_or_else(Expr::zero)
}

/// Returns the gradient of `expr` with respect to every entry of `wrt`.
pub(crate) fn gradient(expr: &Expr, wrt: &Vector) -> Result<Vector, SymbolicError> {
    let symbols = wrt.symbols()?;
    let adjoints = adjoints(expr);
    Ok(symbols
        .iter()
        .map(|s| adjoints.get(s).cloned().unwrap_or_else(Expr::zero))
        .collect())
}

/// Sensitivity of `expr` to each symbol it depends on.
///
/// One reverse sweep over the expression graph: every node is visited once,
/// after all nodes that use it, and passes its adjoint on to its operands.
fn adjoints(expr: &Expr) -> HashMap<Symbol, Expr> {
    let order = post_order([expr]);
    let mut node_adjoints: HashMap<usize, Expr> = HashMap::new();
    let mut symbol_adjoints: HashMap<Symbol, Expr> = HashMap::new();
    node_adjoints.insert(expr.id(), Expr::one());

    for &node in order.iter().rev() {
        let Some(bar) = node_adjoints.remove(&node.id()) else {
            continue;
        };
        let mut pass = |operand: &Expr, contribution: Expr| {
            accumulate(&mut node_adjoints, operand.id(), contribution);
        };

        match node.node() {
            Node::Constant(_) | Node::Ge(_, _) => {}
            Node::Symbol(s) => match symbol_adjoints.remove(s) {
                Some(total) => {
                    symbol_adjoints.insert(s.clone(), total + bar);
                }
                None => {
                    symbol_adjoints.insert(s.clone(), bar);
                }
            },
            Node::Neg(a) => pass(a, -bar),
            Node::Add(a, b) => {
                pass(a, bar.clone());
                pass(b, bar);
            }
            Node::Sub(a, b) => {
                pass(a, bar.clone());
                pass(b, -bar);
            }
            Node::Mul(a, b) => {
                pass(a, &bar * b);
                pass(b, bar * a);
            }
            Node::Div(a, b) => {
                pass(a, &bar / b);
                pass(b, -(bar * a / b.powi(2)));
            }
            Node::Powi(a, n) => pass(a, bar * (f64::from(*n) * a.powi(n - 1))),
            Node::Unary(f, a) => pass(a, bar * unary_derivative(*f, a, node)),
            Node::Max(a, b) => {
                let pick_a = a.ge(b);
                pass(a, &bar * &pick_a);
                pass(b, bar * (1.0 - pick_a));
            }
            Node::Min(a, b) => {
                let pick_a = b.ge(a);
                pass(a, &bar * &pick_a);
                pass(b, bar * (1.0 - pick_a));
            }
        }
    }

    symbol_adjoints
}

fn accumulate(adjoints: &mut HashMap<usize, Expr>, id: usize, contribution: Expr) {
    let total = match adjoints.remove(&id) {
        Some(total) => total + contribution,
        None => contribution,
    };
    adjoints.insert(id, total);
}

/// Derivative of `f(a)` with respect to `a`, where `fa` is `f(a)` itself.
fn unary_derivative(f: UnaryFn, a: &Expr, fa: &Expr) -> Expr {
    match f {
        UnaryFn::Sqrt => 0.5 / fa,
        UnaryFn::Exp => fa.clone(),
        UnaryFn::Ln => 1.0 / a,
        UnaryFn::Sin => a.cos(),
        UnaryFn::Cos => -a.sin(),
        UnaryFn::Tan => 1.0 + fa.powi(2),
        UnaryFn::Tanh => 1.0 - fa.powi(2),
        UnaryFn::Abs => 2.0 * a.ge(0.0) - 1.0,
    }
}
