use std::collections::HashMap;

use crate::{Expr, Node, Symbol, SymbolicError, UnaryFn, expr::post_order};

use super::Function;

/// A single instruction of a lowered [`Program`].
///
/// Each instruction writes one work slot; operands refer to earlier slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    /// A constant, stored as its IEEE-754 bit pattern.
    Constant(u64),
    /// Entry `index` of argument `arg`.
    Input { arg: usize, index: usize },
    Neg(usize),
    Add(usize, usize),
    Sub(usize, usize),
    Mul(usize, usize),
    Div(usize, usize),
    Powi(usize, i32),
    Unary(UnaryFn, usize),
    Max(usize, usize),
    Min(usize, usize),
    Ge(usize, usize),
}

/// A lowered [`Function`]: a straight-line sequence of instructions with no
/// repeated subexpressions.
///
/// Lowering is deterministic; the same function always produces the same
/// instructions in the same order.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    name: String,
    input_sizes: Vec<usize>,
    instructions: Vec<Op>,
    outputs: Vec<Vec<usize>>,
}

impl Program {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn input_sizes(&self) -> &[usize] {
        &self.input_sizes
    }

    #[must_use]
    pub fn output_sizes(&self) -> Vec<usize> {
        self.outputs.iter().map(Vec::len).collect()
    }

    #[must_use]
    pub fn instructions(&self) -> &[Op] {
        &self.instructions
    }

    /// Slots read by each output entry.
    #[must_use]
    pub fn outputs(&self) -> &[Vec<usize>] {
        &self.outputs
    }

    /// Runs the program on numeric arguments.
    ///
    /// # Errors
    ///
    /// Returns an error if the number or sizes of `args` do not match the
    /// function's inputs.
    pub fn call(&self, args: &[&[f64]]) -> Result<Vec<Vec<f64>>, SymbolicError> {
        if args.len() != self.input_sizes.len() {
            return Err(SymbolicError::ArgumentCount {
                expected: self.input_sizes.len(),
                actual: args.len(),
            });
        }
        for (arg, (values, &expected)) in args.iter().zip(&self.input_sizes).enumerate() {
            if values.len() != expected {
                return Err(SymbolicError::ArgumentSize {
                    arg,
                    expected,
                    actual: values.len(),
                });
            }
        }

        let mut w: Vec<f64> = Vec::with_capacity(self.instructions.len());
        for op in &self.instructions {
            let value = match *op {
                Op::Constant(bits) => f64::from_bits(bits),
                Op::Input { arg, index } => args[arg][index],
                Op::Neg(a) => -w[a],
                Op::Add(a, b) => w[a] + w[b],
                Op::Sub(a, b) => w[a] - w[b],
                Op::Mul(a, b) => w[a] * w[b],
                Op::Div(a, b) => w[a] / w[b],
                Op::Powi(a, n) => f64::powi(w[a], n),
                Op::Unary(f, a) => f.apply(w[a]),
                Op::Max(a, b) => f64::max(w[a], w[b]),
                Op::Min(a, b) => f64::min(w[a], w[b]),
                Op::Ge(a, b) => {
                    if w[a] >= w[b] {
                        1.0
                    } else {
                        0.0
                    }
                }
            };
            w.push(value);
        }

        Ok(self
            .outputs
            .iter()
            .map(|slots| slots.iter().map(|&s| w[s]).collect())
            .collect())
    }
}

pub(super) fn lower(function: &Function) -> Program {
    let mut inputs = HashMap::new();
    for (arg, vector) in function.inputs().iter().enumerate() {
        for (index, expr) in vector.iter().enumerate() {
            if let Some(symbol) = expr.as_symbol() {
                inputs.insert(symbol.clone(), (arg, index));
            }
        }
    }

    let mut lowering = Lowering {
        inputs,
        instructions: Vec::new(),
        numbering: HashMap::new(),
        visited: HashMap::new(),
    };

    let entries = function.outputs().iter().flat_map(crate::Vector::iter);
    for expr in post_order(entries) {
        lowering.lower(expr);
    }

    let outputs = function
        .outputs()
        .iter()
        .map(|vector| vector.iter().map(|e| lowering.visited[&e.id()]).collect())
        .collect();

    Program {
        name: function.name().to_owned(),
        input_sizes: function.inputs().iter().map(crate::Vector::len).collect(),
        instructions: lowering.instructions,
        outputs,
    }
}

/// Value-numbering state used while lowering.
struct Lowering {
    inputs: HashMap<Symbol, (usize, usize)>,
    instructions: Vec<Op>,
    /// Slot of each distinct instruction, so equal subexpressions share one slot.
    numbering: HashMap<Op, usize>,
    /// Slot of each already-lowered node, keyed by node identity.
    visited: HashMap<usize, usize>,
}

impl Lowering {
    /// Assigns a slot to `expr`, whose operands must already have slots.
    fn lower(&mut self, expr: &Expr) {
        let slot = |e: &Expr| self.visited[&e.id()];

        let op = match expr.node() {
            Node::Constant(c) => Op::Constant(c.to_bits()),
            Node::Symbol(s) => {
                // Function::new guarantees every free symbol is an input.
                let (arg, index) = self.inputs[s];
                Op::Input { arg, index }
            }
            Node::Neg(a) => Op::Neg(slot(a)),
            Node::Add(a, b) => Op::Add(slot(a), slot(b)),
            Node::Sub(a, b) => Op::Sub(slot(a), slot(b)),
            Node::Mul(a, b) => Op::Mul(slot(a), slot(b)),
            Node::Div(a, b) => Op::Div(slot(a), slot(b)),
            Node::Powi(a, n) => Op::Powi(slot(a), *n),
            Node::Unary(f, a) => Op::Unary(*f, slot(a)),
            Node::Max(a, b) => Op::Max(slot(a), slot(b)),
            Node::Min(a, b) => Op::Min(slot(a), slot(b)),
            Node::Ge(a, b) => Op::Ge(slot(a), slot(b)),
        };

        let slot = match self.numbering.get(&op) {
            Some(&slot) => slot,
            None => {
                self.instructions.push(op);
                let slot = self.instructions.len() - 1;
                self.numbering.insert(op, slot);
                slot
            }
        };
        self.visited.insert(expr.id(), slot);
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::Vector;

    #[test]
    fn shares_common_subexpressions() {
        let u = Vector::symbolic("u", 1);
        // Built twice, structurally equal.
        let a = u[0].sin() * 2.0;
        let b = u[0].sin() * 2.0;
        let f = Function::new("f", vec![u], vec![Vector::from(a + b)]).unwrap();

        let program = f.lower();
        // u, sin, 2, mul, add
        assert_eq!(program.instructions().len(), 5);
    }

    #[test]
    fn call_matches_symbolic_evaluation() {
        let u = Vector::symbolic("u", 2);
        let p = Vector::symbolic("p", 1);
        let f = (&u[0] - &p[0]).powi(2) + u[1].exp() / &u[0];
        let function = Function::new(
            "f",
            vec![u.clone(), p.clone()],
            vec![Vector::from(f.clone())],
        )
        .unwrap();

        let out = function.lower().call(&[&[1.5, -0.5], &[0.25]]).unwrap();

        let mut bindings = crate::Bindings::new();
        bindings.bind_vector(&u, &[1.5, -0.5]).unwrap();
        bindings.bind_vector(&p, &[0.25]).unwrap();
        assert_relative_eq!(out[0][0], f.eval(&bindings).unwrap());
    }

    #[test]
    fn call_validates_arguments() {
        let u = Vector::symbolic("u", 2);
        let program = Function::new("f", vec![u.clone()], vec![u]).unwrap().lower();

        assert_eq!(
            program.call(&[]),
            Err(SymbolicError::ArgumentCount {
                expected: 1,
                actual: 0
            })
        );
        assert_eq!(
            program.call(&[&[1.0]]),
            Err(SymbolicError::ArgumentSize {
                arg: 0,
                expected: 2,
                actual: 1
            })
        );
    }

    #[test]
    fn empty_output_yields_empty_vector() {
        let u = Vector::symbolic("u", 2);
        let program = Function::new("f", vec![u], vec![Vector::empty()])
            .unwrap()
            .lower();

        let out = program.call(&[&[1.0, 2.0]]).unwrap();
        assert_eq!(out, vec![Vec::<f64>::new()]);
    }

    #[test]
    fn lowers_deep_chains() {
        let n = 100_000;
        let u = Vector::symbolic("u", n);
        let f = u.iter().fold(Expr::zero(), |e, ui| (e + ui).sin());
        let function = Function::new("f", vec![u.clone()], vec![Vector::from(f.clone())]).unwrap();

        let args: Vec<f64> = (0..n).map(|i| (i % 7) as f64 * 0.1).collect();
        let out = function.lower().call(&[&args]).unwrap();

        let expected = args.iter().fold(0.0, |e: f64, ui| (e + ui).sin());
        assert_relative_eq!(out[0][0], expected, epsilon = 1e-12);
    }
}
