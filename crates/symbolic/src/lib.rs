//! Symbolic expressions for describing and lowering numerical kernels.
//!
//! This crate provides the small amount of computer algebra that optigen
//! needs to turn a symbolic optimization problem into native code:
//!
//! - [`Symbol`], [`Expr`], [`Vector`]: immutable scalar expressions and
//!   column vectors of them, with overloaded arithmetic
//! - [`differentiate`] and [`Expr::gradient`]: reverse-mode symbolic
//!   derivatives
//! - [`Bindings`]: numeric evaluation of expressions
//! - [`Function`] and [`Program`]: a named mapping from input vectors to
//!   output vectors, lowered to a flat instruction list that can be both
//!   interpreted and emitted as C source
//!
//! Expressions are built structurally and only constant-folded, so the same
//! construction always yields the same expression. That keeps derivatives and
//! generated sources reproducible across builds.

mod diff;
mod error;
mod eval;
mod expr;
mod function;
mod ident;
mod symbol;
mod vector;

pub use diff::differentiate;
pub use error::SymbolicError;
pub use eval::Bindings;
pub use expr::{Expr, Node, UnaryFn};
pub use function::{Function, Op, Program, lower};
pub use ident::is_c_identifier;
pub use symbol::Symbol;
pub use vector::Vector;
