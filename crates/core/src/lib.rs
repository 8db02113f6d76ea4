//! Core types for describing parametric optimization problems to optigen.
//!
//! This crate defines what a build consumes, independent of how the build is
//! carried out:
//!
//! - [`Problem`]: decision variables, parameters, a scalar cost, and
//!   penalty-type constraints, all as symbolic values
//! - [`Constraints`]: hard constraint sets the solver projects onto
//! - [`PenaltyFunction`]: how constraint values are turned into penalties
//! - [`augment`]: folds the penalty into the cost, producing an
//!   [`AugmentedProblem`] for an unconstrained solver
//! - [`config`]: optimizer metadata, build settings, and solver tuning
//! - [`Observer`]: receives pipeline events and optionally returns actions
//! - [`functions`]: sample cost functions

mod augment;
mod constraints;
mod error;
mod observer;
mod penalty;
mod problem;

pub mod config;
pub mod functions;

pub use augment::{AugmentedProblem, augment};
pub use constraints::Constraints;
pub use error::ProblemError;
pub use observer::Observer;
pub use penalty::PenaltyFunction;
pub use problem::Problem;

pub use optigen_symbolic as symbolic;
