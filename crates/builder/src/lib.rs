//! Turns an optigen [`Problem`](optigen_core::Problem) into a native optimizer
//! project and builds it.
//!
//! A build runs a fixed sequence of [`Stage`]s against a target directory
//! `<build_dir>/<optimizer_name>/`:
//!
//! ```text
//! <optimizer_name>/
//!   Cargo.toml                      rendered from OptimizerMeta
//!   src/lib.rs                      rendered from SolverConfiguration
//!   icasadi/                        runtime-support crate, copied fresh
//!     extern/icasadi_config.h       rendered dimensions and kernel names
//!     extern/auto_casadi_cost.c
//!     extern/auto_casadi_grad.c
//!     extern/auto_casadi_constraints_type_penalty.c
//! ```
//!
//! [`OptimizerBuilder`] is the entry point. The individual stages are also
//! exposed so they can be run and tested in isolation:
//!
//! - [`KernelGenerator`] lowers the cost, gradient, and constraint kernels
//! - [`TargetProject`], [`prepare`], and [`materialize_runtime`] manage the
//!   target directory
//! - [`templates`] renders the manifest, the configuration header, and the
//!   solver source
//! - [`Toolchain`] runs the external build tool; [`Cargo`] is the default

mod error;
mod kernels;
mod pipeline;
mod scaffold;
mod staging;
mod toolchain;

pub mod templates;

pub use error::{BuildError, RenderError, ToolchainError};
pub use kernels::{GeneratedArtifact, KernelGenerator, KernelKind, Kernels};
pub use pipeline::{
    Action, BuildReport, BuildStatus, Event, OptimizerBuilder, Stage, ToolchainFailure,
};
pub use scaffold::{
    ProjectState, TargetProject, bundled_runtime, materialize_runtime, prepare,
};
pub use staging::Staging;
pub use toolchain::{Cargo, Toolchain};
