//! Configuration consumed by an optimizer build.
//!
//! - [`OptimizerMeta`]: name and package metadata of the generated optimizer
//! - [`BuildConfiguration`]: where and how the optimizer is built, and the
//!   names of the generated kernels
//! - [`SolverConfiguration`]: solver tuning, passed through to the generated
//!   solver source
//! - [`Settings`]: all three, loadable from a TOML file
//!
//! Each type has sensible defaults and a `validate` method; the build calls
//! it before touching the file system.

mod build;
mod meta;
mod settings;
mod solver;

use thiserror::Error;

pub use build::{BuildConfiguration, BuildMode, RebuildPolicy};
pub use meta::OptimizerMeta;
pub use settings::Settings;
pub use solver::SolverConfiguration;

/// Errors that can occur when validating configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("optimizer name `{0}` must match [A-Za-z_][A-Za-z0-9_]*")]
    InvalidName(String),

    #[error("{role} function name `{name}` is not a valid C identifier or is reserved")]
    InvalidIdentifier { role: &'static str, name: String },

    #[error("build_dir must not be empty")]
    EmptyBuildDir,

    #[error("function name `{0}` is used for more than one kernel")]
    DuplicateFunctionName(String),

    #[error("tolerance must be finite and positive")]
    Tolerance,

    #[error("lbfgs_memory must be at least 1")]
    LbfgsMemory,

    #[error("max_iterations must be at least 1")]
    MaxIterations,

    #[error("penalty_weight_initial must be finite and non-negative")]
    PenaltyWeight,

    #[error("failed to read settings from {path}: {reason}")]
    Read { path: String, reason: String },

    #[error("failed to parse settings: {0}")]
    Parse(String),
}
