use std::{io, path::PathBuf};

use thiserror::Error;

use optigen_core::{ProblemError, config::ConfigError};
use optigen_symbolic::SymbolicError;

use crate::Stage;

/// Errors that abort an optimizer build.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error(transparent)]
    Problem(#[from] ProblemError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Symbolic(#[from] SymbolicError),

    /// The resolved target directory is not strictly inside the build root.
    #[error("target {target} is not inside build root {root}")]
    OutsideBuildRoot { root: PathBuf, target: PathBuf },

    /// The runtime-support origin directory does not exist.
    #[error("runtime-support origin {0} is not a directory")]
    MissingRuntimeOrigin(PathBuf),

    /// A generated kernel could not be moved into the target project.
    #[error("failed to move {from} to {to}")]
    Relocate {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Any other file-system failure.
    #[error("failed to {action} {path}")]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to copy runtime-support files")]
    Copy(#[from] walkdir::Error),

    #[error(transparent)]
    Render(#[from] RenderError),

    /// The external toolchain failed during a stage.
    #[error("stage {stage} failed")]
    Toolchain {
        stage: Stage,
        #[source]
        source: ToolchainError,
    },
}

impl BuildError {
    pub(crate) fn io(action: &'static str, path: impl Into<PathBuf>) -> impl FnOnce(io::Error) -> Self {
        let path = path.into();
        move |source| Self::Io {
            action,
            path,
            source,
        }
    }
}

/// Errors from rendering a template.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to serialize manifest")]
    Manifest(#[from] toml::ser::Error),

    #[error("generated Rust source does not parse")]
    Syntax(#[from] syn::Error),

    #[error("failed to format template `{0}`")]
    Format(&'static str),

    #[error("`{0}` must be finite to be rendered")]
    NonFinite(&'static str),
}

/// Errors from running the external toolchain.
#[derive(Debug, Error)]
pub enum ToolchainError {
    /// The toolchain could not be started.
    #[error("failed to run `{command}`")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },

    /// The toolchain ran and reported failure.
    #[error("`{command}` failed with {status}")]
    Failed { command: String, status: String },

    /// A file of the initial project skeleton could not be written.
    #[error("failed to write project skeleton file {}", path.display())]
    Skeleton {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
