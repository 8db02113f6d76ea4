//! Rendering of the generated project's non-kernel files.
//!
//! A [`Template`] is a pure function from [`Bindings`] to text. The build
//! writes each rendered template to a fixed path inside the target project:
//!
//! | template                 | path                              |
//! |--------------------------|-----------------------------------|
//! | [`ManifestTemplate`]     | `Cargo.toml`                      |
//! | [`ConfigHeaderTemplate`] | `icasadi/extern/icasadi_config.h` |
//! | [`SolverTemplate`]       | `src/lib.rs`                      |
//!
//! Rendering the same template with the same bindings always yields the same
//! bytes. The only non-structural input is [`Bindings::timestamp`].

mod header;
mod manifest;
mod solver;

use std::{
    fs,
    path::{Path, PathBuf},
};

use jiff::Timestamp;
use tracing::debug;

use optigen_core::{
    AugmentedProblem, Constraints,
    config::{BuildConfiguration, OptimizerMeta, SolverConfiguration},
};

use crate::{BuildError, RenderError};

pub use header::ConfigHeaderTemplate;
pub use manifest::ManifestTemplate;
pub use solver::SolverTemplate;

/// A file rendered from build inputs.
pub trait Template {
    /// Stable identifier of the template.
    fn id(&self) -> &'static str;

    /// Output path relative to the target project directory.
    fn path(&self) -> &'static str;

    /// Renders the template.
    ///
    /// # Errors
    ///
    /// Returns an error if the bindings cannot be rendered.
    fn render(&self, bindings: &Bindings<'_>) -> Result<String, RenderError>;
}

/// Problem dimensions after augmentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    /// `n_u`
    pub decision_variables: usize,

    /// Length of the augmented parameter vector, `n_p + n_c`.
    pub parameters: usize,

    /// `n_p`
    pub original_parameters: usize,

    /// `n_c`
    pub constraints: usize,
}

impl Dimensions {
    #[must_use]
    pub fn of(problem: &AugmentedProblem) -> Self {
        Self {
            decision_variables: problem.decision_variables().len(),
            parameters: problem.parameters().len(),
            original_parameters: problem.original_parameters().len(),
            constraints: problem.penalty_constraints().len(),
        }
    }
}

/// Everything a template may read.
#[derive(Debug, Clone, Copy)]
pub struct Bindings<'a> {
    pub meta: &'a OptimizerMeta,
    pub build: &'a BuildConfiguration,
    pub solver: &'a SolverConfiguration,
    pub constraints: &'a Constraints,
    pub dimensions: Dimensions,
    pub timestamp: Timestamp,
}

/// Renders `template` and writes it below `target_dir`, creating parent
/// directories as needed. Returns the path written.
///
/// # Errors
///
/// Returns an error if rendering or writing fails.
pub fn write_rendered(
    template: &dyn Template,
    bindings: &Bindings<'_>,
    target_dir: &Path,
) -> Result<PathBuf, BuildError> {
    let text = template.render(bindings)?;
    let path = target_dir.join(template.path());

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(BuildError::io("create", parent))?;
    }
    fs::write(&path, text).map_err(BuildError::io("write", &path))?;

    debug!(template = template.id(), path = %path.display(), "rendered template");
    Ok(path)
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub(crate) struct Inputs {
        pub meta: OptimizerMeta,
        pub build: BuildConfiguration,
        pub solver: SolverConfiguration,
        pub constraints: Constraints,
    }

    impl Default for Inputs {
        fn default() -> Self {
            Self {
                meta: OptimizerMeta::new("rosenbrock").unwrap(),
                build: BuildConfiguration::default(),
                solver: SolverConfiguration::default(),
                constraints: Constraints::None,
            }
        }
    }

    impl Inputs {
        pub(crate) fn bindings(&self) -> Bindings<'_> {
            Bindings {
                meta: &self.meta,
                build: &self.build,
                solver: &self.solver,
                constraints: &self.constraints,
                dimensions: Dimensions {
                    decision_variables: 5,
                    parameters: 4,
                    original_parameters: 2,
                    constraints: 2,
                },
                timestamp: "2024-03-01T12:00:00Z".parse().unwrap(),
            }
        }
    }
}
