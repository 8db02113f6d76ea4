use std::path::{Path, PathBuf};

use optigen_symbolic::is_c_identifier;
use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Names the runtime-support crate defines in the same C translation units
/// as the kernels: its configuration macros and everything it prefixes with
/// `icasadi_`/`ICASADI_`.
const RUNTIME_MACROS: &[&str] = &["NU", "NP", "NP_ORIGINAL", "NUM_CONSTRAINTS_TYPE_PENALTY"];
const RUNTIME_PREFIXES: &[&str] = &["icasadi_", "ICASADI_"];

/// Suffixes of the helper functions emitted next to every kernel.
const KERNEL_HELPER_SUFFIXES: &[&str] = &["_n_in", "_n_out", "_size_in", "_size_out", "_work"];

/// Compilation profile for the generated project.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildMode {
    Debug,
    #[default]
    Release,
}

/// What to do with an existing target directory.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RebuildPolicy {
    /// Delete the target directory and start from a fresh project.
    #[default]
    Clean,

    /// Keep the target directory and overwrite only generated files.
    Reuse,
}

/// Where and how the optimizer is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BuildConfiguration {
    build_dir: PathBuf,
    build_mode: BuildMode,
    rebuild: RebuildPolicy,
    cost_function_name: String,
    grad_function_name: String,
    constraint_penalty_function_name: String,
    runtime_origin: Option<PathBuf>,
}

impl Default for BuildConfiguration {
    fn default() -> Self {
        Self {
            build_dir: PathBuf::from("build"),
            build_mode: BuildMode::Release,
            rebuild: RebuildPolicy::Clean,
            cost_function_name: "phi".to_owned(),
            grad_function_name: "grad_phi".to_owned(),
            constraint_penalty_function_name: "constraints_penalty".to_owned(),
            runtime_origin: None,
        }
    }
}

impl BuildConfiguration {
    /// Creates a validated configuration that builds below `build_dir`, with
    /// the default kernel names.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyBuildDir`] if `build_dir` is empty.
    pub fn new(build_dir: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let config = Self::default().with_build_dir(build_dir);
        config.validate()?;
        Ok(config)
    }

    /// Sets the directory under which optimizers are generated.
    #[must_use]
    pub fn with_build_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.build_dir = dir.into();
        self
    }

    #[must_use]
    pub fn with_build_mode(mut self, mode: BuildMode) -> Self {
        self.build_mode = mode;
        self
    }

    #[must_use]
    pub fn with_rebuild(mut self, rebuild: RebuildPolicy) -> Self {
        self.rebuild = rebuild;
        self
    }

    #[must_use]
    pub fn with_cost_function_name(mut self, name: impl Into<String>) -> Self {
        self.cost_function_name = name.into();
        self
    }

    #[must_use]
    pub fn with_grad_function_name(mut self, name: impl Into<String>) -> Self {
        self.grad_function_name = name.into();
        self
    }

    #[must_use]
    pub fn with_constraint_penalty_function_name(mut self, name: impl Into<String>) -> Self {
        self.constraint_penalty_function_name = name.into();
        self
    }

    /// Copies the runtime-support crate from `dir` instead of the bundled one.
    #[must_use]
    pub fn with_runtime_origin(mut self, dir: impl Into<PathBuf>) -> Self {
        self.runtime_origin = Some(dir.into());
        self
    }

    #[must_use]
    pub fn build_dir(&self) -> &Path {
        &self.build_dir
    }

    #[must_use]
    pub fn build_mode(&self) -> BuildMode {
        self.build_mode
    }

    #[must_use]
    pub fn rebuild(&self) -> RebuildPolicy {
        self.rebuild
    }

    #[must_use]
    pub fn cost_function_name(&self) -> &str {
        &self.cost_function_name
    }

    #[must_use]
    pub fn grad_function_name(&self) -> &str {
        &self.grad_function_name
    }

    #[must_use]
    pub fn constraint_penalty_function_name(&self) -> &str {
        &self.constraint_penalty_function_name
    }

    #[must_use]
    pub fn runtime_origin(&self) -> Option<&Path> {
        self.runtime_origin.as_deref()
    }

    /// Checks the build directory and the kernel function names.
    ///
    /// # Errors
    ///
    /// Returns an error if the build directory is empty, if a name is not a
    /// valid C identifier or is reserved by the runtime-support crate, or if
    /// two kernels would define the same C symbol.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.build_dir.as_os_str().is_empty() {
            return Err(ConfigError::EmptyBuildDir);
        }

        let names = [
            ("cost", &self.cost_function_name),
            ("gradient", &self.grad_function_name),
            ("constraint penalty", &self.constraint_penalty_function_name),
        ];

        for (role, name) in names {
            if !is_c_identifier(name) || is_runtime_name(name) {
                return Err(ConfigError::InvalidIdentifier {
                    role,
                    name: name.clone(),
                });
            }
        }

        for (i, (_, a)) in names.iter().enumerate() {
            if names[i + 1..].iter().any(|(_, b)| a == b) {
                return Err(ConfigError::DuplicateFunctionName((*a).clone()));
            }
        }

        // `phi_n_in` is emitted for a kernel named `phi`.
        for (role, name) in names {
            let clashes = names.iter().any(|(_, other)| {
                KERNEL_HELPER_SUFFIXES
                    .iter()
                    .any(|suffix| name.strip_suffix(suffix) == Some(other.as_str()))
            });
            if clashes {
                return Err(ConfigError::InvalidIdentifier {
                    role,
                    name: name.clone(),
                });
            }
        }

        Ok(())
    }
}

fn is_runtime_name(name: &str) -> bool {
    RUNTIME_MACROS.contains(&name) || RUNTIME_PREFIXES.iter().any(|p| name.starts_with(p))
}
