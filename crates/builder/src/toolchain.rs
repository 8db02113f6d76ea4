use std::{
    fs, io,
    path::{Path, PathBuf},
    process::Command,
};

use tracing::{debug, info};

use optigen_core::config::BuildMode;

use crate::ToolchainError;

/// The external build tool that initializes and compiles generated projects.
///
/// Every call blocks until the tool exits. Implementations report failure
/// through the returned `Result`; the pipeline decides whether a failure is
/// fatal.
pub trait Toolchain {
    /// Initializes an empty library project named `name` in `dir`.
    ///
    /// Must not write anything outside `dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if the project cannot be initialized.
    fn init(&self, dir: &Path, name: &str) -> Result<(), ToolchainError>;

    /// Builds the project in `dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if the tool cannot be started or reports failure.
    fn build(&self, dir: &Path, mode: BuildMode) -> Result<(), ToolchainError>;
}

/// Runs `cargo`.
///
/// Initialization writes the project skeleton directly and touches nothing
/// outside the project directory; an enclosing workspace manifest is never
/// edited. The skeleton manifest declares its own empty `[workspace]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cargo {
    program: PathBuf,
}

impl Default for Cargo {
    fn default() -> Self {
        Self {
            program: PathBuf::from("cargo"),
        }
    }
}

impl Cargo {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `program` instead of the `cargo` found on `PATH`.
    #[must_use]
    pub fn with_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = program.into();
        self
    }

    #[must_use]
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Returns the arguments of a build in `mode`.
    fn build_args(mode: BuildMode) -> &'static [&'static str] {
        match mode {
            BuildMode::Debug => &["build"],
            BuildMode::Release => &["build", "--release"],
        }
    }

    fn describe(&self, args: &[&str]) -> String {
        let mut command = self.program.display().to_string();
        for arg in args {
            command.push(' ');
            command.push_str(arg);
        }
        command
    }

    fn run(&self, dir: &Path, args: &[&str]) -> Result<(), ToolchainError> {
        let command = self.describe(args);
        debug!(%command, dir = %dir.display(), "running toolchain");

        let status = Command::new(&self.program)
            .args(args)
            .current_dir(dir)
            .status()
            .map_err(|source| ToolchainError::Spawn {
                command: command.clone(),
                source,
            })?;

        if status.success() {
            Ok(())
        } else {
            Err(ToolchainError::Failed {
                command,
                status: status.to_string(),
            })
        }
    }
}

/// The manifest of a freshly initialized library project.
fn skeleton_manifest(name: &str) -> String {
    format!(
        "[package]\nname = {}\nversion = \"0.1.0\"\nedition = \"2021\"\n\n[dependencies]\n\n[workspace]\n",
        toml::Value::from(name)
    )
}

fn write_skeleton(path: PathBuf, contents: &str) -> Result<(), ToolchainError> {
    let write = || -> io::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, contents)
    };
    write().map_err(|source| ToolchainError::Skeleton { path, source })
}

impl Toolchain for Cargo {
    fn init(&self, dir: &Path, name: &str) -> Result<(), ToolchainError> {
        debug!(dir = %dir.display(), name, "writing project skeleton");
        write_skeleton(dir.join("Cargo.toml"), &skeleton_manifest(name))?;

        let lib = dir.join("src/lib.rs");
        if !lib.exists() {
            write_skeleton(lib, "")?;
        }
        Ok(())
    }

    fn build(&self, dir: &Path, mode: BuildMode) -> Result<(), ToolchainError> {
        info!(dir = %dir.display(), ?mode, "building");
        self.run(dir, Self::build_args(mode))
    }
}
