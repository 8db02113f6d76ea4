//! Shared fixtures for the workspace integration tests.

use std::{
    collections::BTreeSet,
    fs,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

use optigen_builder::{Toolchain, ToolchainError};
use optigen_core::{
    PenaltyFunction, Problem,
    config::BuildMode,
    symbolic::{Expr, Vector},
};
use walkdir::WalkDir;

/// A toolchain call, identified by the directory name it ran in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Init(String),
    Build(String, BuildMode),
}

/// A stand-in for `cargo` that records its calls.
///
/// `init` lays down the same skeleton as `cargo init --lib` and `build`
/// creates an empty `target/` directory.
#[derive(Debug, Clone, Default)]
pub struct RecordingToolchain {
    calls: Arc<Mutex<Vec<Call>>>,
}

impl RecordingToolchain {
    #[must_use]
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().map(|calls| calls.clone()).unwrap_or_default()
    }

    fn record(&self, call: Call) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
    }
}

fn dir_name(dir: &Path) -> String {
    dir.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn spawn_error(command: &str) -> impl FnOnce(std::io::Error) -> ToolchainError {
    let command = command.to_owned();
    move |source| ToolchainError::Spawn { command, source }
}

impl Toolchain for RecordingToolchain {
    fn init(&self, dir: &Path, name: &str) -> Result<(), ToolchainError> {
        self.record(Call::Init(name.to_owned()));
        fs::create_dir_all(dir.join("src")).map_err(spawn_error("init"))?;
        fs::write(
            dir.join("Cargo.toml"),
            format!("[package]\nname = \"{name}\"\nversion = \"0.1.0\"\n"),
        )
        .map_err(spawn_error("init"))?;
        fs::write(dir.join("src/lib.rs"), "").map_err(spawn_error("init"))
    }

    fn build(&self, dir: &Path, mode: BuildMode) -> Result<(), ToolchainError> {
        self.record(Call::Build(dir_name(dir), mode));
        fs::create_dir_all(dir.join("target")).map_err(spawn_error("build"))
    }
}

/// Every file below `dir`, relative to it.
#[must_use]
pub fn files_below(dir: &Path) -> BTreeSet<PathBuf> {
    WalkDir::new(dir)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .filter_map(|entry| {
            entry
                .path()
                .strip_prefix(dir)
                .ok()
                .map(Path::to_path_buf)
        })
        .collect()
}

/// `(a - u₀)² + b (u₁ - u₀²)²` with constant `a = 1` and `b = 100`.
#[must_use]
pub fn unconstrained_rosenbrock() -> Problem {
    let u = Vector::symbolic("u", 2);
    let cost = (1.0 - &u[0]).powi(2) + 100.0 * (&u[1] - u[0].powi(2)).powi(2);
    Problem::new(u, Vector::empty(), cost).expect("valid problem")
}

/// A parametric Rosenbrock problem with three equality constraints.
///
/// Decision variables `u ∈ ℝ³`, parameters `p = [a, b]`, and
/// `c(u, p) = [u₀ + u₁ - 1, u₂ - a, sin(u₀) u₂]`.
#[must_use]
pub fn constrained_rosenbrock() -> Problem {
    let u = Vector::symbolic("u", 3);
    let p = Vector::symbolic("p", 2);
    let cost = u
        .entries()
        .windows(2)
        .map(|w| &p[1] * (&w[1] - w[0].powi(2)).powi(2) + (&p[0] - &w[0]).powi(2))
        .sum::<Expr>();
    let constraints = Vector::new(vec![
        &u[0] + &u[1] - 1.0,
        &u[2] - &p[0],
        u[0].sin() * &u[2],
    ]);

    Problem::new(u, p, cost)
        .and_then(|problem| {
            problem.with_penalty_constraints(constraints, PenaltyFunction::SumOfSquares)
        })
        .expect("valid problem")
}
