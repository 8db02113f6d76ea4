//! Orchestration of an optimizer build.
//!
//! # Stages
//!
//! A build runs every [`Stage`] in the order of [`Stage::ALL`], with no
//! reordering and no rollback:
//!
//! 1. [`Stage::PrepareTarget`]: clean or reuse the target directory
//! 2. [`Stage::MaterializeRuntime`]: copy the runtime-support crate
//! 3. [`Stage::RenderManifest`]: write `Cargo.toml`
//! 4. [`Stage::RenderConfigHeader`]: write `icasadi_config.h`
//! 5. [`Stage::GenerateKernels`]: lower the kernels and move them into place
//! 6. [`Stage::BuildRuntime`]: build the runtime-support crate
//! 7. [`Stage::RenderSolver`]: write `src/lib.rs`
//! 8. [`Stage::BuildProject`]: build the complete project
//!
//! The problem, configuration, and kernel signatures are all checked before
//! stage 1, so malformed input never touches the file system.
//!
//! # Toolchain failures
//!
//! A failed toolchain stage aborts the build with [`BuildError::Toolchain`].
//! With [`OptimizerBuilder::with_best_effort_build`] the failure is recorded
//! in [`BuildReport::toolchain_failures`] instead, the build continues, and
//! it ends as [`BuildStatus::BuiltWithFailures`]. In generate-only mode both
//! toolchain stages are skipped.
//!
//! # Observer Events
//!
//! - [`Event::StageStarted`] and [`Event::StageCompleted`] bracket every stage
//!   that runs
//! - [`Event::Skipped`] replaces them for skipped toolchain stages
//! - [`Event::ToolchainFailed`] is emitted when a toolchain stage fails
//!
//! Observers can return [`Action::Stop`] from any event to end the build once
//! the current stage is done.

mod action;
mod event;
mod report;
mod stage;


pub use action::Action;
pub use event::Event;
pub use report::{BuildReport, BuildStatus, ToolchainFailure};
pub use stage::Stage;

use std::path::{Path, PathBuf};

use jiff::Timestamp;
use tracing::{debug, info, info_span, warn};

use optigen_core::{
    Observer, Problem, augment,
    config::{BuildConfiguration, OptimizerMeta, SolverConfiguration},
};

use crate::{
    BuildError, Cargo, KernelGenerator, Staging, TargetProject, Toolchain, ToolchainError,
    bundled_runtime, materialize_runtime, prepare,
    templates::{
        Bindings, ConfigHeaderTemplate, Dimensions, ManifestTemplate, SolverTemplate,
        write_rendered,
    },
};

/// Builds a native optimizer from a [`Problem`].
///
/// # Example
///
/// ```no_run
/// use optigen_builder::OptimizerBuilder;
/// use optigen_core::{Problem, config::OptimizerMeta, functions::rosenbrock, symbolic::Vector};
///
/// let u = Vector::symbolic("u", 5);
/// let p = Vector::symbolic("p", 2);
/// let cost = rosenbrock(&u, &p)?;
/// let problem = Problem::new(u, p, cost)?;
///
/// let report = OptimizerBuilder::new(problem)
///     .with_meta(OptimizerMeta::new("rosenbrock")?)
///     .build()?;
/// println!("built {}", report.target_dir.display());
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct OptimizerBuilder {
    problem: Problem,
    meta: OptimizerMeta,
    build_config: BuildConfiguration,
    solver_config: SolverConfiguration,
    generate_only: bool,
    best_effort_build: bool,
    staging_parent: Option<PathBuf>,
    toolchain: Box<dyn Toolchain>,
    timestamp: Option<Timestamp>,
}

impl OptimizerBuilder {
    /// Creates a builder with default configuration and the `cargo` toolchain.
    #[must_use]
    pub fn new(problem: Problem) -> Self {
        Self {
            problem,
            meta: OptimizerMeta::default(),
            build_config: BuildConfiguration::default(),
            solver_config: SolverConfiguration::default(),
            generate_only: false,
            best_effort_build: false,
            staging_parent: None,
            toolchain: Box::new(Cargo::default()),
            timestamp: None,
        }
    }

    #[must_use]
    pub fn with_meta(mut self, meta: OptimizerMeta) -> Self {
        self.meta = meta;
        self
    }

    #[must_use]
    pub fn with_build_config(mut self, config: BuildConfiguration) -> Self {
        self.build_config = config;
        self
    }

    #[must_use]
    pub fn with_solver_config(mut self, config: SolverConfiguration) -> Self {
        self.solver_config = config;
        self
    }

    /// Writes every generated file but skips both toolchain builds.
    #[must_use]
    pub fn with_generate_only(mut self, generate_only: bool) -> Self {
        self.generate_only = generate_only;
        self
    }

    /// Records toolchain build failures and continues instead of aborting.
    #[must_use]
    pub fn with_best_effort_build(mut self, best_effort: bool) -> Self {
        self.best_effort_build = best_effort;
        self
    }

    /// Creates the per-build staging directory inside `dir`.
    #[must_use]
    pub fn with_staging_parent(mut self, dir: impl Into<PathBuf>) -> Self {
        self.staging_parent = Some(dir.into());
        self
    }

    #[must_use]
    pub fn with_toolchain(mut self, toolchain: impl Toolchain + 'static) -> Self {
        self.toolchain = Box::new(toolchain);
        self
    }

    /// Fixes the timestamp written into the configuration header.
    ///
    /// Defaults to the time the build starts.
    #[must_use]
    pub fn with_timestamp(mut self, timestamp: Timestamp) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Runs the build without observer support.
    ///
    /// # Errors
    ///
    /// See [`OptimizerBuilder::build_observed`].
    pub fn build(&self) -> Result<BuildReport, BuildError> {
        self.build_observed(())
    }

    /// Runs the build, reporting each stage to `observer`.
    ///
    /// See the [module docs](self) for event timing and observer actions.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is malformed, a file-system operation
    /// fails, or a toolchain stage fails in a build that is not best-effort.
    pub fn build_observed<Obs>(&self, mut observer: Obs) -> Result<BuildReport, BuildError>
    where
        Obs: for<'a> Observer<Event<'a>, Action>,
    {
        let span = info_span!("build", optimizer = self.meta.optimizer_name());
        let _guard = span.enter();

        self.meta.validate()?;
        self.build_config.validate()?;
        self.solver_config.validate()?;

        let augmented = augment(&self.problem)?;
        let generator = KernelGenerator::new(&augmented, &self.build_config)?;

        let origin = self
            .build_config
            .runtime_origin()
            .map_or_else(bundled_runtime, Path::to_path_buf);
        if !origin.is_dir() {
            return Err(BuildError::MissingRuntimeOrigin(origin));
        }

        let target = TargetProject::resolve(self.build_config.build_dir(), &self.meta)?;
        let staging = Staging::acquire(self.staging_parent.as_deref())?;
        let dimensions = Dimensions::of(&augmented);

        info!(
            target = %target.dir().display(),
            n_u = dimensions.decision_variables,
            n_p = dimensions.original_parameters,
            n_c = dimensions.constraints,
            "starting build",
        );

        let run = Run {
            builder: self,
            target: &target,
            origin: &origin,
            generator: &generator,
            staging: &staging,
            bindings: Bindings {
                meta: &self.meta,
                build: &self.build_config,
                solver: &self.solver_config,
                constraints: augmented.constraints(),
                dimensions,
                timestamp: self.timestamp.unwrap_or_else(Timestamp::now),
            },
        };

        let mut report = BuildReport {
            status: if self.generate_only {
                BuildStatus::Generated
            } else {
                BuildStatus::Built
            },
            target_dir: target.dir().to_path_buf(),
            stages_run: Vec::new(),
            outputs: Vec::new(),
            toolchain_failures: Vec::new(),
        };

        for stage in Stage::ALL {
            let stop = if stage.invokes_toolchain() && self.generate_only {
                debug!(%stage, "skipped");
                is_stop(observer.observe(&Event::Skipped { stage }))
            } else {
                let mut stop = is_stop(observer.observe(&Event::StageStarted { stage }));
                info!(%stage, "stage started");

                match run.execute(stage) {
                    Ok(outputs) => {
                        stop |= is_stop(observer.observe(&Event::StageCompleted {
                            stage,
                            outputs: &outputs,
                        }));
                        report.stages_run.push(stage);
                        report.outputs.extend(outputs);
                    }
                    Err(StageError::Toolchain(error)) => {
                        stop |= is_stop(observer.observe(&Event::ToolchainFailed {
                            stage,
                            error: &error,
                        }));
                        if !self.best_effort_build {
                            return Err(BuildError::Toolchain {
                                stage,
                                source: error,
                            });
                        }
                        warn!(%stage, %error, "toolchain failed, continuing best-effort build");
                        report.toolchain_failures.push(ToolchainFailure { stage, error });
                    }
                    Err(StageError::Build(error)) => return Err(error),
                }
                stop
            };

            if stop {
                info!(%stage, "stopped by observer");
                report.status = BuildStatus::StoppedByObserver;
                break;
            }
        }

        if report.status == BuildStatus::Built && !report.toolchain_failures.is_empty() {
            report.status = BuildStatus::BuiltWithFailures;
        }

        info!(status = ?report.status, "build finished");
        Ok(report)
    }
}

fn is_stop(action: Option<Action>) -> bool {
    matches!(action, Some(Action::Stop))
}

/// A stage failure that a best-effort build may tolerate, or one it may not.
enum StageError {
    Toolchain(ToolchainError),
    Build(BuildError),
}

impl From<BuildError> for StageError {
    fn from(error: BuildError) -> Self {
        Self::Build(error)
    }
}

/// The resolved inputs of one build.
struct Run<'a> {
    builder: &'a OptimizerBuilder,
    target: &'a TargetProject,
    origin: &'a Path,
    generator: &'a KernelGenerator,
    staging: &'a Staging,
    bindings: Bindings<'a>,
}

impl Run<'_> {
    /// Runs one stage and returns the paths it wrote.
    fn execute(&self, stage: Stage) -> Result<Vec<PathBuf>, StageError> {
        let target = self.target;
        let config = &self.builder.build_config;
        let toolchain = self.builder.toolchain.as_ref();

        let outputs = match stage {
            Stage::PrepareTarget => {
                prepare(target, config.rebuild(), toolchain)?;
                vec![target.dir().to_path_buf()]
            }
            Stage::MaterializeRuntime => {
                materialize_runtime(self.origin, target)?;
                vec![target.runtime_dir()]
            }
            Stage::RenderManifest => {
                vec![write_rendered(&ManifestTemplate, &self.bindings, target.dir())?]
            }
            Stage::RenderConfigHeader => {
                vec![write_rendered(&ConfigHeaderTemplate, &self.bindings, target.dir())?]
            }
            Stage::GenerateKernels => self
                .generator
                .generate(self.staging.path())?
                .relocate(&target.extern_dir())?
                .iter()
                .map(|artifact| artifact.path().to_path_buf())
                .collect(),
            Stage::BuildRuntime => {
                toolchain
                    .build(&target.runtime_dir(), config.build_mode())
                    .map_err(StageError::Toolchain)?;
                Vec::new()
            }
            Stage::RenderSolver => {
                vec![write_rendered(&SolverTemplate, &self.bindings, target.dir())?]
            }
            Stage::BuildProject => {
                toolchain
                    .build(target.dir(), config.build_mode())
                    .map_err(StageError::Toolchain)?;
                Vec::new()
            }
        };

        Ok(outputs)
    }
}
