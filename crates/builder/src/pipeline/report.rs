use std::path::PathBuf;

use crate::ToolchainError;

use super::Stage;

/// How a build ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildStatus {
    /// Every stage ran and every toolchain build succeeded.
    Built,

    /// Every stage ran, but a best-effort build tolerated at least one
    /// toolchain failure. See [`BuildReport::toolchain_failures`].
    BuiltWithFailures,

    /// Every stage except the toolchain builds ran.
    Generated,

    /// An observer ended the build early.
    StoppedByObserver,
}

/// A toolchain failure tolerated by a best-effort build.
#[derive(Debug)]
pub struct ToolchainFailure {
    pub stage: Stage,
    pub error: ToolchainError,
}

/// The outcome of a build that did not abort.
#[derive(Debug)]
pub struct BuildReport {
    /// Final build status.
    pub status: BuildStatus,

    /// The target project directory.
    pub target_dir: PathBuf,

    /// Stages that ran to completion, in order.
    pub stages_run: Vec<Stage>,

    /// Every file or directory the build created or overwrote.
    pub outputs: Vec<PathBuf>,

    /// Toolchain failures tolerated by a best-effort build.
    pub toolchain_failures: Vec<ToolchainFailure>,
}

impl BuildReport {
    /// Returns `true` if no toolchain stage failed.
    ///
    /// A build stopped by an observer may have tolerated failures before it
    /// stopped; this checks them regardless of [`BuildReport::status`].
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.toolchain_failures.is_empty()
    }
}
