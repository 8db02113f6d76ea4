use std::path::PathBuf;

use crate::ToolchainError;

use super::Stage;

/// Events emitted while an optimizer build runs.
#[derive(Debug)]
pub enum Event<'a> {
    /// A stage is about to run.
    StageStarted { stage: Stage },

    /// A stage finished.
    StageCompleted {
        stage: Stage,

        /// Files and directories the stage created or overwrote.
        outputs: &'a [PathBuf],
    },

    /// A toolchain stage was skipped because the build is generate-only.
    Skipped { stage: Stage },

    /// The toolchain failed during a stage.
    ///
    /// Emitted before the build aborts, or before it continues when
    /// best-effort builds are enabled.
    ToolchainFailed {
        stage: Stage,
        error: &'a ToolchainError,
    },
}

impl Event<'_> {
    /// Returns the stage the event refers to.
    #[must_use]
    pub fn stage(&self) -> Stage {
        match self {
            Self::StageStarted { stage }
            | Self::StageCompleted { stage, .. }
            | Self::Skipped { stage }
            | Self::ToolchainFailed { stage, .. } => *stage,
        }
    }
}
