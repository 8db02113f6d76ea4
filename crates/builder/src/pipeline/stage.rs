use std::fmt;

/// One step of an optimizer build, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Create or clean the target directory and initialize a project in it.
    PrepareTarget,

    /// Copy the runtime-support crate into the target project.
    MaterializeRuntime,

    /// Render the project manifest.
    RenderManifest,

    /// Render the runtime-support configuration header.
    RenderConfigHeader,

    /// Generate the kernels and move them into the runtime-support crate.
    GenerateKernels,

    /// Build the runtime-support crate.
    BuildRuntime,

    /// Render the solver source of the main project.
    RenderSolver,

    /// Build the complete project.
    BuildProject,
}

impl Stage {
    /// Every stage, in the order a build runs them.
    pub const ALL: [Self; 8] = [
        Self::PrepareTarget,
        Self::MaterializeRuntime,
        Self::RenderManifest,
        Self::RenderConfigHeader,
        Self::GenerateKernels,
        Self::BuildRuntime,
        Self::RenderSolver,
        Self::BuildProject,
    ];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::PrepareTarget => "prepare-target",
            Self::MaterializeRuntime => "materialize-runtime",
            Self::RenderManifest => "render-manifest",
            Self::RenderConfigHeader => "render-config-header",
            Self::GenerateKernels => "generate-kernels",
            Self::BuildRuntime => "build-runtime",
            Self::RenderSolver => "render-solver",
            Self::BuildProject => "build-project",
        }
    }

    /// Whether the stage compiles code with the external toolchain.
    ///
    /// These are the stages skipped in generate-only mode.
    #[must_use]
    pub fn invokes_toolchain(self) -> bool {
        matches!(self, Self::BuildRuntime | Self::BuildProject)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}
