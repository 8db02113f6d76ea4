use std::{
    fmt, fs,
    path::{Path, PathBuf},
};

use tracing::debug;

use optigen_core::{AugmentedProblem, config::BuildConfiguration};
use optigen_symbolic::{Function, Program, Vector};

use crate::BuildError;

/// The three numerical kernels of a generated optimizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KernelKind {
    /// `φ̃(u, p̃)`, a scalar.
    Cost,

    /// `∇ᵤ φ̃(u, p̃)`, one entry per decision variable.
    Gradient,

    /// The raw constraints `c(u, p)`, one entry per constraint.
    ConstraintPenalty,
}

impl KernelKind {
    pub const ALL: [Self; 3] = [Self::Cost, Self::Gradient, Self::ConstraintPenalty];

    fn index(self) -> usize {
        self as usize
    }

    /// Fixed file name of the kernel inside the runtime-support `extern/`
    /// directory.
    #[must_use]
    pub fn file_name(self) -> &'static str {
        match self {
            Self::Cost => "auto_casadi_cost.c",
            Self::Gradient => "auto_casadi_grad.c",
            Self::ConstraintPenalty => "auto_casadi_constraints_type_penalty.c",
        }
    }

    /// The configured C symbol name of the kernel.
    #[must_use]
    pub fn function_name(self, config: &BuildConfiguration) -> &str {
        match self {
            Self::Cost => config.cost_function_name(),
            Self::Gradient => config.grad_function_name(),
            Self::ConstraintPenalty => config.constraint_penalty_function_name(),
        }
    }
}

impl fmt::Display for KernelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Cost => "cost",
            Self::Gradient => "gradient",
            Self::ConstraintPenalty => "constraint penalty",
        })
    }
}

/// A lowered kernel and the C source file that holds it.
#[derive(Debug, Clone)]
pub struct GeneratedArtifact {
    kind: KernelKind,
    function_name: String,
    path: PathBuf,
    program: Program,
}

impl GeneratedArtifact {
    #[must_use]
    pub fn kind(&self) -> KernelKind {
        self.kind
    }

    #[must_use]
    pub fn function_name(&self) -> &str {
        &self.function_name
    }

    /// Current location of the source file: the staging directory before
    /// [`Kernels::relocate`], the target project after.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The lowered kernel, which evaluates exactly what the C source computes.
    #[must_use]
    pub fn program(&self) -> &Program {
        &self.program
    }
}

/// The cost, gradient, and constraint-penalty kernels of one build.
#[derive(Debug, Clone)]
pub struct Kernels {
    artifacts: [GeneratedArtifact; 3],
}

impl Kernels {
    #[must_use]
    pub fn get(&self, kind: KernelKind) -> &GeneratedArtifact {
        &self.artifacts[kind.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = &GeneratedArtifact> {
        self.artifacts.iter()
    }

    /// Moves every kernel source into `extern_dir` under its fixed file name.
    ///
    /// The move is the commit point of kernel generation: until it succeeds,
    /// nothing has been written to the target project.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::Relocate`] if `extern_dir` does not exist or a
    /// file cannot be moved.
    pub fn relocate(mut self, extern_dir: &Path) -> Result<Self, BuildError> {
        for artifact in &mut self.artifacts {
            let destination = extern_dir.join(artifact.kind.file_name());

            if !extern_dir.is_dir() {
                return Err(BuildError::Relocate {
                    from: artifact.path.clone(),
                    to: destination,
                    source: std::io::Error::new(
                        std::io::ErrorKind::NotFound,
                        "destination directory does not exist",
                    ),
                });
            }

            move_file(&artifact.path, &destination).map_err(|source| BuildError::Relocate {
                from: artifact.path.clone(),
                to: destination.clone(),
                source,
            })?;

            debug!(kernel = %artifact.kind, path = %destination.display(), "relocated kernel");
            artifact.path = destination;
        }

        Ok(self)
    }
}

/// Renames `from` to `to`, falling back to copy-then-remove when a rename is
/// not possible (for example across file systems).
fn move_file(from: &Path, to: &Path) -> std::io::Result<()> {
    if fs::rename(from, to).is_ok() {
        return Ok(());
    }
    fs::copy(from, to)?;
    fs::remove_file(from)
}

/// Derives the numerical kernels of an augmented problem.
///
/// ```text
/// cost                (u, p̃)  -> [φ̃]
/// gradient            (u, p̃)  -> ∇ᵤ φ̃
/// constraint penalty  (u, p)  -> c
/// ```
///
/// The gradient differentiates with respect to `u` only; parameters are plain
/// inputs. The constraint-penalty kernel reads only the original parameters,
/// which form a prefix of `p̃`, so a caller may pass either vector. It is
/// generated even for an unconstrained problem, with a zero-length output.
#[derive(Debug, Clone)]
pub struct KernelGenerator {
    functions: [(KernelKind, Function); 3],
}

impl KernelGenerator {
    /// Defines the kernel functions without writing anything.
    ///
    /// # Errors
    ///
    /// Returns an error if a kernel name is not a valid C identifier or a
    /// kernel would read a symbol that is not one of its inputs.
    pub fn new(
        problem: &AugmentedProblem,
        config: &BuildConfiguration,
    ) -> Result<Self, BuildError> {
        let u = problem.decision_variables();
        let p = problem.parameters();
        let cost = problem.cost();

        let cost_fn = Function::new(
            config.cost_function_name(),
            vec![u.clone(), p.clone()],
            vec![Vector::from(cost.clone())],
        )?;

        let grad_fn = Function::new(
            config.grad_function_name(),
            vec![u.clone(), p.clone()],
            vec![cost.gradient(u)?],
        )?;

        let penalty_fn = Function::new(
            config.constraint_penalty_function_name(),
            vec![u.clone(), problem.original_parameters().clone()],
            vec![problem.penalty_constraints().clone()],
        )?;

        Ok(Self {
            functions: [
                (KernelKind::Cost, cost_fn),
                (KernelKind::Gradient, grad_fn),
                (KernelKind::ConstraintPenalty, penalty_fn),
            ],
        })
    }

    #[must_use]
    pub fn function(&self, kind: KernelKind) -> &Function {
        &self.functions[kind.index()].1
    }

    /// Lowers every kernel and writes `<function_name>.c` into `staging`.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::Io`] if a source file cannot be written.
    pub fn generate(&self, staging: &Path) -> Result<Kernels, BuildError> {
        let artifacts = self.functions.each_ref().map(|(kind, function)| {
            let program = function.lower();
            let path = staging.join(format!("{}.c", function.name()));
            (*kind, function.name().to_owned(), path, program)
        });

        for (kind, _, path, program) in &artifacts {
            fs::write(path, program.to_c()).map_err(BuildError::io("write", path))?;
            debug!(
                kernel = %kind,
                instructions = program.instructions().len(),
                path = %path.display(),
                "generated kernel",
            );
        }

        Ok(Kernels {
            artifacts: artifacts.map(|(kind, function_name, path, program)| GeneratedArtifact {
                kind,
                function_name,
                path,
                program,
            }),
        })
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use optigen_core::{PenaltyFunction, Problem, augment, functions::rosenbrock};

    fn constrained() -> AugmentedProblem {
        let u = Vector::symbolic("u", 3);
        let p = Vector::symbolic("p", 2);
        let cost = rosenbrock(&u, &p).unwrap();
        let c = Vector::new(vec![&u[0] + &u[1] - &u[2], u[1].sin()]);
        let problem = Problem::new(u, p, cost)
            .unwrap()
            .with_penalty_constraints(c, PenaltyFunction::SumOfSquares)
            .unwrap();
        augment(&problem).unwrap()
    }

    #[test]
    fn kernel_signatures() {
        let generator = KernelGenerator::new(&constrained(), &BuildConfiguration::default()).unwrap();

        let cost = generator.function(KernelKind::Cost).lower();
        assert_eq!(cost.input_sizes(), [3, 4]);
        assert_eq!(cost.output_sizes(), [1]);

        let grad = generator.function(KernelKind::Gradient).lower();
        assert_eq!(grad.input_sizes(), [3, 4]);
        assert_eq!(grad.output_sizes(), [3]);

        let penalty = generator.function(KernelKind::ConstraintPenalty).lower();
        assert_eq!(penalty.input_sizes(), [3, 2]);
        assert_eq!(penalty.output_sizes(), [2]);
    }

    #[test]
    fn penalty_kernel_is_raw_constraints() {
        let generator = KernelGenerator::new(&constrained(), &BuildConfiguration::default()).unwrap();
        let penalty = generator.function(KernelKind::ConstraintPenalty).lower();

        let u = [0.5, 2.0, 1.0];
        let out = penalty.call(&[&u, &[1.0, 100.0]]).unwrap();
        assert_relative_eq!(out[0][0], 1.5);
        assert_relative_eq!(out[0][1], 2.0_f64.sin());
    }

    #[test]
    fn writes_sources_named_after_functions() {
        let staging = tempfile::tempdir().unwrap();
        let config = BuildConfiguration::default().with_cost_function_name("rosen_cost");
        let kernels = KernelGenerator::new(&constrained(), &config)
            .unwrap()
            .generate(staging.path())
            .unwrap();

        let cost = kernels.get(KernelKind::Cost);
        assert_eq!(cost.path(), staging.path().join("rosen_cost.c"));
        let source = fs::read_to_string(cost.path()).unwrap();
        assert!(source.contains("int rosen_cost(const casadi_real** arg"));

        for artifact in kernels.iter() {
            assert!(artifact.path().is_file());
        }
    }

    #[test]
    fn relocation_moves_to_fixed_names() {
        let staging = tempfile::tempdir().unwrap();
        let target = tempfile::tempdir().unwrap();

        let kernels = KernelGenerator::new(&constrained(), &BuildConfiguration::default())
            .unwrap()
            .generate(staging.path())
            .unwrap()
            .relocate(target.path())
            .unwrap();

        for kind in KernelKind::ALL {
            let artifact = kernels.get(kind);
            assert_eq!(artifact.path(), target.path().join(kind.file_name()));
            assert!(artifact.path().is_file());
        }
        assert_eq!(fs::read_dir(staging.path()).unwrap().count(), 0);
    }

    #[test]
    fn relocation_into_missing_directory_fails() {
        let staging = tempfile::tempdir().unwrap();
        let missing = staging.path().join("no/such/extern");

        let err = KernelGenerator::new(&constrained(), &BuildConfiguration::default())
            .unwrap()
            .generate(staging.path())
            .unwrap()
            .relocate(&missing)
            .unwrap_err();

        assert!(matches!(err, BuildError::Relocate { .. }));
        assert!(!missing.exists());
    }
}
