//! The on-disk target project and its lifecycle.

mod copy;

use std::{
    fs,
    path::{Path, PathBuf},
};

use tracing::{debug, info, warn};

use optigen_core::config::{OptimizerMeta, RebuildPolicy};

use crate::{BuildError, Stage, Toolchain};

/// Name of the runtime-support subtree inside the target project.
pub(crate) const RUNTIME_DIR: &str = "icasadi";

/// Name of the native-source directory inside the runtime-support subtree.
pub(crate) const EXTERN_DIR: &str = "extern";

const MANIFEST: &str = "Cargo.toml";

/// Returns the runtime-support crate that ships with this crate.
#[must_use]
pub fn bundled_runtime() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join(RUNTIME_DIR)
}

/// Where a target project stands before it is prepared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectState {
    /// Nothing exists at the target path.
    Absent,

    /// A directory exists but holds no project manifest.
    Uninitialized,

    /// A project has been initialized in the directory.
    Initialized,
}

/// The target project directory `<build_root>/<optimizer_name>/`.
///
/// Both paths are absolute and the target is guaranteed to be a strict
/// descendant of the build root, so recursive deletion of the target can
/// never reach outside the root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetProject {
    root: PathBuf,
    dir: PathBuf,
    name: String,
}

impl TargetProject {
    /// Resolves the target directory of `meta` under `build_root`.
    ///
    /// The build root is created if needed and canonicalized. If the target
    /// already exists it is canonicalized too, so a symbolic link that points
    /// out of the build root is caught here.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::Config`] for an invalid optimizer name,
    /// [`BuildError::OutsideBuildRoot`] if the target escapes the root, and
    /// [`BuildError::Io`] if the root cannot be created.
    pub fn resolve(build_root: &Path, meta: &OptimizerMeta) -> Result<Self, BuildError> {
        meta.validate()?;

        fs::create_dir_all(build_root).map_err(BuildError::io("create build root", build_root))?;
        let root = fs::canonicalize(build_root)
            .map_err(BuildError::io("canonicalize build root", build_root))?;

        let dir = root.join(meta.optimizer_name());
        let dir = if dir.exists() {
            fs::canonicalize(&dir).map_err(BuildError::io("canonicalize target", &dir))?
        } else {
            dir
        };

        if dir == root || !dir.starts_with(&root) {
            return Err(BuildError::OutsideBuildRoot { root, target: dir });
        }

        Ok(Self {
            root,
            dir,
            name: meta.optimizer_name().to_owned(),
        })
    }

    /// The canonical build root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The target project directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// The optimizer name, which is also the crate name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn runtime_dir(&self) -> PathBuf {
        self.dir.join(RUNTIME_DIR)
    }

    #[must_use]
    pub fn extern_dir(&self) -> PathBuf {
        self.runtime_dir().join(EXTERN_DIR)
    }

    #[must_use]
    pub fn manifest_path(&self) -> PathBuf {
        self.dir.join(MANIFEST)
    }

    #[must_use]
    pub fn state(&self) -> ProjectState {
        if !self.dir.is_dir() {
            ProjectState::Absent
        } else if self.manifest_path().is_file() {
            ProjectState::Initialized
        } else {
            ProjectState::Uninitialized
        }
    }
}

/// Brings the target directory into the initialized state.
///
/// | policy  | state before    | effect                                   |
/// |---------|-----------------|------------------------------------------|
/// | `Clean` | any             | delete, recreate, initialize             |
/// | `Reuse` | `Absent`        | create, initialize                       |
/// | `Reuse` | `Uninitialized` | initialize                               |
/// | `Reuse` | `Initialized`   | nothing                                  |
///
/// Returns the state the directory was in before preparation.
///
/// # Errors
///
/// Returns [`BuildError::Io`] if the directory cannot be deleted or created,
/// and [`BuildError::Toolchain`] if initialization fails.
pub fn prepare(
    target: &TargetProject,
    policy: RebuildPolicy,
    toolchain: &dyn Toolchain,
) -> Result<ProjectState, BuildError> {
    let before = target.state();
    let dir = target.dir();

    let needs_init = match policy {
        RebuildPolicy::Clean => {
            if before != ProjectState::Absent {
                warn!(dir = %dir.display(), "removing existing target directory");
                fs::remove_dir_all(dir).map_err(BuildError::io("remove", dir))?;
            }
            true
        }
        RebuildPolicy::Reuse => before != ProjectState::Initialized,
    };

    fs::create_dir_all(dir).map_err(BuildError::io("create", dir))?;

    if needs_init {
        toolchain
            .init(dir, target.name())
            .map_err(|source| BuildError::Toolchain {
                stage: Stage::PrepareTarget,
                source,
            })?;
        info!(dir = %dir.display(), "initialized target project");
    } else {
        debug!(dir = %dir.display(), "reusing initialized target project");
    }

    Ok(before)
}

/// Copies the runtime-support tree from `origin` into the target project.
///
/// Any existing runtime-support subtree is removed first, so no stale
/// generated file survives. Lock files, CI configuration, build output, and
/// previously generated sources are skipped:
///
/// ```text
/// *.lock   ci*   target   auto*
/// ```
///
/// Returns the number of files copied.
///
/// # Errors
///
/// Returns [`BuildError::MissingRuntimeOrigin`] if `origin` is not a
/// directory, or a file-system error if the copy fails.
pub fn materialize_runtime(origin: &Path, target: &TargetProject) -> Result<usize, BuildError> {
    if !origin.is_dir() {
        return Err(BuildError::MissingRuntimeOrigin(origin.to_path_buf()));
    }

    let runtime = target.runtime_dir();
    if runtime.exists() {
        fs::remove_dir_all(&runtime).map_err(BuildError::io("remove", &runtime))?;
    }

    let copied = copy::copy_tree(origin, &runtime)?;
    info!(
        origin = %origin.display(),
        dir = %runtime.display(),
        files = copied,
        "materialized runtime support",
    );
    Ok(copied)
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, io::Write};

    use super::*;
    use crate::ToolchainError;
    use optigen_core::config::BuildMode;

    /// Writes a manifest and a library root, like `Cargo::init`.
    #[derive(Default)]
    struct InitOnly {
        inits: RefCell<usize>,
    }

    impl Toolchain for InitOnly {
        fn init(&self, dir: &Path, name: &str) -> Result<(), ToolchainError> {
            *self.inits.borrow_mut() += 1;
            fs::create_dir_all(dir.join("src")).unwrap();
            fs::write(dir.join(MANIFEST), format!("[package]\nname = \"{name}\"\n")).unwrap();
            fs::write(dir.join("src/lib.rs"), "").unwrap();
            Ok(())
        }

        fn build(&self, _dir: &Path, _mode: BuildMode) -> Result<(), ToolchainError> {
            unreachable!("scaffolding never builds")
        }
    }

    fn meta(name: &str) -> OptimizerMeta {
        OptimizerMeta::new(name).unwrap()
    }

    #[test]
    fn resolves_under_root() {
        let root = tempfile::tempdir().unwrap();
        let build_root = root.path().join("build");

        let target = TargetProject::resolve(&build_root, &meta("rosenbrock")).unwrap();

        assert!(build_root.is_dir());
        assert_eq!(target.root(), fs::canonicalize(&build_root).unwrap());
        assert_eq!(target.dir(), target.root().join("rosenbrock"));
        assert_eq!(target.extern_dir(), target.dir().join("icasadi/extern"));
        assert_eq!(target.state(), ProjectState::Absent);
    }

    #[cfg(unix)]
    #[test]
    fn refuses_targets_that_escape_the_root() {
        let root = tempfile::tempdir().unwrap();
        let elsewhere = tempfile::tempdir().unwrap();
        std::os::unix::fs::symlink(elsewhere.path(), root.path().join("escape")).unwrap();

        let err = TargetProject::resolve(root.path(), &meta("escape")).unwrap_err();
        assert!(matches!(err, BuildError::OutsideBuildRoot { .. }));
    }

    #[test]
    fn clean_removes_existing_contents() {
        let root = tempfile::tempdir().unwrap();
        let target = TargetProject::resolve(root.path(), &meta("opt")).unwrap();
        fs::create_dir_all(target.dir().join("stale")).unwrap();
        fs::write(target.dir().join("stale/old.c"), "").unwrap();

        let toolchain = InitOnly::default();
        let before = prepare(&target, RebuildPolicy::Clean, &toolchain).unwrap();

        assert_eq!(before, ProjectState::Uninitialized);
        assert!(!target.dir().join("stale").exists());
        assert_eq!(target.state(), ProjectState::Initialized);
        assert_eq!(*toolchain.inits.borrow(), 1);
    }

    #[test]
    fn reuse_keeps_initialized_projects() {
        let root = tempfile::tempdir().unwrap();
        let target = TargetProject::resolve(root.path(), &meta("opt")).unwrap();
        let toolchain = InitOnly::default();

        prepare(&target, RebuildPolicy::Reuse, &toolchain).unwrap();
        let mut notes = fs::File::create(target.dir().join("notes.txt")).unwrap();
        writeln!(notes, "keep me").unwrap();

        let before = prepare(&target, RebuildPolicy::Reuse, &toolchain).unwrap();

        assert_eq!(before, ProjectState::Initialized);
        assert_eq!(*toolchain.inits.borrow(), 1);
        assert_eq!(
            fs::read_to_string(target.dir().join("notes.txt")).unwrap(),
            "keep me\n"
        );
    }

    #[test]
    fn reuse_initializes_bare_directories() {
        let root = tempfile::tempdir().unwrap();
        let target = TargetProject::resolve(root.path(), &meta("opt")).unwrap();
        fs::create_dir_all(target.dir()).unwrap();

        let toolchain = InitOnly::default();
        let before = prepare(&target, RebuildPolicy::Reuse, &toolchain).unwrap();

        assert_eq!(before, ProjectState::Uninitialized);
        assert_eq!(target.state(), ProjectState::Initialized);
    }

    #[test]
    fn materializes_bundled_runtime() {
        let root = tempfile::tempdir().unwrap();
        let target = TargetProject::resolve(root.path(), &meta("opt")).unwrap();
        fs::create_dir_all(target.dir()).unwrap();

        let copied = materialize_runtime(&bundled_runtime(), &target).unwrap();

        assert!(copied > 0);
        assert!(target.runtime_dir().join("Cargo.toml").is_file());
        assert!(target.extern_dir().is_dir());
    }

    #[test]
    fn replaces_existing_runtime() {
        let root = tempfile::tempdir().unwrap();
        let target = TargetProject::resolve(root.path(), &meta("opt")).unwrap();
        fs::create_dir_all(target.extern_dir()).unwrap();
        fs::write(target.extern_dir().join("auto_casadi_cost.c"), "stale").unwrap();

        materialize_runtime(&bundled_runtime(), &target).unwrap();

        assert!(!target.extern_dir().join("auto_casadi_cost.c").exists());
    }

    #[test]
    fn missing_origin_is_an_error() {
        let root = tempfile::tempdir().unwrap();
        let target = TargetProject::resolve(root.path(), &meta("opt")).unwrap();

        let err = materialize_runtime(&root.path().join("nowhere"), &target).unwrap_err();
        assert!(matches!(err, BuildError::MissingRuntimeOrigin(_)));
    }
}
