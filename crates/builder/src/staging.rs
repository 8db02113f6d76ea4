use std::path::Path;

use tempfile::TempDir;
use tracing::debug;

use crate::BuildError;

/// A scoped scratch directory for one build.
///
/// Generated kernels are written here first and then moved into the target
/// project. Each build gets its own uniquely named directory, so concurrent
/// builds never see each other's intermediate files. The directory and
/// anything left in it are removed when the `Staging` is dropped, on success
/// and failure alike.
#[derive(Debug)]
pub struct Staging {
    dir: TempDir,
}

impl Staging {
    /// Creates a fresh staging directory inside `parent`, or inside the
    /// system temporary directory if `parent` is `None`.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::Io`] if the directory cannot be created.
    pub fn acquire(parent: Option<&Path>) -> Result<Self, BuildError> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("optigen-staging-");

        let dir = match parent {
            Some(parent) => builder
                .tempdir_in(parent)
                .map_err(BuildError::io("create staging directory in", parent))?,
            None => builder
                .tempdir()
                .map_err(BuildError::io("create staging directory in", std::env::temp_dir()))?,
        };

        debug!(path = %dir.path().display(), "acquired staging directory");
        Ok(Self { dir })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        self.dir.path()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directories_are_unique_and_removed_on_drop() {
        let parent = tempfile::tempdir().unwrap();

        let first = Staging::acquire(Some(parent.path())).unwrap();
        let second = Staging::acquire(Some(parent.path())).unwrap();
        assert_ne!(first.path(), second.path());
        assert!(first.path().starts_with(parent.path()));

        let path = first.path().to_path_buf();
        std::fs::write(path.join("leftover.c"), "int x;").unwrap();
        drop(first);
        assert!(!path.exists());
        assert!(second.path().exists());
    }

    #[test]
    fn missing_parent_is_an_error() {
        let parent = tempfile::tempdir().unwrap();
        let missing = parent.path().join("missing");
        assert!(matches!(
            Staging::acquire(Some(&missing)),
            Err(BuildError::Io { .. })
        ));
    }
}
