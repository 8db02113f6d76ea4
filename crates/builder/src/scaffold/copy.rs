use std::{ffi::OsStr, fs, path::Path};

use walkdir::WalkDir;

use crate::BuildError;

/// Returns whether a file or directory name is left out of the copy.
fn is_excluded(name: &OsStr) -> bool {
    let name = name.to_string_lossy();
    name.ends_with(".lock") || name.starts_with("ci") || name == "target" || name.starts_with("auto")
}

/// Recursively copies `origin` to `destination`, skipping excluded names at
/// every depth. Returns the number of files copied.
pub(super) fn copy_tree(origin: &Path, destination: &Path) -> Result<usize, BuildError> {
    let mut copied = 0;

    let entries = WalkDir::new(origin)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || !is_excluded(entry.file_name()));

    for entry in entries {
        let entry = entry?;
        let relative = entry
            .path()
            .strip_prefix(origin)
            .map_err(|e| BuildError::Io {
                action: "resolve",
                path: entry.path().to_path_buf(),
                source: std::io::Error::other(e),
            })?;
        let dest = destination.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&dest).map_err(BuildError::io("create", &dest))?;
        } else {
            fs::copy(entry.path(), &dest).map_err(BuildError::io("copy to", &dest))?;
            copied += 1;
        }
    }

    Ok(copied)
}
