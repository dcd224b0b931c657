//! CLI command implementations.

use std::path::{Path, PathBuf};

pub mod build;
pub mod clean;

/// Resolve the project file against the base path unless it is absolute.
pub(crate) fn project_path(base: &Path, project_file: &Path) -> PathBuf {
    if project_file.is_absolute() {
        project_file.to_path_buf()
    } else {
        base.join(project_file)
    }
}
