//! Filesystem utilities.
//!
//! Every failure is reported as [`BuildError::Filesystem`] carrying the path
//! that caused it.

use std::fs;
use std::path::{Path, PathBuf};

use crate::builder::error::BuildError;

/// Recursively copy a directory, creating `dst` if needed.
///
/// Symlinks are followed, so their targets are copied.
pub fn copy_dir_all(src: &Path, dst: &Path) -> Result<(), BuildError> {
    ensure_dir(dst)?;

    for entry in fs::read_dir(src).map_err(|e| BuildError::fs("failed to read directory", src, e))? {
        let entry = entry.map_err(|e| BuildError::fs("failed to read directory", src, e))?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());
        let meta = fs::metadata(&src_path)
            .map_err(|e| BuildError::fs("failed to stat", &src_path, e))?;

        if meta.is_dir() {
            copy_dir_all(&src_path, &dst_path)?;
        } else {
            fs::copy(&src_path, &dst_path)
                .map_err(|e| BuildError::fs("failed to copy", &src_path, e))?;
        }
    }
    Ok(())
}

/// Remove a directory and all its contents, if it exists.
pub fn remove_dir_all_if_exists(path: &Path) -> Result<(), BuildError> {
    if path.exists() {
        fs::remove_dir_all(path).map_err(|e| BuildError::fs("failed to remove directory", path, e))?;
    }
    Ok(())
}

/// Ensure a directory exists, creating it if necessary.
pub fn ensure_dir(path: &Path) -> Result<(), BuildError> {
    if !path.is_dir() {
        fs::create_dir_all(path).map_err(|e| BuildError::fs("failed to create directory", path, e))?;
    }
    Ok(())
}

/// Write a string to a file, creating parent directories if needed.
pub fn write_string(path: &Path, contents: &str) -> Result<(), BuildError> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    fs::write(path, contents).map_err(|e| BuildError::fs("failed to write file", path, e))
}

/// Check whether a directory exists and has at least one entry.
pub fn dir_has_entries(path: &Path) -> bool {
    fs::read_dir(path)
        .map(|mut entries| entries.next().is_some())
        .unwrap_or(false)
}

/// Get the relative path from `base` to `path`.
pub fn relative_path(base: &Path, path: &Path) -> PathBuf {
    pathdiff::diff_paths(path, base).unwrap_or_else(|| path.to_path_buf())
}

/// Render a relative path with `/` separators regardless of platform.
pub fn to_slash(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
