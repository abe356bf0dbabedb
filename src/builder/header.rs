//! Umbrella header generation and header packaging for library targets.

use std::path::{Path, PathBuf};

use crate::builder::discover::header_files;
use crate::builder::error::BuildError;
use crate::util::fs::{copy_dir_all, relative_path, to_slash, write_string};

/// File name of the umbrella header for `project`.
pub fn umbrella_name(project: &str) -> String {
    format!("{}.h", project)
}

/// Render an umbrella header that includes every header under `include_root`.
///
/// Includes follow discovery order and use paths relative to the root. A
/// header at the root named like the umbrella itself is left out.
pub fn umbrella_header(include_root: &Path, project: &str) -> String {
    let own = umbrella_name(project);
    let mut out = String::from("#pragma once\n");
    for header in header_files(include_root) {
        let rel = to_slash(&relative_path(include_root, &header));
        if rel == own {
            continue;
        }
        out.push_str(&format!("#include <{}>\n", rel));
    }
    out
}

/// Write `<project>.h` into `output_dir`.
///
/// Must run after [`package_headers`]: a packaged header with the same name
/// is replaced.
pub fn write_umbrella_header(
    include_root: &Path,
    output_dir: &Path,
    project: &str,
) -> Result<PathBuf, BuildError> {
    let path = output_dir.join(umbrella_name(project));
    if include_root.join(umbrella_name(project)).is_file() {
        tracing::warn!(
            "`{}` in {} is replaced by the generated umbrella header",
            umbrella_name(project),
            include_root.display()
        );
    }
    write_string(&path, &umbrella_header(include_root, project))?;
    tracing::debug!("Wrote umbrella header {}", path.display());
    Ok(path)
}

/// Copy the include tree into the target output directory.
pub fn package_headers(include_root: &Path, output_dir: &Path) -> Result<(), BuildError> {
    tracing::debug!(
        "Packaging headers from {} into {}",
        include_root.display(),
        output_dir.display()
    );
    copy_dir_all(include_root, output_dir)
}
