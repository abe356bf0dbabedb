//! Build targets - one per (C++ standard, toolchain) pair.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

/// A concrete build configuration, built into its own output subdirectory.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct BuildTarget {
    /// Deterministic target name: `lib_<toolchain>_cpp<version>_<project>`.
    pub name: String,
    pub cpp_version: u32,
    pub toolchain: String,
}

impl BuildTarget {
    pub fn new(cpp_version: u32, toolchain: impl Into<String>, project: &str) -> Self {
        let toolchain = toolchain.into();
        BuildTarget {
            name: target_name(&toolchain, cpp_version, project),
            cpp_version,
            toolchain,
        }
    }

    /// Output directory of this target under `root`.
    pub fn output_dir(&self, root: &Path) -> PathBuf {
        root.join(&self.name)
    }
}

impl fmt::Display for BuildTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (c++{}, {})", self.name, self.cpp_version, self.toolchain)
    }
}

/// Compute the name of a target.
///
/// The version is all digits and follows the last `_cpp`, so distinct
/// (toolchain, version) pairs never produce the same name.
pub fn target_name(toolchain: &str, cpp_version: u32, project: &str) -> String {
    format!("lib_{}_cpp{}_{}", toolchain, cpp_version, project)
}

/// Expand the standard x toolchain matrix.
///
/// Versions are the outer loop and toolchains the inner one. Repeated
/// entries are ignored so every target name is unique. An empty list on
/// either side yields no targets.
pub fn expand(versions: &[u32], toolchains: &[String], project: &str) -> Vec<BuildTarget> {
    let mut targets: Vec<BuildTarget> = Vec::with_capacity(versions.len() * toolchains.len());

    for (i, &version) in versions.iter().enumerate() {
        if versions[..i].contains(&version) {
            continue;
        }
        for (j, toolchain) in toolchains.iter().enumerate() {
            if toolchains[..j].contains(toolchain) {
                continue;
            }
            targets.push(BuildTarget::new(version, toolchain.as_str(), project));
        }
    }

    tracing::debug!(
        "Expanded {} versions x {} toolchains into {} targets",
        versions.len(),
        toolchains.len(),
        targets.len()
    );

    targets
}
