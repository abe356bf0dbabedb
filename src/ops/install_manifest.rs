//! `install.json` export for an installer tool.
//!
//! Lists what a finished target directory holds so a separate installer can
//! copy it into place. Only the root of the directory is inspected.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::builder::discover::LIBRARY_EXTENSIONS;
use crate::builder::error::BuildError;
use crate::core::project::{BuildConfiguration, InstallDestinations};
use crate::util::fs::write_string;

/// File name of the exported manifest.
pub const INSTALL_MANIFEST: &str = "install.json";

/// Contents of a target directory, grouped by install destination.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallManifest {
    /// Libraries the artifact was linked against whole-archive.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dep: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bin: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub lib: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub inc: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destinations: Option<InstallDestinations>,
}

impl InstallManifest {
    /// Classify the entries at the root of `output_dir`.
    ///
    /// Executable kinds put every entry under `bin`. Library kinds put
    /// `.a`/`.so` files under `lib` and everything else under `inc`, with
    /// directories first.
    pub fn scan(config: &BuildConfiguration, output_dir: &Path) -> Result<Self, BuildError> {
        let mut files = Vec::new();
        let mut dirs = Vec::new();

        let entries = std::fs::read_dir(output_dir)
            .map_err(|e| BuildError::fs("failed to read", output_dir, e))?;
        for entry in entries {
            let entry = entry.map_err(|e| BuildError::fs("failed to read", output_dir, e))?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if name == INSTALL_MANIFEST {
                continue;
            }

            if output_dir.join(&name).is_dir() {
                dirs.push(name);
            } else {
                files.push(name);
            }
        }
        files.sort();
        dirs.sort();

        let mut manifest = InstallManifest {
            dep: config.dep_libs.clone(),
            destinations: Some(config.install.clone()),
            ..Default::default()
        };

        if config.kind.is_library() {
            let (libs, others): (Vec<String>, Vec<String>) =
                files.into_iter().partition(|f| is_library_file(f));
            manifest.lib = libs;
            manifest.inc = dirs.into_iter().chain(others).collect();
        } else {
            manifest.bin = files.into_iter().chain(dirs).collect();
        }

        Ok(manifest)
    }

    /// Write `install.json` into `output_dir`.
    pub fn write(&self, output_dir: &Path) -> Result<PathBuf, BuildError> {
        let path = output_dir.join(INSTALL_MANIFEST);
        let json = serde_json::to_string_pretty(self).map_err(|source| BuildError::Serialize {
            path: path.clone(),
            source,
        })?;
        write_string(&path, &(json + "\n"))?;
        tracing::debug!("Wrote {}", path.display());
        Ok(path)
    }
}

fn is_library_file(name: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| LIBRARY_EXTENSIONS.contains(&ext))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::project::ProjectKind;
    use std::fs;
    use tempfile::TempDir;

    fn populate(dir: &Path) {
        fs::write(dir.join("libbio.so"), "").unwrap();
        fs::write(dir.join("bio.h"), "").unwrap();
        fs::write(dir.join("libextra.a"), "").unwrap();
        fs::create_dir_all(dir.join("bio/detail")).unwrap();
    }

    #[test]
    fn test_scan_library() {
        let tmp = TempDir::new().unwrap();
        populate(tmp.path());
        let config = BuildConfiguration::new("bio", ProjectKind::Lib, "src", "build");

        let manifest = InstallManifest::scan(&config, tmp.path()).unwrap();

        assert_eq!(manifest.lib, vec!["libbio.so", "libextra.a"]);
        assert_eq!(manifest.inc, vec!["bio", "bio.h"]);
        assert!(manifest.bin.is_empty());
        assert_eq!(manifest.dep, None);
    }

    #[test]
    fn test_scan_executable_detects_dirs_relative_to_output() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("app"), "").unwrap();
        fs::create_dir_all(tmp.path().join("assets")).unwrap();
        fs::write(tmp.path().join(INSTALL_MANIFEST), "{}").unwrap();
        let config = BuildConfiguration::new("app", ProjectKind::Bin, "src", "build")
            .with_dep_libs(["plugin"]);

        let manifest = InstallManifest::scan(&config, tmp.path()).unwrap();

        // Files come first, then directories.
        assert_eq!(manifest.bin, vec!["app", "assets"]);
        assert_eq!(manifest.dep, Some(vec!["plugin".to_string()]));
    }

    #[test]
    fn test_write_is_valid_json() {
        let tmp = TempDir::new().unwrap();
        populate(tmp.path());
        let config = BuildConfiguration::new("bio", ProjectKind::Mod, "src", "build");

        let manifest = InstallManifest::scan(&config, tmp.path()).unwrap();
        let path = manifest.write(tmp.path()).unwrap();

        let text = fs::read_to_string(path).unwrap();
        let parsed: InstallManifest = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed, manifest);

        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["destinations"]["lib"], "/usr/local/lib");
    }
}
