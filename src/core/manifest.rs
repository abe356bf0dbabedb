//! Matrix.toml manifest parsing.
//!
//! The manifest stands in for the host framework: it carries the project
//! metadata that gets resolved into a [`BuildConfiguration`].
//!
//! ```toml
//! [project]
//! name = "bio"
//! kind = "lib"
//!
//! [paths]
//! src = "src"
//! inc = "inc"
//!
//! [build]
//! cpp_versions = [11, 17]
//! toolchains = ["x86_64"]
//!
//! [define]
//! DEBUG = ""
//! LEVEL = 2
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::builder::error::BuildError;
use crate::core::project::{
    BuildConfiguration, Definition, InstallDestinations, ProjectKind, SuccessPolicy,
};
use crate::util::config::BuildDefaults;

/// Manifest file name.
pub const MANIFEST_NAME: &str = "Matrix.toml";

/// Raw manifest as written by the user.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    pub project: ProjectSection,

    #[serde(default)]
    pub paths: PathsSection,

    #[serde(default)]
    pub build: BuildSection,

    /// Compiler definitions; falsy values produce a bare name.
    #[serde(default)]
    pub define: BTreeMap<String, toml::Value>,

    #[serde(default)]
    pub install: InstallSection,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectSection {
    pub name: String,

    /// Kept as a string so unsupported kinds get a dedicated error.
    pub kind: String,

    /// CMake project name, if different from `name`
    #[serde(default)]
    pub artifact: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PathsSection {
    pub src: PathBuf,
    pub inc: Option<PathBuf>,
    pub lib: Option<PathBuf>,
    pub build: PathBuf,
}

impl Default for PathsSection {
    fn default() -> Self {
        PathsSection {
            src: PathBuf::from("src"),
            inc: None,
            lib: None,
            build: PathBuf::from("build"),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BuildSection {
    pub cpp_versions: Option<Vec<u32>>,
    pub toolchains: Option<Vec<String>>,
    pub build_type: Option<String>,
    pub cmake_version: Option<String>,
    pub output_dir: Option<String>,
    pub toolchain_dir: Option<String>,
    /// Libraries linked with `--whole-archive`
    pub dep_libs: Option<Vec<String>>,
    /// Require this file instead of a non-empty output directory
    pub success_file: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InstallSection {
    pub bin: Option<PathBuf>,
    pub include: Option<PathBuf>,
    pub lib: Option<PathBuf>,
}

impl Manifest {
    /// Load a manifest from disk.
    pub fn load(path: &Path) -> Result<Self, BuildError> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| BuildError::fs("failed to read", path, e))?;
        Self::parse(&contents, path)
    }

    /// Parse manifest text; `path` is only used for error messages.
    pub fn parse(contents: &str, path: &Path) -> Result<Self, BuildError> {
        toml::from_str(contents).map_err(|e| BuildError::Manifest {
            path: path.to_path_buf(),
            message: e.message().to_string(),
        })
    }

    /// Resolve into a build configuration.
    ///
    /// Relative paths are joined onto `root`; unset build settings come from
    /// `defaults`.
    pub fn to_configuration(
        &self,
        root: &Path,
        defaults: &BuildDefaults,
    ) -> Result<BuildConfiguration, BuildError> {
        let kind: ProjectKind = self.project.kind.parse()?;

        let resolve = |p: &PathBuf| BuildConfiguration::resolve_path(root, p);

        let mut config = BuildConfiguration::new(
            &self.project.name,
            kind,
            resolve(&self.paths.src),
            resolve(&self.paths.build),
        );

        if let Some(artifact) = &self.project.artifact {
            config.artifact = artifact.clone();
        }
        config.inc_dir = self.paths.inc.as_ref().map(resolve);
        config.lib_dir = self.paths.lib.as_ref().map(resolve);

        let build = &self.build;
        if let Some(v) = build.cpp_versions.clone().or_else(|| defaults.cpp_versions.clone()) {
            config.cpp_versions = v;
        }
        if let Some(t) = build.toolchains.clone().or_else(|| defaults.toolchains.clone()) {
            config.toolchains = t;
        }
        if let Some(b) = build.build_type.clone().or_else(|| defaults.build_type.clone()) {
            config.build_type = b;
        }
        if let Some(c) = build.cmake_version.clone().or_else(|| defaults.cmake_version.clone()) {
            config.cmake_version = c;
        }
        if let Some(o) = build.output_dir.clone().or_else(|| defaults.output_dir.clone()) {
            config.output_dir = o;
        }
        if let Some(t) = build.toolchain_dir.clone().or_else(|| defaults.toolchain_dir.clone()) {
            config.toolchain_dir = t;
        }
        config.dep_libs = build.dep_libs.clone();
        if let Some(file) = &build.success_file {
            config.success = SuccessPolicy::FileExists(file.clone());
        }

        config.definitions = self
            .define
            .iter()
            .map(|(name, value)| Definition::from_toml(name, value))
            .collect();

        let install = InstallDestinations::default();
        config.install = InstallDestinations {
            bin: self.install.bin.clone().unwrap_or(install.bin),
            include: self.install.include.clone().unwrap_or(install.include),
            lib: self.install.lib.clone().unwrap_or(install.lib),
        };

        Ok(config)
    }
}

/// Find the manifest in `start` or any of its ancestors.
pub fn find_manifest(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(MANIFEST_NAME))
        .find(|candidate| candidate.is_file())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const FULL: &str = r#"
[project]
name = "bio"
kind = "lib"
artifact = "libbio"

[paths]
src = "src"
inc = "inc"
lib = "/opt/libs"
build = "target"

[build]
cpp_versions = [11, 17]
toolchains = ["x86_64", "arm64"]
build_type = "Release"
dep_libs = ["plugin"]

[define]
DEBUG = ""
LEVEL = 2
VERBOSE = false

[install]
bin = "/opt/bin"
"#;

    #[test]
    fn test_full_manifest() {
        let manifest = Manifest::parse(FULL, Path::new("Matrix.toml")).unwrap();
        let config = manifest
            .to_configuration(Path::new("/proj"), &BuildDefaults::default())
            .unwrap();

        assert_eq!(config.name, "bio");
        assert_eq!(config.artifact, "libbio");
        assert_eq!(config.kind, ProjectKind::Lib);
        assert_eq!(config.src_dir, PathBuf::from("/proj/src"));
        assert_eq!(config.inc_dir, Some(PathBuf::from("/proj/inc")));
        assert_eq!(config.lib_dir, Some(PathBuf::from("/opt/libs")));
        assert_eq!(config.build_dir, PathBuf::from("/proj/target"));
        assert_eq!(config.cpp_versions, vec![11, 17]);
        assert_eq!(config.toolchains, vec!["x86_64", "arm64"]);
        assert_eq!(config.build_type, "Release");
        assert_eq!(config.dep_libs, Some(vec!["plugin".to_string()]));
        assert_eq!(config.install.bin, PathBuf::from("/opt/bin"));
        assert_eq!(config.install.lib, PathBuf::from("/usr/local/lib"));

        let rendered: Vec<_> = config.definitions.iter().map(|d| d.render()).collect();
        assert_eq!(rendered, vec!["DEBUG", "LEVEL=2", "VERBOSE"]);
    }

    #[test]
    fn test_minimal_manifest_uses_defaults() {
        let manifest = Manifest::parse(
            "[project]\nname = \"app\"\nkind = \"bin\"\n",
            Path::new("Matrix.toml"),
        )
        .unwrap();

        let defaults = BuildDefaults {
            build_type: Some("RelWithDebInfo".to_string()),
            ..Default::default()
        };
        let config = manifest.to_configuration(Path::new("/p"), &defaults).unwrap();

        assert_eq!(config.src_dir, PathBuf::from("/p/src"));
        assert_eq!(config.build_dir, PathBuf::from("/p/build"));
        assert_eq!(config.build_type, "RelWithDebInfo");
        assert_eq!(config.cpp_versions, vec![98, 11, 17, 20]);
        assert!(config.inc_dir.is_none());
        assert!(config.definitions.is_empty());
    }

    #[test]
    fn test_unsupported_kind_is_rejected() {
        let manifest = Manifest::parse(
            "[project]\nname = \"app\"\nkind = \"plugin\"\n",
            Path::new("Matrix.toml"),
        )
        .unwrap();

        let err = manifest
            .to_configuration(Path::new("/p"), &BuildDefaults::default())
            .unwrap_err();
        assert!(matches!(err, BuildError::UnsupportedKind(_)));
    }

    #[test]
    fn test_unknown_field_is_an_error() {
        let err = Manifest::parse(
            "[project]\nname = \"a\"\nkind = \"bin\"\nversion = \"1\"\n",
            Path::new("Matrix.toml"),
        )
        .unwrap_err();
        assert!(matches!(err, BuildError::Manifest { .. }));
    }

    #[test]
    fn test_find_manifest_walks_up() {
        let tmp = TempDir::new().unwrap();
        let manifest = tmp.path().join(MANIFEST_NAME);
        std::fs::write(&manifest, "[project]\nname = \"a\"\nkind = \"bin\"\n").unwrap();

        let nested = tmp.path().join("src").join("deep");
        std::fs::create_dir_all(&nested).unwrap();

        assert_eq!(find_manifest(&nested), Some(manifest));
    }
}
