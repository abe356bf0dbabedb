//! Project configuration - what the host hands to the builder.
//!
//! A [`BuildConfiguration`] is the fully-resolved input for one build pass:
//! every path is absolute and every optional setting has been defaulted.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::builder::error::BuildError;

/// Default C++ standards built when none are requested.
pub const DEFAULT_CPP_VERSIONS: [u32; 4] = [98, 11, 17, 20];

/// Default toolchain identifier.
pub const DEFAULT_TOOLCHAIN: &str = "x86_64";

/// Default CMake version floor.
pub const DEFAULT_CMAKE_VERSION: &str = "3.12.0";

/// Default CMake build type.
pub const DEFAULT_BUILD_TYPE: &str = "Debug";

/// Default name of the output directory under the build directory.
pub const DEFAULT_OUTPUT_DIR: &str = "out";

/// Default name of the toolchain directory under the build directory.
pub const DEFAULT_TOOLCHAIN_DIR: &str = "tool";

/// What kind of project is being built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectKind {
    /// Shared library
    Lib,
    /// Loadable module (built like a library)
    Mod,
    /// Executable
    Bin,
    /// Long-running service executable
    Srv,
    /// Test executable
    Test,
}

impl ProjectKind {
    /// All supported kinds, in declaration order.
    pub const ALL: [ProjectKind; 5] = [
        ProjectKind::Lib,
        ProjectKind::Mod,
        ProjectKind::Bin,
        ProjectKind::Srv,
        ProjectKind::Test,
    ];

    /// Library kinds emit a shared library and ship headers.
    pub fn is_library(&self) -> bool {
        matches!(self, ProjectKind::Lib | ProjectKind::Mod)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectKind::Lib => "lib",
            ProjectKind::Mod => "mod",
            ProjectKind::Bin => "bin",
            ProjectKind::Srv => "srv",
            ProjectKind::Test => "test",
        }
    }
}

impl FromStr for ProjectKind {
    type Err = BuildError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ProjectKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| BuildError::UnsupportedKind(s.to_string()))
    }
}

impl fmt::Display for ProjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A preprocessor definition passed to the compiler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Definition {
    pub name: String,
    pub value: Option<String>,
}

impl Definition {
    pub fn new(name: impl Into<String>, value: Option<String>) -> Self {
        Definition {
            name: name.into(),
            value: value.filter(|v| !v.is_empty()),
        }
    }

    /// Build a definition from a manifest value.
    ///
    /// Falsy values (`false`, `0`, `""`, empty arrays/tables) produce a bare name.
    pub fn from_toml(name: impl Into<String>, value: &toml::Value) -> Self {
        let value = match value {
            toml::Value::String(s) => Some(s.clone()),
            toml::Value::Boolean(b) => b.then(|| "true".to_string()),
            toml::Value::Integer(i) => (*i != 0).then(|| i.to_string()),
            toml::Value::Float(f) => (*f != 0.0).then(|| f.to_string()),
            toml::Value::Datetime(d) => Some(d.to_string()),
            toml::Value::Array(a) if a.is_empty() => None,
            toml::Value::Table(t) if t.is_empty() => None,
            other => Some(other.to_string()),
        };

        Definition::new(name, value)
    }

    /// Render as `NAME` or `NAME=value`.
    pub fn render(&self) -> String {
        match &self.value {
            Some(value) => format!("{}={}", self.name, value),
            None => self.name.clone(),
        }
    }
}

/// Install locations for the (optional) install manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallDestinations {
    pub bin: PathBuf,
    pub include: PathBuf,
    pub lib: PathBuf,
}

impl Default for InstallDestinations {
    fn default() -> Self {
        InstallDestinations {
            bin: PathBuf::from("/usr/local/bin"),
            include: PathBuf::from("/usr/local/include"),
            lib: PathBuf::from("/usr/local/lib"),
        }
    }
}

/// How a finished target is judged successful.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SuccessPolicy {
    /// The target output directory contains at least one entry.
    ///
    /// The generated `CMakeLists.txt` and the CMake build tree live in that
    /// directory, so this never fails after a successful compile. Use
    /// [`SuccessPolicy::FileExists`] to check for the built artifact.
    #[default]
    NonEmptyDirectory,
    /// A named file exists in the target output directory.
    FileExists(String),
}

/// Fully-resolved input for a build pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuildConfiguration {
    /// Project name, used for target names and the umbrella header.
    pub name: String,
    pub kind: ProjectKind,
    /// CMake project/target name (defaults to `name`).
    pub artifact: String,
    pub src_dir: PathBuf,
    pub inc_dir: Option<PathBuf>,
    pub lib_dir: Option<PathBuf>,
    pub build_dir: PathBuf,
    pub cpp_versions: Vec<u32>,
    pub toolchains: Vec<String>,
    pub toolchain_dir: String,
    pub output_dir: String,
    pub definitions: Vec<Definition>,
    /// Libraries linked with `--whole-archive`.
    pub dep_libs: Option<Vec<String>>,
    pub build_type: String,
    pub cmake_version: String,
    pub install: InstallDestinations,
    pub success: SuccessPolicy,
}

impl BuildConfiguration {
    /// Create a configuration with defaults for everything but the essentials.
    pub fn new(
        name: impl Into<String>,
        kind: ProjectKind,
        src_dir: impl Into<PathBuf>,
        build_dir: impl Into<PathBuf>,
    ) -> Self {
        let name = name.into();
        BuildConfiguration {
            artifact: name.clone(),
            name,
            kind,
            src_dir: src_dir.into(),
            inc_dir: None,
            lib_dir: None,
            build_dir: build_dir.into(),
            cpp_versions: DEFAULT_CPP_VERSIONS.to_vec(),
            toolchains: vec![DEFAULT_TOOLCHAIN.to_string()],
            toolchain_dir: DEFAULT_TOOLCHAIN_DIR.to_string(),
            output_dir: DEFAULT_OUTPUT_DIR.to_string(),
            definitions: Vec::new(),
            dep_libs: None,
            build_type: DEFAULT_BUILD_TYPE.to_string(),
            cmake_version: DEFAULT_CMAKE_VERSION.to_string(),
            install: InstallDestinations::default(),
            success: SuccessPolicy::default(),
        }
    }

    pub fn with_inc_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.inc_dir = Some(dir.into());
        self
    }

    pub fn with_lib_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.lib_dir = Some(dir.into());
        self
    }

    pub fn with_cpp_versions(mut self, versions: impl IntoIterator<Item = u32>) -> Self {
        self.cpp_versions = versions.into_iter().collect();
        self
    }

    pub fn with_toolchains(
        mut self,
        toolchains: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.toolchains = toolchains.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_definitions(mut self, definitions: impl IntoIterator<Item = Definition>) -> Self {
        self.definitions = definitions.into_iter().collect();
        self
    }

    pub fn with_dep_libs(mut self, libs: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.dep_libs = Some(libs.into_iter().map(Into::into).collect());
        self
    }

    /// Directory holding one subdirectory per target.
    pub fn output_root(&self) -> PathBuf {
        self.build_dir.join(&self.output_dir)
    }

    /// Directory holding fetched toolchain bundles.
    pub fn toolchain_root(&self) -> PathBuf {
        self.build_dir.join(&self.toolchain_dir)
    }

    /// Resolve a possibly-relative path against `base`.
    pub fn resolve_path(base: &Path, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            base.join(path)
        }
    }
}
