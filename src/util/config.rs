//! Configuration file support for cppmatrix.
//!
//! Two configuration file locations are read:
//! - Global: `~/.cppmatrix/config.toml` - User-wide defaults
//! - Project: `.cppmatrix/config.toml` - Project-specific overrides
//!
//! Project config takes precedence over global config, and the manifest
//! takes precedence over both.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// cppmatrix configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Defaults for unset manifest build settings
    pub build: BuildDefaults,

    /// Toolchain package store settings
    pub store: StoreConfig,
}

/// Build defaults applied when the manifest leaves a setting unset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildDefaults {
    /// CMake build type (Debug, Release, ...)
    pub build_type: Option<String>,

    /// Minimum CMake version
    pub cmake_version: Option<String>,

    /// C++ standards to build
    pub cpp_versions: Option<Vec<u32>>,

    /// Toolchain identifiers to build
    pub toolchains: Option<Vec<String>>,

    /// Output directory name under the build directory
    pub output_dir: Option<String>,

    /// Toolchain directory name under the build directory
    pub toolchain_dir: Option<String>,
}

/// Package store settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Local store directory (defaults to `~/.cppmatrix/store`)
    pub path: Option<PathBuf>,

    /// Base URL serving `<package>.tar.gz` bundles
    pub url: Option<String>,

    /// Never download; only use what is already in the store
    #[serde(default)]
    pub offline: bool,
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if file doesn't exist.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {:#}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        let build = other.build;
        if build.build_type.is_some() {
            self.build.build_type = build.build_type;
        }
        if build.cmake_version.is_some() {
            self.build.cmake_version = build.cmake_version;
        }
        if build.cpp_versions.is_some() {
            self.build.cpp_versions = build.cpp_versions;
        }
        if build.toolchains.is_some() {
            self.build.toolchains = build.toolchains;
        }
        if build.output_dir.is_some() {
            self.build.output_dir = build.output_dir;
        }
        if build.toolchain_dir.is_some() {
            self.build.toolchain_dir = build.toolchain_dir;
        }

        if other.store.path.is_some() {
            self.store.path = other.store.path;
        }
        if other.store.url.is_some() {
            self.store.url = other.store.url;
        }
        if other.store.offline {
            self.store.offline = true;
        }
    }
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (.cppmatrix/config.toml)
/// 2. Global config (~/.cppmatrix/config.toml)
/// 3. Defaults
pub fn load_config(global_path: &Path, project_path: &Path) -> Config {
    let mut config = Config::default();

    if global_path.exists() {
        config.merge(Config::load_or_default(global_path));
    }

    if project_path.exists() {
        config.merge(Config::load_or_default(project_path));
    }

    config
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert!(config.build.build_type.is_none());
        assert!(config.store.url.is_none());
        assert!(!config.store.offline);
    }

    #[test]
    fn test_config_load() {
        let tmp = TempDir::new().unwrap();
        let config_path = tmp.path().join("config.toml");

        std::fs::write(
            &config_path,
            r#"
[build]
build_type = "Release"
toolchains = ["x86_64", "aarch64"]

[store]
url = "https://packages.example.com"
offline = true
"#,
        )
        .unwrap();

        let config = Config::load(&config_path).unwrap();
        assert_eq!(config.build.build_type, Some("Release".to_string()));
        assert_eq!(
            config.build.toolchains,
            Some(vec!["x86_64".to_string(), "aarch64".to_string()])
        );
        assert_eq!(
            config.store.url,
            Some("https://packages.example.com".to_string())
        );
        assert!(config.store.offline);
    }

    #[test]
    fn test_config_merge() {
        let mut base = Config::default();
        base.build.build_type = Some("Debug".to_string());
        base.build.cmake_version = Some("3.16".to_string());

        let mut override_cfg = Config::default();
        override_cfg.build.build_type = Some("Release".to_string());

        base.merge(override_cfg);

        assert_eq!(base.build.build_type, Some("Release".to_string()));
        assert_eq!(base.build.cmake_version, Some("3.16".to_string())); // Not overridden
    }

    #[test]
    fn test_load_config_precedence() {
        let tmp = TempDir::new().unwrap();
        let global_path = tmp.path().join("global.toml");
        let project_path = tmp.path().join("project.toml");

        std::fs::write(
            &global_path,
            "[build]\nbuild_type = \"Debug\"\noutput_dir = \"dist\"\n",
        )
        .unwrap();
        std::fs::write(&project_path, "[build]\nbuild_type = \"Release\"\n").unwrap();

        let config = load_config(&global_path, &project_path);

        assert_eq!(config.build.build_type, Some("Release".to_string()));
        assert_eq!(config.build.output_dir, Some("dist".to_string()));
    }

    #[test]
    fn test_broken_config_falls_back_to_default() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        std::fs::write(&path, "[build\nbroken").unwrap();

        let config = Config::load_or_default(&path);
        assert!(config.build.build_type.is_none());
    }
}
