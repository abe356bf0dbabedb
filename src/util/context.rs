//! Global context for cppmatrix operations.
//!
//! Provides centralized access to configuration paths and the package store.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use anyhow::{Context, Result};
use directories::{BaseDirs, ProjectDirs};

use crate::core::manifest::{find_manifest, MANIFEST_NAME};
use crate::util::config::{load_config, Config};

/// Project directories for cppmatrix
static PROJECT_DIRS: LazyLock<Option<ProjectDirs>> =
    LazyLock::new(|| ProjectDirs::from("com", "cppmatrix", "cppmatrix"));

/// Global context containing configuration and paths.
#[derive(Debug, Clone)]
pub struct GlobalContext {
    /// Current working directory
    cwd: PathBuf,

    /// Home directory for global data (~/.cppmatrix/)
    home: PathBuf,
}

impl GlobalContext {
    /// Create a new GlobalContext with defaults.
    pub fn new() -> Result<Self> {
        let cwd = std::env::current_dir().context("failed to get current directory")?;
        Ok(Self::with_cwd(cwd))
    }

    /// Create a GlobalContext with a specific working directory.
    pub fn with_cwd(cwd: PathBuf) -> Self {
        let home = std::env::var_os("CPPMATRIX_HOME")
            .map(PathBuf::from)
            .or_else(|| BaseDirs::new().map(|b| b.home_dir().join(".cppmatrix")))
            .or_else(|| PROJECT_DIRS.as_ref().map(|d| d.data_dir().to_path_buf()))
            .unwrap_or_else(|| PathBuf::from(".cppmatrix"));

        GlobalContext { cwd, home }
    }

    /// Override the home directory.
    pub fn with_home(mut self, home: PathBuf) -> Self {
        self.home = home;
        self
    }

    /// Get the current working directory.
    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// Get the cppmatrix home directory.
    pub fn home(&self) -> &Path {
        &self.home
    }

    /// Get the global configuration file path.
    pub fn config_path(&self) -> PathBuf {
        self.home.join("config.toml")
    }

    /// Get the project configuration file path for a project root.
    pub fn project_config_path(&self, project_root: &Path) -> PathBuf {
        project_root.join(".cppmatrix").join("config.toml")
    }

    /// Get the default package store directory.
    pub fn store_dir(&self) -> PathBuf {
        self.home.join("store")
    }

    /// Load the merged global + project configuration.
    pub fn load_config(&self, project_root: &Path) -> Config {
        load_config(&self.config_path(), &self.project_config_path(project_root))
    }

    /// Locate the manifest, either explicitly or by searching upward from cwd.
    pub fn find_manifest(&self, explicit: Option<&Path>) -> Result<PathBuf> {
        match explicit {
            Some(path) => {
                let path = if path.is_absolute() {
                    path.to_path_buf()
                } else {
                    self.cwd.join(path)
                };
                if !path.is_file() {
                    anyhow::bail!("manifest not found: {}", path.display());
                }
                Ok(path)
            }
            None => find_manifest(&self.cwd).ok_or_else(|| {
                anyhow::anyhow!(
                    "no manifest found: could not find `{}` in `{}` or any parent directory",
                    MANIFEST_NAME,
                    self.cwd.display()
                )
            }),
        }
    }
}
