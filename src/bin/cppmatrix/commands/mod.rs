//! Command implementations

pub mod build;
pub mod clean;
pub mod completions;
pub mod matrix;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use cppmatrix::core::{BuildConfiguration, Manifest};
use cppmatrix::util::{Config, GlobalContext};

/// A loaded project: its manifest resolved against the user configuration.
pub struct Project {
    pub ctx: GlobalContext,
    pub root: PathBuf,
    pub settings: Config,
    pub config: BuildConfiguration,
}

/// Find and load the project manifest.
pub fn load_project(manifest_path: Option<&Path>) -> Result<Project> {
    let ctx = GlobalContext::new()?;
    let manifest_path = ctx.find_manifest(manifest_path)?;
    let root = manifest_path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| ctx.cwd().to_path_buf());

    let manifest = Manifest::load(&manifest_path)?;
    let settings = ctx.load_config(&root);
    let config = manifest
        .to_configuration(&root, &settings.build)
        .with_context(|| format!("failed to load {}", manifest_path.display()))?;

    tracing::debug!("Loaded `{}` from {}", config.name, manifest_path.display());

    Ok(Project {
        ctx,
        root,
        settings,
        config,
    })
}
