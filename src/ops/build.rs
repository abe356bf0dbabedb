//! Implementation of `cppmatrix build`.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};

use crate::builder::cmake::generate;
use crate::builder::driver::BuildDriver;
use crate::builder::error::BuildError;
use crate::builder::events::BuildEvent;
use crate::builder::header::{package_headers, write_umbrella_header};
use crate::builder::toolchain::PackageStore;
use crate::core::project::{BuildConfiguration, SuccessPolicy};
use crate::core::target::{expand, BuildTarget};
use crate::ops::install_manifest::InstallManifest;
use crate::util::fs::{dir_has_entries, ensure_dir, remove_dir_all_if_exists};

/// Options for the build command.
#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    /// Continue with the remaining targets after a failure
    pub keep_going: bool,

    /// Stop after writing each target's CMakeLists.txt
    pub generate_only: bool,

    /// Remove the output directory before building
    pub clean: bool,

    /// Write `install.json` into each target directory
    pub install_manifest: bool,
}

/// Outcome of one target.
#[derive(Debug)]
pub struct TargetResult {
    pub target: BuildTarget,
    pub output_dir: PathBuf,
    /// Rendered error, if the target failed
    pub error: Option<String>,
}

impl TargetResult {
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

/// Build result.
#[derive(Debug, Default)]
pub struct BuildReport {
    pub targets: Vec<TargetResult>,
    pub duration: Duration,
}

impl BuildReport {
    pub fn built(&self) -> usize {
        self.targets.iter().filter(|t| t.succeeded()).count()
    }

    pub fn failed(&self) -> Vec<&TargetResult> {
        self.targets.iter().filter(|t| !t.succeeded()).collect()
    }
}

/// Whether a finished target directory satisfies `policy`.
pub fn did_succeed(policy: &SuccessPolicy, output_dir: &Path) -> bool {
    match policy {
        SuccessPolicy::NonEmptyDirectory => dir_has_entries(output_dir),
        SuccessPolicy::FileExists(name) => output_dir.join(name).exists(),
    }
}

/// Build every target of the configuration's version × toolchain matrix.
///
/// Targets run one after another in matrix order. The first failure aborts
/// the build unless `opts.keep_going` is set, in which case every target is
/// attempted and the failures are reported together as
/// [`BuildError::TargetsFailed`].
pub fn build(
    config: &BuildConfiguration,
    store: &dyn PackageStore,
    driver: &dyn BuildDriver,
    opts: &BuildOptions,
    on_event: &mut dyn FnMut(&BuildEvent),
) -> Result<BuildReport> {
    let start = Instant::now();
    let output_root = config.output_root();

    if opts.clean {
        tracing::info!("Removing {}", output_root.display());
        remove_dir_all_if_exists(&output_root)?;
    }

    let targets = expand(&config.cpp_versions, &config.toolchains, &config.name);
    if targets.is_empty() {
        tracing::warn!("Nothing to build: no C++ versions or toolchains configured");
    }

    let total = targets.len();
    let mut report = BuildReport::default();
    let mut first_error = None;

    for (i, target) in targets.into_iter().enumerate() {
        let output_dir = target.output_dir(&output_root);
        on_event(&BuildEvent::started(&target.name, i + 1, total));
        tracing::info!("Building {} ({}/{})", target.name, i + 1, total);

        let result = build_target(&target, config, store, driver, opts, &output_dir);
        let error = result.as_ref().err().map(|e| e.to_string());
        on_event(&BuildEvent::target_finished(
            &target.name,
            &output_dir,
            error.clone(),
        ));

        let name = target.name.clone();
        report.targets.push(TargetResult {
            target,
            output_dir,
            error,
        });

        if let Err(err) = result {
            tracing::debug!("Target {} failed: {}", name, err);
            if !opts.keep_going {
                first_error = Some((name, err));
                break;
            }
        }
    }

    report.duration = start.elapsed();
    let failed: Vec<String> = report
        .failed()
        .iter()
        .map(|t| t.target.name.clone())
        .collect();

    on_event(&BuildEvent::BuildFinished {
        success: failed.is_empty(),
        duration_ms: report.duration.as_millis() as u64,
        targets_built: report.built(),
        targets_failed: failed.len(),
    });

    if let Some((name, err)) = first_error {
        return Err(err).with_context(|| format!("failed to build target `{}`", name));
    }
    if !failed.is_empty() {
        return Err(BuildError::TargetsFailed { failed, total }.into());
    }

    Ok(report)
}

/// Run every step for one target.
fn build_target(
    target: &BuildTarget,
    config: &BuildConfiguration,
    store: &dyn PackageStore,
    driver: &dyn BuildDriver,
    opts: &BuildOptions,
    output_dir: &Path,
) -> Result<(), BuildError> {
    ensure_dir(output_dir)?;
    generate(target, config, store, output_dir)?;

    if opts.generate_only {
        return Ok(());
    }

    driver.configure(output_dir, Path::new("."))?;
    driver.compile(output_dir)?;

    if config.kind.is_library() {
        if let Some(inc) = &config.inc_dir {
            package_headers(inc, output_dir)?;
            write_umbrella_header(inc, output_dir, &config.name)?;
        }
    }

    if opts.install_manifest {
        InstallManifest::scan(config, output_dir)?.write(output_dir)?;
    }

    if !did_succeed(&config.success, output_dir) {
        return Err(BuildError::NoOutput {
            target: target.name.clone(),
            path: output_dir.to_path_buf(),
        });
    }

    Ok(())
}
