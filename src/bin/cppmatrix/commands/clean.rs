//! `cppmatrix clean` command

use anyhow::Result;

use crate::cli::CleanArgs;
use crate::commands::load_project;
use cppmatrix::util::fs::remove_dir_all_if_exists;

pub fn execute(args: CleanArgs) -> Result<()> {
    let project = load_project(args.manifest_path.as_deref())?;

    for dir in [
        project.config.output_root(),
        project.config.toolchain_root(),
    ] {
        if dir.exists() {
            remove_dir_all_if_exists(&dir)?;
            eprintln!("     Removed {}", dir.display());
        }
    }

    tracing::debug!("Cleaned {}", project.root.display());
    Ok(())
}
