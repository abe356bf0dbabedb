//! `cppmatrix matrix` command

use anyhow::Result;

use crate::cli::MatrixArgs;
use crate::commands::load_project;
use cppmatrix::core::expand;

pub fn execute(args: MatrixArgs) -> Result<()> {
    let project = load_project(args.manifest_path.as_deref())?;
    let config = &project.config;

    let targets = expand(&config.cpp_versions, &config.toolchains, &config.name);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&targets)?);
        return Ok(());
    }

    let output_root = config.output_root();
    for target in &targets {
        println!(
            "{:<40} {}",
            target.to_string(),
            target.output_dir(&output_root).display()
        );
    }

    Ok(())
}
