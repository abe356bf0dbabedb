//! `cppmatrix build` command

use anyhow::Result;

use crate::cli::{BuildArgs, MessageFormat};
use crate::commands::load_project;
use cppmatrix::builder::toolchain::open_store;
use cppmatrix::builder::MakeDriver;
use cppmatrix::ops::build::{build, BuildOptions};
use cppmatrix::util::Shell;

pub fn execute(args: BuildArgs, verbose: bool) -> Result<()> {
    let mut project = load_project(args.manifest_path.as_deref())?;

    if let Some(build_type) = args.build_type {
        project.config.build_type = build_type;
    }

    let store = open_store(&project.settings.store, &project.ctx.store_dir())?;

    // Generation alone never runs the tools, so they need not be installed.
    let driver = if args.generate_only {
        MakeDriver::new("cmake", "make")
    } else {
        MakeDriver::detect()?.with_jobs(args.jobs)
    };

    let opts = BuildOptions {
        keep_going: args.keep_going,
        generate_only: args.generate_only,
        clean: args.clean,
        install_manifest: args.install_manifest,
    };

    let mut shell = Shell::from_flags(verbose, args.message_format == MessageFormat::Json);
    build(&project.config, &*store, &driver, &opts, &mut |event| {
        shell.build_event(event)
    })?;

    Ok(())
}
