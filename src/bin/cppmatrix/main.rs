//! cppmatrix CLI - build a C++ project across standards and toolchains

use std::io::IsTerminal;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use cppmatrix::util::diagnostic;
use cppmatrix::BuildError;

mod cli;
mod commands;

use cli::{Cli, Commands};

fn main() {
    if let Err(e) = run() {
        report(&e);
        std::process::exit(1);
    }
}

/// Print an error, with tool output and suggestions when it carries them.
fn report(e: &anyhow::Error) {
    match e.downcast_ref::<BuildError>() {
        Some(err) => {
            let mut diag = err.to_diagnostic();
            diag.message = format!("{:#}", e);
            diagnostic::emit(&diag, std::io::stderr().is_terminal());
        }
        None => eprintln!("error: {:#}", e),
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("cppmatrix=debug")
    } else {
        EnvFilter::new("cppmatrix=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    match cli.command {
        Commands::Build(args) => commands::build::execute(args, cli.verbose),
        Commands::Matrix(args) => commands::matrix::execute(args),
        Commands::Clean(args) => commands::clean::execute(args),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}
