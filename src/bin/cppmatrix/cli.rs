//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

/// cppmatrix - build a C++ project for every standard x toolchain pair
#[derive(Parser)]
#[command(name = "cppmatrix")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate and build every target of the matrix
    Build(BuildArgs),

    /// List the targets the matrix expands to
    Matrix(MatrixArgs),

    /// Remove target output and fetched toolchains
    Clean(CleanArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Output format for build progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MessageFormat {
    Human,
    Json,
}

#[derive(Args)]
pub struct BuildArgs {
    /// Keep building remaining targets after a failure
    #[arg(long)]
    pub keep_going: bool,

    /// Only write CMakeLists.txt files; do not run cmake or make
    #[arg(long)]
    pub generate_only: bool,

    /// Remove the output directory before building
    #[arg(long)]
    pub clean: bool,

    /// Write install.json into each target directory
    #[arg(long)]
    pub install_manifest: bool,

    /// CMake build type (overrides the manifest)
    #[arg(long, value_name = "TYPE")]
    pub build_type: Option<String>,

    /// Number of parallel make jobs
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// Output format
    #[arg(long, value_enum, default_value = "human")]
    pub message_format: MessageFormat,

    /// Path to Matrix.toml
    #[arg(long, env = "CPPMATRIX_MANIFEST_PATH")]
    pub manifest_path: Option<PathBuf>,
}

#[derive(Args)]
pub struct MatrixArgs {
    /// Print the targets as JSON
    #[arg(long)]
    pub json: bool,

    /// Path to Matrix.toml
    #[arg(long, env = "CPPMATRIX_MANIFEST_PATH")]
    pub manifest_path: Option<PathBuf>,
}

#[derive(Args)]
pub struct CleanArgs {
    /// Path to Matrix.toml
    #[arg(long, env = "CPPMATRIX_MANIFEST_PATH")]
    pub manifest_path: Option<PathBuf>,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}
