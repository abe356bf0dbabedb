//! External configure/compile invocation.
//!
//! Each call runs synchronously in an explicit working directory. A hung
//! tool hangs the build; there is no timeout.

use std::path::{Path, PathBuf};

use crate::builder::error::BuildError;
use crate::util::process::{find_cmake, find_make, ProcessBuilder};

/// Runs the configure and compile steps of a generated project.
pub trait BuildDriver {
    /// Configure the project in `source_dir`, with `cwd` as the build tree.
    fn configure(&self, cwd: &Path, source_dir: &Path) -> Result<(), BuildError>;

    /// Compile the configured project in `cwd`.
    fn compile(&self, cwd: &Path) -> Result<(), BuildError>;
}

/// `cmake <path>` followed by `make`.
#[derive(Debug, Clone)]
pub struct MakeDriver {
    cmake: PathBuf,
    make: PathBuf,
    jobs: Option<usize>,
}

impl MakeDriver {
    /// Locate `cmake` and `make` on PATH.
    pub fn detect() -> Result<Self, BuildError> {
        let missing = |tool: &str| BuildError::ExternalTool {
            command: tool.to_string(),
            code: None,
            stdout: String::new(),
            stderr: format!("`{}` not found in PATH", tool),
        };

        let cmake = find_cmake().ok_or_else(|| missing("cmake"))?;
        let make = find_make().ok_or_else(|| missing("make"))?;

        Ok(MakeDriver::new(cmake, make))
    }

    pub fn new(cmake: impl Into<PathBuf>, make: impl Into<PathBuf>) -> Self {
        MakeDriver {
            cmake: cmake.into(),
            make: make.into(),
            jobs: None,
        }
    }

    /// Pass `-j<jobs>` to make.
    pub fn with_jobs(mut self, jobs: Option<usize>) -> Self {
        self.jobs = jobs;
        self
    }

    fn configure_command(&self, cwd: &Path, source_dir: &Path) -> ProcessBuilder {
        ProcessBuilder::new(&self.cmake).arg(source_dir).cwd(cwd)
    }

    fn compile_command(&self, cwd: &Path) -> ProcessBuilder {
        let cmd = ProcessBuilder::new(&self.make).cwd(cwd);
        match self.jobs {
            Some(jobs) => cmd.arg(format!("-j{}", jobs)),
            None => cmd,
        }
    }
}

impl BuildDriver for MakeDriver {
    fn configure(&self, cwd: &Path, source_dir: &Path) -> Result<(), BuildError> {
        tracing::info!("Configuring in {}", cwd.display());
        self.configure_command(cwd, source_dir).exec_and_check()?;
        Ok(())
    }

    fn compile(&self, cwd: &Path) -> Result<(), BuildError> {
        tracing::info!("Compiling in {}", cwd.display());
        self.compile_command(cwd).exec_and_check()?;
        Ok(())
    }
}
