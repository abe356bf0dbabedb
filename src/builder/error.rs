//! Build error types and diagnostics.

use std::path::PathBuf;

use miette::Diagnostic as MietteDiagnostic;
use thiserror::Error;

use crate::util::diagnostic::Diagnostic;

/// Error raised while building one or more targets.
#[derive(Debug, Error, MietteDiagnostic)]
pub enum BuildError {
    /// A toolchain bundle is missing its CMake description file.
    #[error("could not find toolchain file: {}", .path.display())]
    #[diagnostic(
        code(cppmatrix::toolchain::missing_file),
        help("a toolchain bundle must contain `<toolchain>.cmake` at its root")
    )]
    Configuration { toolchain: String, path: PathBuf },

    /// `cmake` or `make` exited with a nonzero status.
    #[error("`{command}` failed with exit code {code:?}")]
    #[diagnostic(code(cppmatrix::external_tool))]
    ExternalTool {
        command: String,
        code: Option<i32>,
        stdout: String,
        stderr: String,
    },

    /// Directory creation, copy or file write failed.
    #[error("{action} `{}`", .path.display())]
    #[diagnostic(code(cppmatrix::fs))]
    Filesystem {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A generated JSON document could not be serialized.
    #[error("failed to serialize `{}`", .path.display())]
    #[diagnostic(code(cppmatrix::serialize))]
    Serialize {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Project kind outside the supported set.
    #[error("unsupported project kind `{0}`")]
    #[diagnostic(
        code(cppmatrix::manifest::kind),
        help("supported kinds are: lib, mod, bin, srv, test")
    )]
    UnsupportedKind(String),

    /// Invalid or unreadable project manifest.
    #[error("invalid manifest `{}`: {message}", .path.display())]
    #[diagnostic(code(cppmatrix::manifest::invalid))]
    Manifest { path: PathBuf, message: String },

    /// The package store could not provide a bundle.
    #[error("failed to fetch `{package}` from the package store: {message}")]
    #[diagnostic(
        code(cppmatrix::store::fetch),
        help("populate the store manually or set `store.url` in your config")
    )]
    Store { package: String, message: String },

    /// A target finished every step but produced nothing.
    #[error("target `{target}` produced no output in `{}`", .path.display())]
    #[diagnostic(code(cppmatrix::build::no_output))]
    NoOutput { target: String, path: PathBuf },

    /// One or more targets failed while continuing past failures.
    #[error("{} of {total} targets failed: {}", .failed.len(), .failed.join(", "))]
    #[diagnostic(code(cppmatrix::build::targets_failed))]
    TargetsFailed { failed: Vec<String>, total: usize },
}

impl BuildError {
    /// Wrap an I/O error with the action and path that caused it.
    pub fn fs(action: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        BuildError::Filesystem {
            action,
            path: path.into(),
            source,
        }
    }

    /// Convert to a user-facing diagnostic with the tool output attached.
    pub fn to_diagnostic(&self) -> Diagnostic {
        let mut diag = Diagnostic::error(self.to_string());

        match self {
            BuildError::Configuration { toolchain, path } => {
                diag = diag.with_location(path).with_suggestion(format!(
                    "Check that the `{}.toolchain` package ships `{}.cmake`",
                    toolchain, toolchain
                ));
            }
            BuildError::ExternalTool { stdout, stderr, .. } => {
                for line in stdout.lines().chain(stderr.lines()) {
                    diag = diag.with_context(line);
                }
            }
            BuildError::Filesystem { source, .. } => {
                diag = diag.with_context(source.to_string());
            }
            BuildError::Serialize { source, .. } => {
                diag = diag.with_context(source.to_string());
            }
            BuildError::UnsupportedKind(_) => {
                diag = diag.with_suggestion("Use one of: lib, mod, bin, srv, test");
            }
            BuildError::TargetsFailed { failed, .. } => {
                for target in failed {
                    diag = diag.with_context(format!("failed: {}", target));
                }
            }
            _ => {}
        }

        diag
    }
}
