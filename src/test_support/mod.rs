//! Test utilities and mocks for unit tests.
//!
//! Mocks stand in for the two external collaborators of a build: the
//! package store that supplies toolchain bundles and the driver that runs
//! `cmake`/`make`.
//!
//! # Example
//!
//! ```rust,ignore
//! use cppmatrix::test_support::{MockDriver, MockStore, ProjectFixture};
//!
//! #[test]
//! fn test_example() {
//!     let fixture = ProjectFixture::binary("app");
//!     let store = MockStore::with_bundle(fixture.root().join("store"), "x86_64");
//!     let driver = MockDriver::new().with_artifact("app");
//!
//!     // Run a build against the mocks...
//! }
//! ```

pub mod fixtures;

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::builder::driver::BuildDriver;
use crate::builder::error::BuildError;
use crate::builder::toolchain::{DownloadOptions, PackageStore};

pub use fixtures::*;

/// Write a minimal toolchain bundle for `id` into `dir`.
pub fn write_bundle(dir: &Path, id: &str) {
    fs::create_dir_all(dir.join("bin")).unwrap();
    fs::write(
        dir.join(format!("{}.cmake", id)),
        "set(CMAKE_SYSTEM_NAME Linux)\n",
    )
    .unwrap();
}

/// In-memory record of store downloads over a real directory.
///
/// A download either produces a complete bundle or an empty package
/// directory, depending on how the store was created.
#[derive(Debug)]
pub struct MockStore {
    root: PathBuf,
    /// Toolchain id whose bundle a download produces, if any.
    serves: Option<String>,
    requests: Mutex<Vec<(String, DownloadOptions)>>,
}

impl MockStore {
    /// A store that already holds the bundle for `id`.
    pub fn with_bundle(root: impl Into<PathBuf>, id: &str) -> Self {
        let store = MockStore::empty(root);
        write_bundle(&store.root.join(format!("{}.toolchain", id)), id);
        store
    }

    /// A store whose downloads produce empty packages.
    pub fn empty(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        fs::create_dir_all(&root).unwrap();
        MockStore {
            root,
            serves: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// A store that holds nothing yet but can download the bundle for `id`.
    pub fn downloading(root: impl Into<PathBuf>, id: &str) -> Self {
        MockStore {
            serves: Some(id.to_string()),
            ..MockStore::empty(root)
        }
    }

    /// Number of download calls so far.
    pub fn downloads(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<(String, DownloadOptions)> {
        self.requests.lock().unwrap().clone()
    }
}

impl PackageStore for MockStore {
    fn root(&self) -> &Path {
        &self.root
    }

    fn download(&self, package: &str, opts: &DownloadOptions) -> Result<PathBuf, BuildError> {
        self.requests
            .lock()
            .unwrap()
            .push((package.to_string(), *opts));

        let dir = self.package_dir(package);
        match &self.serves {
            Some(id) if package == format!("{}.toolchain", id) => write_bundle(&dir, id),
            _ => fs::create_dir_all(&dir).unwrap(),
        }
        Ok(dir)
    }
}

/// A driver call recorded by [`MockDriver`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DriverCall {
    Configure { cwd: PathBuf, source_dir: PathBuf },
    Compile { cwd: PathBuf },
}

/// Records configure/compile calls instead of running external tools.
#[derive(Debug, Default)]
pub struct MockDriver {
    calls: Mutex<Vec<DriverCall>>,
    /// File written into the build directory on a successful compile.
    artifact: Option<String>,
    /// Compile fails when the build directory path contains this string.
    fail_when: Option<String>,
}

impl MockDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_artifact(mut self, name: impl Into<String>) -> Self {
        self.artifact = Some(name.into());
        self
    }

    /// Fail compilation for build directories whose path contains `pattern`.
    pub fn failing_for(mut self, pattern: impl Into<String>) -> Self {
        self.fail_when = Some(pattern.into());
        self
    }

    pub fn calls(&self) -> Vec<DriverCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn compiles(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, DriverCall::Compile { .. }))
            .count()
    }
}

impl BuildDriver for MockDriver {
    fn configure(&self, cwd: &Path, source_dir: &Path) -> Result<(), BuildError> {
        self.calls.lock().unwrap().push(DriverCall::Configure {
            cwd: cwd.to_path_buf(),
            source_dir: source_dir.to_path_buf(),
        });
        Ok(())
    }

    fn compile(&self, cwd: &Path) -> Result<(), BuildError> {
        self.calls.lock().unwrap().push(DriverCall::Compile {
            cwd: cwd.to_path_buf(),
        });

        if let Some(pattern) = &self.fail_when {
            if cwd.to_string_lossy().contains(pattern.as_str()) {
                return Err(BuildError::ExternalTool {
                    command: "make".to_string(),
                    code: Some(2),
                    stdout: String::new(),
                    stderr: "main.cpp:1:1: error: expected unqualified-id".to_string(),
                });
            }
        }

        if let Some(artifact) = &self.artifact {
            fs::write(cwd.join(artifact), "").unwrap();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_mock_store_download_modes() {
        let tmp = TempDir::new().unwrap();

        let store = MockStore::downloading(tmp.path().join("a"), "x86_64");
        let dir = store
            .download("x86_64.toolchain", &DownloadOptions::bundle())
            .unwrap();
        assert!(dir.join("x86_64.cmake").is_file());

        let store = MockStore::empty(tmp.path().join("b"));
        let dir = store
            .download("x86_64.toolchain", &DownloadOptions::bundle())
            .unwrap();
        assert!(dir.is_dir());
        assert!(!dir.join("x86_64.cmake").exists());
        assert_eq!(store.downloads(), 1);
    }

    #[test]
    fn test_mock_driver_records_and_fails() {
        let tmp = TempDir::new().unwrap();
        let ok = tmp.path().join("lib_x86_64_cpp17_app");
        let bad = tmp.path().join("lib_x86_64_cpp98_app");
        fs::create_dir_all(&ok).unwrap();
        fs::create_dir_all(&bad).unwrap();

        let driver = MockDriver::new().with_artifact("app").failing_for("cpp98");
        driver.configure(&ok, Path::new(".")).unwrap();
        driver.compile(&ok).unwrap();
        assert!(driver.compile(&bad).is_err());

        assert!(ok.join("app").is_file());
        assert!(!bad.join("app").exists());
        assert_eq!(driver.compiles(), 2);
        assert_eq!(
            driver.calls()[0],
            DriverCall::Configure {
                cwd: ok.clone(),
                source_dir: PathBuf::from("."),
            }
        );
    }
}
