//! Toolchain bundles and the package store they come from.
//!
//! A bundle is a directory holding a CMake toolchain file named
//! `<id>.cmake` and a `bin/` directory. Bundles live in a package store as
//! `<id>.toolchain` packages and are copied into the project's toolchain
//! directory the first time a target needs them.

use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;
use sha2::{Digest, Sha256};
use tar::Archive;
use url::Url;

use crate::builder::error::BuildError;
use crate::util::config::StoreConfig;
use crate::util::fs::{copy_dir_all, ensure_dir};

/// Options forwarded to the store when downloading a package.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DownloadOptions {
    /// Register anything the package exports with the host. Bundles export nothing.
    pub register_classes: bool,
    /// Download into `<root>/<package>` rather than `<root>`.
    pub create_sub_directory: bool,
}

impl DownloadOptions {
    /// Options used for toolchain bundles.
    pub fn bundle() -> Self {
        DownloadOptions {
            register_classes: false,
            create_sub_directory: true,
        }
    }
}

/// The host's package-download capability.
pub trait PackageStore {
    /// Directory the store keeps packages in.
    fn root(&self) -> &Path;

    /// Where a package lives once it is in the store.
    fn package_dir(&self, package: &str) -> PathBuf {
        self.root().join(package)
    }

    /// Fetch `package` into the store, returning its directory.
    fn download(&self, package: &str, opts: &DownloadOptions) -> Result<PathBuf, BuildError>;
}

/// Store name of the package holding toolchain `id`.
pub fn bundle_package(id: &str) -> String {
    format!("{}.toolchain", id)
}

/// A toolchain bundle present in the project's toolchain directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolchainBundle {
    pub id: String,
    pub root: PathBuf,
    /// `<root>/<id>.cmake`
    pub cmake_file: PathBuf,
    /// `<root>/bin`
    pub bin_dir: PathBuf,
}

impl ToolchainBundle {
    /// Describe the bundle for `id` rooted at `root` (nothing is checked).
    pub fn at(id: &str, root: &Path) -> Self {
        ToolchainBundle {
            id: id.to_string(),
            root: root.to_path_buf(),
            cmake_file: root.join(format!("{}.cmake", id)),
            bin_dir: root.join("bin"),
        }
    }
}

/// Make toolchain `id` available under `toolchain_root/<id>`.
///
/// Nothing is downloaded when the directory already exists. Otherwise the
/// store is asked for the bundle once, if it does not have it yet, and the
/// bundle is copied in. Fails with [`BuildError::Configuration`] when the
/// toolchain file is still missing afterwards.
pub fn acquire(
    id: &str,
    toolchain_root: &Path,
    store: &dyn PackageStore,
) -> Result<ToolchainBundle, BuildError> {
    let bundle = ToolchainBundle::at(id, &toolchain_root.join(id));

    if !bundle.root.is_dir() {
        let package = bundle_package(id);
        let source = store.package_dir(&package);

        if !source.is_dir() {
            tracing::info!("Fetching toolchain package `{}`", package);
            store.download(&package, &DownloadOptions::bundle())?;
        }

        if source.is_dir() {
            install_bundle(&source, &bundle)?;
        }
    }

    if !bundle.cmake_file.is_file() {
        return Err(BuildError::Configuration {
            toolchain: id.to_string(),
            path: bundle.cmake_file,
        });
    }

    Ok(bundle)
}

/// Copy a store package into place through a staging directory.
///
/// The bundle directory only appears once a complete copy holding the
/// toolchain file exists, so an interrupted or empty copy is retried on the
/// next run.
fn install_bundle(source: &Path, bundle: &ToolchainBundle) -> Result<(), BuildError> {
    let parent = bundle.root.parent().unwrap_or_else(|| Path::new("."));
    ensure_dir(parent)?;

    let staging = tempfile::TempDir::new_in(parent)
        .map_err(|e| BuildError::fs("failed to create staging directory in", parent, e))?;
    tracing::debug!("Copying {} to {}", source.display(), bundle.root.display());
    copy_dir_all(source, staging.path())?;

    if !staging.path().join(format!("{}.cmake", bundle.id)).is_file() {
        tracing::warn!(
            "store package {} has no `{}.cmake`",
            source.display(),
            bundle.id
        );
        return Ok(());
    }

    std::fs::rename(staging.path(), &bundle.root)
        .map_err(|e| BuildError::fs("failed to move toolchain bundle into", &bundle.root, e))
}

/// A store that only serves what is already on disk.
#[derive(Debug, Clone)]
pub struct DirectoryStore {
    root: PathBuf,
}

impl DirectoryStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        DirectoryStore { root: root.into() }
    }
}

impl PackageStore for DirectoryStore {
    fn root(&self) -> &Path {
        &self.root
    }

    fn download(&self, package: &str, _opts: &DownloadOptions) -> Result<PathBuf, BuildError> {
        Err(BuildError::Store {
            package: package.to_string(),
            message: format!(
                "not present in {} and no store URL is configured",
                self.root.display()
            ),
        })
    }
}

/// A store backed by an HTTP server serving `<package>.tar.gz` archives.
///
/// If the server also serves `<package>.tar.gz.sha256`, the archive is
/// checked against it before extraction.
#[derive(Debug, Clone)]
pub struct HttpStore {
    root: PathBuf,
    base_url: Url,
    offline: bool,
}

impl HttpStore {
    pub fn new(root: impl Into<PathBuf>, base_url: &str, offline: bool) -> Result<Self, BuildError> {
        let mut base = base_url.to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base_url = Url::parse(&base).map_err(|e| BuildError::Store {
            package: String::new(),
            message: format!("invalid store URL `{}`: {}", base_url, e),
        })?;

        Ok(HttpStore {
            root: root.into(),
            base_url,
            offline,
        })
    }

    /// URL of the archive for `package`.
    pub fn archive_url(&self, package: &str) -> Result<Url, BuildError> {
        self.base_url
            .join(&format!("{}.tar.gz", package))
            .map_err(|e| BuildError::Store {
                package: package.to_string(),
                message: e.to_string(),
            })
    }

    fn fetch(&self, url: &Url, package: &str) -> Result<Option<Vec<u8>>, BuildError> {
        let store_err = |message: String| BuildError::Store {
            package: package.to_string(),
            message,
        };

        let response = reqwest::blocking::get(url.as_str())
            .map_err(|e| store_err(format!("failed to download {}: {}", url, e)))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(store_err(format!(
                "failed to download {}: HTTP {}",
                url,
                response.status()
            )));
        }

        let bytes = response
            .bytes()
            .map_err(|e| store_err(format!("failed to read {}: {}", url, e)))?;
        Ok(Some(bytes.to_vec()))
    }
}

impl PackageStore for HttpStore {
    fn root(&self) -> &Path {
        &self.root
    }

    fn download(&self, package: &str, opts: &DownloadOptions) -> Result<PathBuf, BuildError> {
        if self.offline {
            return Err(BuildError::Store {
                package: package.to_string(),
                message: "store is offline".to_string(),
            });
        }

        let url = self.archive_url(package)?;
        tracing::info!("Downloading {}", url);

        let data = self.fetch(&url, package)?.ok_or_else(|| BuildError::Store {
            package: package.to_string(),
            message: format!("{} not found", url),
        })?;

        let checksum_url = Url::parse(&format!("{}.sha256", url)).map_err(|e| BuildError::Store {
            package: package.to_string(),
            message: e.to_string(),
        })?;
        if let Some(expected) = self.fetch(&checksum_url, package)? {
            verify_sha256(&data, &String::from_utf8_lossy(&expected), package)?;
        }

        let dest = if opts.create_sub_directory {
            self.package_dir(package)
        } else {
            self.root.clone()
        };

        ensure_dir(&self.root)?;
        let staging = tempfile::TempDir::new_in(&self.root)
            .map_err(|e| BuildError::fs("failed to create staging directory in", &self.root, e))?;
        extract_bundle(&data, staging.path())?;

        let extracted = single_top_level_dir(staging.path()).unwrap_or_else(|| staging.path().to_path_buf());
        copy_dir_all(&extracted, &dest)?;

        tracing::info!("Stored `{}` in {}", package, dest.display());
        Ok(dest)
    }
}

/// Check `data` against a hex SHA-256 digest (`sha256sum` output is accepted).
pub fn verify_sha256(data: &[u8], expected: &str, package: &str) -> Result<(), BuildError> {
    let expected = expected.split_whitespace().next().unwrap_or("").to_lowercase();
    let actual = hex::encode(Sha256::digest(data));

    if actual != expected {
        return Err(BuildError::Store {
            package: package.to_string(),
            message: format!("checksum mismatch: expected {}, got {}", expected, actual),
        });
    }

    tracing::debug!("Checksum verified for `{}`", package);
    Ok(())
}

/// Extract a gzip-compressed tarball into `dest`.
pub fn extract_bundle(data: &[u8], dest: &Path) -> Result<(), BuildError> {
    let mut decoder = GzDecoder::new(Cursor::new(data));
    let mut tarball = Vec::new();
    decoder
        .read_to_end(&mut tarball)
        .map_err(|e| BuildError::fs("failed to decompress bundle into", dest, e))?;

    Archive::new(Cursor::new(tarball))
        .unpack(dest)
        .map_err(|e| BuildError::fs("failed to extract bundle into", dest, e))
}

/// If `dir` holds exactly one entry and it is a directory, return it.
fn single_top_level_dir(dir: &Path) -> Option<PathBuf> {
    let mut entries = std::fs::read_dir(dir).ok()?.filter_map(Result::ok);
    let first = entries.next()?;
    if entries.next().is_some() || !first.path().is_dir() {
        return None;
    }
    Some(first.path())
}

/// Open the store described by the user configuration.
pub fn open_store(
    config: &StoreConfig,
    default_root: &Path,
) -> Result<Box<dyn PackageStore>, BuildError> {
    let root = config
        .path
        .clone()
        .unwrap_or_else(|| default_root.to_path_buf());

    match &config.url {
        Some(url) => Ok(Box::new(HttpStore::new(root, url, config.offline)?)),
        None => Ok(Box::new(DirectoryStore::new(root))),
    }
}
