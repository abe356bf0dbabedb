//! High-level operations.
//!
//! This module contains the implementation of cppmatrix commands.

pub mod build;
pub mod install_manifest;

pub use build::{build, did_succeed, BuildOptions, BuildReport, TargetResult};
pub use install_manifest::{InstallManifest, INSTALL_MANIFEST};
