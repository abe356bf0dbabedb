//! cppmatrix - build a C++ project across a matrix of standards and toolchains
//!
//! Each (C++ standard, toolchain) pair becomes its own target with a
//! generated CMakeLists.txt, configured and compiled by the host's `cmake`
//! and `make`. Library targets additionally ship their headers and an
//! umbrella header.

pub mod builder;
pub mod core;
pub mod ops;
pub mod util;

/// Test utilities and mocks for unit tests.
///
/// Only compiled for tests. Provides a package store and a build driver
/// that never touch the network or run external tools.
#[cfg(test)]
pub mod test_support;

pub use builder::{BuildDriver, BuildError, MakeDriver, PackageStore};
pub use core::{BuildConfiguration, BuildTarget, Manifest, ProjectKind};
pub use util::context::GlobalContext;
