//! Per-target build steps.
//!
//! Toolchain acquisition, CMake generation, the external configure/compile
//! driver, and header packaging for library targets.

pub mod cmake;
pub mod discover;
pub mod driver;
pub mod error;
pub mod events;
pub mod header;
pub mod toolchain;

pub use cmake::{CMakeLists, Directive};
pub use driver::{BuildDriver, MakeDriver};
pub use error::BuildError;
pub use events::BuildEvent;
pub use toolchain::{open_store, DirectoryStore, HttpStore, PackageStore, ToolchainBundle};
