//! Core data structures.
//!
//! - The project description a build runs against
//! - The `Matrix.toml` manifest it is loaded from
//! - Build targets and matrix expansion

pub mod manifest;
pub mod project;
pub mod target;

pub use manifest::{find_manifest, Manifest, MANIFEST_NAME};
pub use project::{BuildConfiguration, Definition, ProjectKind, SuccessPolicy};
pub use target::{expand, BuildTarget};
