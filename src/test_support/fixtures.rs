//! Test fixtures for common project layouts.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::core::project::{BuildConfiguration, ProjectKind};

/// A project laid out on disk in a temporary directory.
///
/// The tree is removed when the fixture is dropped.
#[derive(Debug)]
pub struct ProjectFixture {
    pub name: String,
    kind: ProjectKind,
    dir: TempDir,
}

impl ProjectFixture {
    /// An executable project with a single `src/main.cpp`.
    pub fn binary(name: impl Into<String>) -> Self {
        let fixture = ProjectFixture::empty(name, ProjectKind::Bin);
        fixture.write(
            "src/main.cpp",
            "#include <thread>\n\nint main() {\n    std::thread t([] {});\n    t.join();\n    return 0;\n}\n",
        );
        fixture
    }

    /// A shared library project with sources under `src/` and a public
    /// include tree under `inc/`.
    pub fn library(name: impl Into<String>) -> Self {
        let fixture = ProjectFixture::empty(name, ProjectKind::Lib);
        let name = fixture.name.clone();
        fixture.write(
            &format!("inc/{}/api.h", name),
            &format!("#pragma once\n\nint {}_version();\n", name),
        );
        fixture.write(&format!("inc/{}/detail/impl.hpp", name), "#pragma once\n");
        fixture.write(
            "src/api.cpp",
            &format!(
                "#include <{0}/api.h>\n\nint {0}_version() {{ return 1; }}\n",
                name
            ),
        );
        fixture
    }

    fn empty(name: impl Into<String>, kind: ProjectKind) -> Self {
        ProjectFixture {
            name: name.into(),
            kind,
            dir: TempDir::new().unwrap(),
        }
    }

    /// Project root.
    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Write a file relative to the project root, creating parents.
    pub fn write(&self, rel: &str, contents: &str) -> PathBuf {
        let path = self.root().join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, contents).unwrap();
        path
    }

    /// Configuration building this project into `<root>/build`.
    pub fn config(&self) -> BuildConfiguration {
        let config = BuildConfiguration::new(
            self.name.clone(),
            self.kind,
            self.root().join("src"),
            self.root().join("build"),
        );

        if self.kind.is_library() {
            config.with_inc_dir(self.root().join("inc"))
        } else {
            config
        }
    }

    /// A `Matrix.toml` describing this project.
    pub fn manifest(&self) -> String {
        let mut manifest = format!(
            "[project]\nname = \"{}\"\nkind = \"{}\"\n",
            self.name, self.kind
        );
        if self.kind.is_library() {
            manifest.push_str("\n[paths]\ninc = \"inc\"\n");
        }
        manifest
    }
}
