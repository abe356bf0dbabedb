//! CMakeLists.txt generation.
//!
//! The project description is built as an ordered list of typed
//! [`Directive`]s and only turned into text at the end, so paths, names and
//! definition values are quoted and escaped consistently.

use std::fmt::{self, Write as _};
use std::path::{Path, PathBuf};

use crate::builder::discover::{link_libraries, source_files};
use crate::builder::error::BuildError;
use crate::builder::toolchain::{acquire, PackageStore, ToolchainBundle};
use crate::core::project::{BuildConfiguration, Definition};
use crate::core::target::BuildTarget;
use crate::util::fs::write_string;

/// File name of the generated project description.
pub const CMAKE_LISTS: &str = "CMakeLists.txt";

/// Link rule for executables that keeps every object of the linked archives.
pub const WHOLE_ARCHIVE_LINK_EXECUTABLE: &str = "<CMAKE_CXX_COMPILER>  <FLAGS> <CMAKE_CXX_LINK_FLAGS> <LINK_FLAGS> <OBJECTS> -o <TARGET> -Wl,--start-group -Wl,--whole-archive <LINK_LIBRARIES> -Wl,--no-whole-archive -Wl,--end-group";

/// Link rule for shared libraries that keeps every object of the linked archives.
pub const WHOLE_ARCHIVE_CREATE_SHARED_LIBRARY: &str = "<CMAKE_CXX_COMPILER> <CMAKE_SHARED_LIBRARY_CXX_FLAGS> <LANGUAGE_COMPILE_FLAGS> <LINK_FLAGS> <CMAKE_SHARED_LIBRARY_CREATE_CXX_FLAGS> <SONAME_FLAG><TARGET_SONAME> -o <TARGET> <OBJECTS> -Wl,--start-group -Wl,--whole-archive <LINK_LIBRARIES> -Wl,--no-whole-archive -Wl,--end-group";

/// A single CMake argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Arg {
    /// A CMake keyword such as `SHARED` or `REQUIRED`, written verbatim.
    Keyword(&'static str),
    /// A user value, quoted when needed.
    Value(String),
}

impl Arg {
    pub fn value(value: impl Into<String>) -> Self {
        Arg::Value(value.into())
    }

    pub fn path(path: &Path) -> Self {
        Arg::Value(path.display().to_string())
    }
}

impl fmt::Display for Arg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arg::Keyword(k) => f.write_str(k),
            Arg::Value(v) => f.write_str(&quote(v)),
        }
    }
}

/// Quote a CMake argument if it would otherwise be split or expanded.
pub fn quote(value: &str) -> String {
    let needs_quotes = value.is_empty()
        || value
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, ';' | '(' | ')' | '#' | '"' | '\\' | '$'));

    if !needs_quotes {
        return value.to_string();
    }

    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for c in value.chars() {
        match c {
            '\\' | '"' | '$' | ';' => {
                quoted.push('\\');
                quoted.push(c);
            }
            _ => quoted.push(c),
        }
    }
    quoted.push('"');
    quoted
}

fn path_args(paths: &[PathBuf]) -> Vec<Arg> {
    paths.iter().map(|p| Arg::path(p)).collect()
}

/// A typed CMake command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    Comment(String),
    MinimumRequired(String),
    Set { variable: &'static str, value: String },
    Project(String),
    IncludeDirectories(Vec<PathBuf>),
    SharedLibrary { name: String, sources: Vec<PathBuf> },
    Executable { name: String, sources: Vec<PathBuf> },
    CompileDefinitions(Vec<Definition>),
    FindPackage { package: &'static str, required: bool },
    LinkDirectories { target: String, dirs: Vec<PathBuf> },
    LinkLibraries { target: String, libraries: Vec<String> },
}

impl Directive {
    fn set(variable: &'static str, value: impl Into<String>) -> Self {
        Directive::Set {
            variable,
            value: value.into(),
        }
    }

    /// Command name and arguments, or `None` for comments.
    fn command(&self) -> Option<(&'static str, Vec<Arg>)> {
        let cmd = match self {
            Directive::Comment(_) => return None,
            Directive::MinimumRequired(version) => (
                "cmake_minimum_required",
                vec![Arg::Keyword("VERSION"), Arg::value(version)],
            ),
            Directive::Set { variable, value } => {
                ("set", vec![Arg::Keyword(*variable), Arg::value(value)])
            }
            Directive::Project(name) => ("project", vec![Arg::value(name)]),
            Directive::IncludeDirectories(dirs) => ("include_directories", path_args(dirs)),
            Directive::SharedLibrary { name, sources } => {
                let mut args = vec![Arg::value(name), Arg::Keyword("SHARED")];
                args.extend(path_args(sources));
                ("add_library", args)
            }
            Directive::Executable { name, sources } => {
                let mut args = vec![Arg::value(name)];
                args.extend(path_args(sources));
                ("add_executable", args)
            }
            Directive::CompileDefinitions(defs) => (
                "add_compile_definitions",
                defs.iter().map(|d| Arg::value(d.render())).collect(),
            ),
            Directive::FindPackage { package, required } => {
                let mut args = vec![Arg::Keyword(*package)];
                if *required {
                    args.push(Arg::Keyword("REQUIRED"));
                }
                ("find_package", args)
            }
            Directive::LinkDirectories { target, dirs } => {
                let mut args = vec![Arg::value(target), Arg::Keyword("PUBLIC")];
                args.extend(path_args(dirs));
                ("target_link_directories", args)
            }
            Directive::LinkLibraries { target, libraries } => {
                let mut args = vec![Arg::value(target)];
                args.extend(libraries.iter().map(Arg::value));
                ("target_link_libraries", args)
            }
        };

        Some(cmd)
    }
}

impl fmt::Display for Directive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.command() {
            None => match self {
                Directive::Comment(text) => write!(f, "# {}", text),
                _ => Ok(()),
            },
            Some((name, args)) => {
                write!(f, "{}(", name)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_char(' ')?;
                    }
                    write!(f, "{}", arg)?;
                }
                f.write_char(')')
            }
        }
    }
}

/// An ordered CMake project description.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CMakeLists {
    directives: Vec<Directive>,
}

impl CMakeLists {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, directive: Directive) {
        self.directives.push(directive);
    }

    pub fn directives(&self) -> &[Directive] {
        &self.directives
    }

    /// Render the document to CMake source text.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for directive in &self.directives {
            // Writing into a String cannot fail.
            let _ = writeln!(out, "{}", directive);
        }
        out
    }

    /// Write `CMakeLists.txt` into `dir`.
    pub fn write_to(&self, dir: &Path) -> Result<PathBuf, BuildError> {
        let path = dir.join(CMAKE_LISTS);
        write_string(&path, &self.render())?;
        tracing::debug!("Wrote {}", path.display());
        Ok(path)
    }
}

/// Build the project description for one target.
///
/// Directive order matters: the toolchain file must be set before
/// `project()`, and every `target_*` command needs the target to exist.
pub fn emit(
    target: &BuildTarget,
    config: &BuildConfiguration,
    toolchain: Option<&ToolchainBundle>,
    output_dir: &Path,
) -> CMakeLists {
    let mut doc = CMakeLists::new();
    let out = output_dir.display().to_string();
    let artifact = config.artifact.clone();

    doc.push(Directive::Comment(format!(
        "Generated by cppmatrix for {}",
        target.name
    )));
    doc.push(Directive::MinimumRequired(config.cmake_version.clone()));
    doc.push(Directive::set(
        "CMAKE_CXX_STANDARD",
        target.cpp_version.to_string(),
    ));
    doc.push(Directive::set("CMAKE_POSITION_INDEPENDENT_CODE", "ON"));
    doc.push(Directive::set("CMAKE_ARCHIVE_OUTPUT_DIRECTORY", &out));
    doc.push(Directive::set("CMAKE_LIBRARY_OUTPUT_DIRECTORY", &out));
    doc.push(Directive::set("CMAKE_RUNTIME_OUTPUT_DIRECTORY", &out));
    doc.push(Directive::set("CMAKE_BUILD_TYPE", &config.build_type));

    if let Some(bundle) = toolchain {
        doc.push(Directive::set(
            "CROSS_TARGET_TOOLCHAIN_PATH",
            bundle.bin_dir.display().to_string(),
        ));
        doc.push(Directive::set(
            "CMAKE_TOOLCHAIN_FILE",
            bundle.cmake_file.display().to_string(),
        ));
    }

    doc.push(Directive::Project(artifact.clone()));

    if let Some(inc) = &config.inc_dir {
        doc.push(Directive::IncludeDirectories(vec![inc.clone()]));
    }

    let sources = source_files(&config.src_dir);
    if sources.is_empty() {
        tracing::warn!("No sources found in {}", config.src_dir.display());
    }
    if config.kind.is_library() {
        tracing::info!("Adding library target `{}`", artifact);
        doc.push(Directive::SharedLibrary {
            name: artifact.clone(),
            sources,
        });
    } else {
        tracing::info!("Adding executable target `{}`", artifact);
        doc.push(Directive::Executable {
            name: artifact.clone(),
            sources,
        });
    }

    if !config.definitions.is_empty() {
        doc.push(Directive::CompileDefinitions(config.definitions.clone()));
    }

    doc.push(Directive::set("THREADS_PREFER_PTHREAD_FLAG", "ON"));
    doc.push(Directive::FindPackage {
        package: "Threads",
        required: true,
    });
    doc.push(Directive::LinkLibraries {
        target: artifact.clone(),
        libraries: vec!["Threads::Threads".to_string()],
    });

    if let Some(lib_dir) = &config.lib_dir {
        doc.push(Directive::IncludeDirectories(vec![lib_dir.clone()]));
        doc.push(Directive::LinkDirectories {
            target: artifact.clone(),
            dirs: vec![lib_dir.clone()],
        });
        doc.push(Directive::LinkLibraries {
            target: artifact.clone(),
            libraries: link_libraries(lib_dir),
        });
    }

    if let Some(deps) = &config.dep_libs {
        doc.push(Directive::LinkLibraries {
            target: artifact,
            libraries: deps.clone(),
        });
        doc.push(Directive::set(
            "CMAKE_CXX_LINK_EXECUTABLE",
            WHOLE_ARCHIVE_LINK_EXECUTABLE,
        ));
        if config.kind.is_library() {
            doc.push(Directive::set(
                "CMAKE_CXX_CREATE_SHARED_LIBRARY",
                WHOLE_ARCHIVE_CREATE_SHARED_LIBRARY,
            ));
        }
    }

    doc
}

/// Acquire the target's toolchain, then emit and write its CMakeLists.txt.
///
/// Nothing is written when the toolchain cannot be acquired.
pub fn generate(
    target: &BuildTarget,
    config: &BuildConfiguration,
    store: &dyn PackageStore,
    output_dir: &Path,
) -> Result<CMakeLists, BuildError> {
    let bundle = acquire(&target.toolchain, &config.toolchain_root(), store)?;
    let doc = emit(target, config, Some(&bundle), output_dir);
    doc.write_to(output_dir)?;
    Ok(doc)
}
