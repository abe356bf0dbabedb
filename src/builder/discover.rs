//! Source, header and library discovery.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

/// Extensions treated as C/C++ sources (headers included).
pub const SOURCE_EXTENSIONS: [&str; 4] = ["c", "cpp", "h", "hpp"];

/// Extensions treated as headers.
pub const HEADER_EXTENSIONS: [&str; 2] = ["h", "hpp"];

/// Extensions treated as prebuilt libraries.
pub const LIBRARY_EXTENSIONS: [&str; 2] = ["a", "so"];

/// Length of the platform `lib` prefix stripped from library file names.
const LIB_PREFIX_LEN: usize = 3;

fn has_extension(path: &Path, allowed: &[&str]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| allowed.contains(&ext))
}

/// Recursively collect every C/C++ file under `dir`.
///
/// Entries are visited sorted by file name, so the result is stable for an
/// unchanged tree. Symlinks are followed. A missing directory yields an
/// empty list.
pub fn source_files(dir: &Path) -> Vec<PathBuf> {
    WalkDir::new(dir)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::warn!("skipping unreadable entry: {}", e);
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| has_extension(path, &SOURCE_EXTENSIONS))
        .collect()
}

/// Recursively collect every header under `dir`, in the same order as
/// [`source_files`].
pub fn header_files(dir: &Path) -> Vec<PathBuf> {
    source_files(dir)
        .into_iter()
        .filter(|path| has_extension(path, &HEADER_EXTENSIONS))
        .collect()
}

/// Collect linkable library names from the root of `dir`.
///
/// Only files with a library extension count, including symlinks to them
/// such as `libfoo.so -> libfoo.so.1`; the first three characters of the
/// stem (the `lib` prefix) are dropped. Not recursive.
pub fn link_libraries(dir: &Path) -> Vec<String> {
    let mut libs: Vec<(PathBuf, String)> = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| has_extension(entry.path(), &LIBRARY_EXTENSIONS))
        .filter_map(|entry| {
            let stem = entry.path().file_stem()?.to_string_lossy().into_owned();
            let name: String = stem.chars().skip(LIB_PREFIX_LEN).collect();
            Some((entry.into_path(), name))
        })
        .collect();

    libs.retain(|(path, name)| {
        if name.is_empty() {
            tracing::warn!("ignoring library with no name: {}", path.display());
        }
        !name.is_empty()
    });

    libs.into_iter().map(|(_, name)| name).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "").unwrap();
    }

    #[test]
    fn test_source_files_filters_and_recurses() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        touch(&root.join("main.cpp"));
        touch(&root.join("util.c"));
        touch(&root.join("a/b/deep.hpp"));
        touch(&root.join("a/x.h"));
        touch(&root.join("README.md"));
        touch(&root.join("CMakeLists.txt"));
        touch(&root.join("a/notes.cc"));

        let files: Vec<_> = source_files(root)
            .into_iter()
            .map(|p| p.strip_prefix(root).unwrap().to_path_buf())
            .collect();

        assert_eq!(
            files,
            vec![
                PathBuf::from("a/b/deep.hpp"),
                PathBuf::from("a/x.h"),
                PathBuf::from("main.cpp"),
                PathBuf::from("util.c"),
            ]
        );
    }

    #[test]
    fn test_source_files_is_stable() {
        let tmp = TempDir::new().unwrap();
        for name in ["z.c", "m.cpp", "a.h", "sub/b.hpp"] {
            touch(&tmp.path().join(name));
        }

        assert_eq!(source_files(tmp.path()), source_files(tmp.path()));
    }

    #[test]
    fn test_source_files_missing_dir() {
        let tmp = TempDir::new().unwrap();
        assert!(source_files(&tmp.path().join("nope")).is_empty());
    }

    #[test]
    fn test_header_files_skips_sources() {
        let tmp = TempDir::new().unwrap();
        touch(&tmp.path().join("api.h"));
        touch(&tmp.path().join("inline.cpp"));
        touch(&tmp.path().join("sub/types.hpp"));

        let headers: Vec<_> = header_files(tmp.path())
            .into_iter()
            .map(|p| p.strip_prefix(tmp.path()).unwrap().to_path_buf())
            .collect();
        assert_eq!(headers, vec![PathBuf::from("api.h"), PathBuf::from("sub/types.hpp")]);
    }

    #[test]
    fn test_link_libraries_strips_prefix_non_recursive() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        touch(&root.join("libfoo.a"));
        touch(&root.join("libbar.so"));
        touch(&root.join("libbaz.dylib"));
        touch(&root.join("nested/libdeep.a"));
        fs::create_dir_all(root.join("libdir.a")).unwrap();

        assert_eq!(link_libraries(root), vec!["bar", "foo"]);
    }

    #[test]
    fn test_link_libraries_strips_exactly_three_chars() {
        let tmp = TempDir::new().unwrap();
        touch(&tmp.path().join("xyzengine.a"));

        assert_eq!(link_libraries(tmp.path()), vec!["engine"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_link_libraries_follows_versioned_symlink() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        touch(&root.join("libfoo.so.1"));
        touch(&root.join("libbar.a"));
        std::os::unix::fs::symlink(root.join("libfoo.so.1"), root.join("libfoo.so")).unwrap();

        assert_eq!(link_libraries(root), vec!["bar", "foo"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_source_files_follows_symlinks() {
        let tmp = TempDir::new().unwrap();
        let shared = tmp.path().join("shared");
        let src = tmp.path().join("src");
        touch(&shared.join("common.cpp"));
        touch(&shared.join("extra/more.c"));
        touch(&src.join("main.cpp"));
        std::os::unix::fs::symlink(shared.join("common.cpp"), src.join("linked.cpp")).unwrap();
        std::os::unix::fs::symlink(shared.join("extra"), src.join("extra")).unwrap();

        let files: Vec<_> = source_files(&src)
            .into_iter()
            .map(|p| p.strip_prefix(&src).unwrap().to_path_buf())
            .collect();
        assert_eq!(
            files,
            vec![
                PathBuf::from("extra/more.c"),
                PathBuf::from("linked.cpp"),
                PathBuf::from("main.cpp"),
            ]
        );
    }
}
