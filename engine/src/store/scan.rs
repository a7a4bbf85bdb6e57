//! Code file enumeration

use crate::config::ScanConfig;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// A code file found by a scan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    /// Path relative to the repository root, `/`-separated
    pub relative_path: String,
    pub absolute_path: PathBuf,
}

/// `.rs` for `src/main.rs`, empty for files without an extension
pub fn extension_of(path: &Path) -> String {
    path.extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default()
}

fn relative_key(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let parts: Vec<_> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    Some(parts.join("/"))
}

/// Enumerate code files under `root`, sorted by relative path.
///
/// Directories named in `rules.excluded_dirs` are pruned before descending.
/// Symlinks are never followed into; a symlink to a regular file counts as a file.
/// Unreadable directories are skipped with a warning.
pub fn scan(root: &Path, rules: &ScanConfig) -> Vec<FileRecord> {
    let mut records = Vec::new();

    let walker = WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|entry| {
            entry.depth() == 0
                || !(entry.file_type().is_dir()
                    && rules
                        .excluded_dirs
                        .contains(entry.file_name().to_string_lossy().as_ref()))
        });

    for result in walker {
        let entry = match result {
            Ok(entry) => entry,
            Err(e) => {
                let location = e
                    .path()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| root.display().to_string());
                tracing::warn!("Skipping inaccessible path {}: {}", location, e);
                continue;
            }
        };

        let file_type = entry.file_type();
        let is_file = file_type.is_file() || (file_type.is_symlink() && entry.path().is_file());
        if !is_file {
            continue;
        }

        let path = entry.path();
        if !rules.extensions.contains(&extension_of(path)) {
            continue;
        }

        if let Some(relative_path) = relative_key(root, path) {
            records.push(FileRecord {
                relative_path,
                absolute_path: path.to_path_buf(),
            });
        }
    }

    records.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));
    tracing::debug!("Scanned {} code files under {}", records.len(), root.display());
    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "x").unwrap();
    }

    fn names(records: &[FileRecord]) -> Vec<&str> {
        records.iter().map(|r| r.relative_path.as_str()).collect()
    }

    #[test]
    fn test_excluded_dirs_are_pruned() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "src/a.py");
        touch(dir.path(), "node_modules/b.py");
        touch(dir.path(), ".git/c.py");

        let records = scan(dir.path(), &ScanConfig::default());
        assert_eq!(names(&records), vec!["src/a.py"]);
        assert_eq!(records[0].absolute_path, dir.path().join("src/a.py"));
    }

    #[test]
    fn test_extension_allow_list() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "README.md");
        touch(dir.path(), "image.png");
        touch(dir.path(), "Makefile");
        touch(dir.path(), "lib/util.rs");

        let records = scan(dir.path(), &ScanConfig::default());
        assert_eq!(names(&records), vec!["README.md", "lib/util.rs"]);
    }

    #[test]
    fn test_excluded_name_only_prunes_directories() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "build/out.js");
        touch(dir.path(), "tools/build.sh");

        let records = scan(dir.path(), &ScanConfig::default());
        assert_eq!(names(&records), vec!["tools/build.sh"]);
    }

    #[test]
    fn test_results_sorted_by_relative_path() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "b.rs");
        touch(dir.path(), "a/z.rs");
        touch(dir.path(), "a.rs");

        let records = scan(dir.path(), &ScanConfig::default());
        assert_eq!(names(&records), vec!["a.rs", "a/z.rs", "b.rs"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_directory_is_not_descended() {
        use std::os::unix::fs::symlink;

        let outside = TempDir::new().unwrap();
        touch(outside.path(), "lib.py");
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "src/a.py");
        symlink(outside.path(), dir.path().join("linked")).unwrap();
        symlink(outside.path().join("lib.py"), dir.path().join("alias.py")).unwrap();

        let records = scan(dir.path(), &ScanConfig::default());
        assert_eq!(names(&records), vec!["alias.py", "src/a.py"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_unreadable_directory_does_not_stop_scan() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        touch(dir.path(), "a.py");
        touch(dir.path(), "locked/inner.py");
        touch(dir.path(), "z/b.py");
        let locked = dir.path().join("locked");
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();
        // Permission bits don't bind a privileged user
        let denied = fs::read_dir(&locked).is_err();

        let records = scan(dir.path(), &ScanConfig::default());
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

        let found = names(&records);
        assert!(found.contains(&"a.py"));
        assert!(found.contains(&"z/b.py"));
        if denied {
            assert_eq!(found, vec!["a.py", "z/b.py"]);
        }
    }

    #[test]
    fn test_extension_of() {
        assert_eq!(extension_of(Path::new("src/main.rs")), ".rs");
        assert_eq!(extension_of(Path::new("Makefile")), "");
        assert_eq!(extension_of(Path::new(".bashrc")), "");
    }
}
