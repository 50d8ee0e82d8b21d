//! Path resolver (C3): expand explicit path arguments to a deduplicated,
//! first-seen-order file list.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use ignore::WalkBuilder;

/// A conventional dependency directory skipped during recursive expansion,
/// alongside dot-directories.
const SKIPPED_DIR_NAMES: &[&str] = &["node_modules", "target", "vendor"];

/// Accepts absolute or cwd-relative paths; each directory is walked
/// recursively (skipping dot-directories and conventional dependency
/// directories), each file is included verbatim. Output is deduplicated
/// while preserving first-seen order.
pub fn resolve_paths(cwd: &Path, inputs: &[PathBuf]) -> Vec<PathBuf> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for input in inputs {
        let absolute = if input.is_absolute() {
            input.clone()
        } else {
            cwd.join(input)
        };
        if absolute.is_dir() {
            for file in walk_dir(&absolute) {
                push_unique(&mut seen, &mut out, file);
            }
        } else {
            push_unique(&mut seen, &mut out, absolute);
        }
    }
    out
}

fn push_unique(seen: &mut HashSet<PathBuf>, out: &mut Vec<PathBuf>, path: PathBuf) {
    if seen.insert(path.clone()) {
        out.push(path);
    }
}

fn walk_dir(dir: &Path) -> Vec<PathBuf> {
    WalkBuilder::new(dir)
        .hidden(false)
        .filter_entry(|entry| {
            let is_skipped_dir = entry.file_type().is_some_and(|ft| ft.is_dir())
                && entry
                    .file_name()
                    .to_str()
                    .is_some_and(|name| name.starts_with('.') || SKIPPED_DIR_NAMES.contains(&name));
            !is_skipped_dir
        })
        .build()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_some_and(|ft| ft.is_file()))
        .map(|entry| entry.into_path())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn expands_directory_recursively() {
        let tmp = tempfile::tempdir().unwrap();
        fs::create_dir_all(tmp.path().join("src/nested")).unwrap();
        fs::write(tmp.path().join("src/a.rs"), "").unwrap();
        fs::write(tmp.path().join("src/nested/b.rs"), "").unwrap();
        let result = resolve_paths(tmp.path(), &[PathBuf::from("src")]);
        assert_eq!(result.len(), 2);
    }

    #[test]
    fn skips_dot_directories_and_dependency_directories() {
        let tmp = tempfile::tempdir().unwrap();
        fs::create_dir_all(tmp.path().join(".git")).unwrap();
        fs::write(tmp.path().join(".git/HEAD"), "").unwrap();
        fs::create_dir_all(tmp.path().join("node_modules")).unwrap();
        fs::write(tmp.path().join("node_modules/pkg.js"), "").unwrap();
        fs::write(tmp.path().join("keep.rs"), "").unwrap();
        let result = resolve_paths(tmp.path(), &[PathBuf::from(".")]);
        assert_eq!(result, vec![tmp.path().join("keep.rs")]);
    }

    #[test]
    fn deduplicates_while_preserving_first_seen_order() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("a.rs"), "").unwrap();
        let result = resolve_paths(
            tmp.path(),
            &[PathBuf::from("a.rs"), PathBuf::from("a.rs")],
        );
        assert_eq!(result, vec![tmp.path().join("a.rs")]);
    }

    #[test]
    fn plain_file_included_verbatim() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("only.rs"), "").unwrap();
        let result = resolve_paths(tmp.path(), &[PathBuf::from("only.rs")]);
        assert_eq!(result, vec![tmp.path().join("only.rs")]);
    }
}
