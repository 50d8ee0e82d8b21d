//! Workspace root discovery: walk upward from a starting directory for a
//! workspace marker, falling back to a generic package manifest.

use std::path::{Path, PathBuf};

/// Files that mark a multi-package workspace root, checked before the
/// generic package-manifest fallback.
const WORKSPACE_MARKERS: &[&str] = &["pnpm-workspace.yaml", "lerna.json"];

/// Files that mark an ordinary package root.
const PACKAGE_MARKERS: &[&str] = &["Cargo.toml", "package.json", ".git"];

/// Walks upward from `start`, returning the first ancestor (inclusive)
/// containing a workspace marker, else the first containing a package
/// marker, else `start` unchanged. Pure, side-effect free, safe to call
/// concurrently.
pub fn find_workspace_root(start: &Path) -> PathBuf {
    if let Some(dir) = find_upward(start, WORKSPACE_MARKERS) {
        return dir;
    }
    if let Some(dir) = find_upward(start, PACKAGE_MARKERS) {
        return dir;
    }
    start.to_path_buf()
}

fn find_upward(start: &Path, markers: &[&str]) -> Option<PathBuf> {
    let mut dir = Some(start.to_path_buf());
    while let Some(candidate) = dir {
        if markers.iter().any(|marker| candidate.join(marker).exists()) {
            return Some(candidate);
        }
        dir = candidate.parent().map(Path::to_path_buf);
    }
    None
}

/// Resolves the cache directory for a workspace root, per
/// `<repo>/.cache/<tool-name>.json`. Does not create the directory; callers
/// create it lazily on first write.
pub fn cache_dir(workspace_root: &Path) -> PathBuf {
    workspace_root.join(crate::env::CACHE_DIR_NAME)
}
