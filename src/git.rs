//! Git scope resolver (C2): staged files and changed-vs-upstream files.
//!
//! Dual implementation, mirroring the teacher's approach: prefer libgit2
//! when a repository can be opened, fall back to shelling out to `git`.
//! Any failure — missing binary, non-zero exit, not a git repo — degrades
//! to an empty list rather than a fatal error, so the engine stays usable
//! outside version-controlled trees.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::process::Command;

use git2::{Repository, StatusOptions, StatusShow};

pub struct GitScope {
    repo: Option<Repository>,
    root: PathBuf,
}

impl GitScope {
    /// Opens the repository at `root` if possible. A missing/corrupt `.git`
    /// directory is not an error here — operations just fall back to the
    /// shell-`git` path and ultimately to empty lists.
    pub fn open(root: &Path) -> Self {
        let repo = Repository::open(root).ok();
        Self {
            repo,
            root: root.to_path_buf(),
        }
    }

    /// Modified/added/renamed files in the index against HEAD.
    pub fn staged_files(&self) -> Vec<String> {
        if let Some(repo) = &self.repo {
            if let Ok(files) = self.staged_via_libgit2(repo) {
                return files;
            }
        }
        self.staged_via_shell().unwrap_or_default()
    }

    /// Working tree vs the merge base of `HEAD` and the tracked upstream
    /// (falling back to `HEAD~1` if there is no upstream configured) — the
    /// symmetric-difference semantics of a triple-dot diff, so files that
    /// changed upstream after the local branch diverged (but were never
    /// touched locally) don't show up as "changed".
    pub fn changed_files(&self) -> Vec<String> {
        let upstream = self.upstream_ref();
        let base = self.merge_base(&upstream, "HEAD").unwrap_or(upstream);
        self.diff_against(&base).unwrap_or_default()
    }

    fn staged_via_libgit2(&self, repo: &Repository) -> Result<Vec<String>, git2::Error> {
        let mut opts = StatusOptions::new();
        opts.show(StatusShow::Index);
        opts.include_untracked(false);
        let statuses = repo.statuses(Some(&mut opts))?;
        let mut files = BTreeSet::new();
        for entry in statuses.iter() {
            let status = entry.status();
            let is_staged = status.is_index_new()
                || status.is_index_modified()
                || status.is_index_renamed()
                || status.is_index_typechange();
            if is_staged {
                if let Some(path) = entry.path() {
                    files.insert(path.to_string());
                }
            }
        }
        Ok(files.into_iter().collect())
    }

    fn staged_via_shell(&self) -> Option<Vec<String>> {
        let output = self.run_git(["diff", "--name-only", "--cached", "-z"])?;
        Some(split_nul(&output))
    }

    fn upstream_ref(&self) -> String {
        if let Some(output) = self.run_git(["rev-parse", "--abbrev-ref", "--symbolic-full-name", "@{u}"]) {
            let branch = output.trim();
            if !branch.is_empty() {
                return branch.to_string();
            }
        }
        "HEAD~1".to_string()
    }

    fn diff_against(&self, base: &str) -> Option<Vec<String>> {
        let output = self.run_git(["diff", "--name-only", base, "-z"])?;
        Some(split_nul(&output))
    }

    /// The merge base of `a` and `b`, preferring libgit2 and falling back
    /// to `git merge-base`. `None` when neither can resolve one (e.g. `a`
    /// is `HEAD~1` in a repository with no prior commit).
    fn merge_base(&self, a: &str, b: &str) -> Option<String> {
        if let Some(repo) = &self.repo {
            if let (Ok(a_obj), Ok(b_obj)) = (repo.revparse_single(a), repo.revparse_single(b)) {
                if let Ok(base) = repo.merge_base(a_obj.id(), b_obj.id()) {
                    return Some(base.to_string());
                }
            }
        }
        let output = self.run_git(["merge-base", a, b])?;
        let trimmed = output.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }

    /// Runs `git <args>` in the workspace root; a spawn error or non-zero
    /// exit yields `None` (treated by callers as "empty list").
    fn run_git<const N: usize>(&self, args: [&str; N]) -> Option<String> {
        let output = Command::new("git")
            .args(args)
            .current_dir(&self.root)
            .output()
            .ok()?;
        if !output.status.success() {
            return None;
        }
        String::from_utf8(output.stdout).ok()
    }

    /// All files tracked by git, used as the "full" scope fallback when the
    /// caller wants a VCS-aware file list rather than a raw directory walk.
    pub fn all_tracked_files(&self) -> Vec<String> {
        if let Some(repo) = &self.repo {
            if let Ok(idx) = repo.index() {
                return idx
                    .iter()
                    .filter_map(|entry| std::str::from_utf8(&entry.path).ok().map(str::to_string))
                    .collect();
            }
        }
        self.run_git(["ls-files", "-z"])
            .map(|out| split_nul(&out))
            .unwrap_or_default()
    }
}

fn split_nul(output: &str) -> Vec<String> {
    output
        .split('\0')
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
