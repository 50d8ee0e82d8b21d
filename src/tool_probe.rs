//! Tool prober (C4): detects whether an external executable is available,
//! memoized per `(command, cwd)` for the lifetime of the process.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use dashmap::DashMap;
use regex::Regex;

use crate::env::TOOL_PROBE_TIMEOUT;
use crate::model::ToolInfo;
use crate::process::ProcessRunner;

static VERSION_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"v?\d+\.\d+\.\d+").unwrap());

static PROBE_CACHE: LazyLock<DashMap<(String, PathBuf), ToolInfo>> = LazyLock::new(DashMap::new);

/// Probes `command --version` (or a caller-supplied argument vector) in
/// `cwd`, returning `(available, version, path)`. A non-zero exit, a spawn
/// error, or a timeout all yield `available = false` without raising.
/// Results are memoized under `(command, cwd)`; memoization never
/// invalidates within a run.
pub fn probe(command: &str, cwd: &Path, version_args: &[&str]) -> ToolInfo {
    let key = (command.to_string(), cwd.to_path_buf());
    if let Some(cached) = PROBE_CACHE.get(&key) {
        return cached.clone();
    }
    let info = probe_uncached(command, cwd, version_args);
    PROBE_CACHE.insert(key, info.clone());
    info
}

fn probe_uncached(command: &str, cwd: &Path, version_args: &[&str]) -> ToolInfo {
    let path = which::which_in(command, std::env::var_os("PATH"), cwd)
        .ok()
        .map(|p| p.to_string_lossy().into_owned());

    let args = if version_args.is_empty() {
        vec!["--version"]
    } else {
        version_args.to_vec()
    };

    let output = match ProcessRunner::new(command)
        .args(args)
        .current_dir(cwd)
        .timeout(TOOL_PROBE_TIMEOUT)
        .run()
    {
        Ok(output) if output.success() => output,
        _ => {
            return ToolInfo {
                available: false,
                version: None,
                path,
            };
        }
    };

    let version = parse_version(&output.stdout).or_else(|| parse_version(&output.stderr));

    ToolInfo {
        available: true,
        version,
        path,
    }
}

fn parse_version(text: &str) -> Option<String> {
    VERSION_PATTERN.find(text).map(|m| m.as_str().to_string())
}
