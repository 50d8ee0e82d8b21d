//! Data model shared by every component: findings, check results, the
//! context handed to checks, and the configuration/run-options shapes.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Ordered `error < warn < info`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warn,
    Info,
}

/// Terminal disposition of a single check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Pass,
    Warn,
    Fail,
    Skipped,
}

/// The atomic diagnostic record emitted by a check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<u32>,
    pub severity: Severity,
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fixable: Option<bool>,
}

impl Finding {
    pub fn new(code: impl Into<String>, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            file: None,
            line: None,
            column: None,
            severity,
            code: code.into(),
            message: message.into(),
            suggestion: None,
            fixable: None,
        }
    }

    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }

    pub fn with_location(mut self, line: u32, column: u32) -> Self {
        self.line = Some(line);
        self.column = Some(column);
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Natural de-duplication identity for a single check's output.
    pub fn identity(&self) -> (Option<&str>, Option<u32>, Option<u32>, &str) {
        (self.file.as_deref(), self.line, self.column, &self.code)
    }
}

/// Derives a [`Status`] from an ordered finding list per the engine contract:
/// any error finding fails the check, else any warn warns it, else pass.
pub fn status_from_findings(findings: &[Finding]) -> Status {
    if findings.iter().any(|f| f.severity == Severity::Error) {
        Status::Fail
    } else if findings.iter().any(|f| f.severity == Severity::Warn) {
        Status::Warn
    } else {
        Status::Pass
    }
}

/// The result of a single check's execution, stamped by the scheduler.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckResult {
    pub name: String,
    pub status: Status,
    pub findings: Vec<Finding>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stdout: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stderr: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub artifacts: BTreeMap<String, serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage: Option<String>,
}

impl CheckResult {
    pub fn new(name: impl Into<String>, findings: Vec<Finding>) -> Self {
        let status = status_from_findings(&findings);
        Self {
            name: name.into(),
            status,
            findings,
            stdout: None,
            stderr: None,
            duration_ms: None,
            artifacts: BTreeMap::new(),
            stage: None,
        }
    }

    pub fn skipped(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: Status::Skipped,
            findings: Vec::new(),
            stdout: None,
            stderr: None,
            duration_ms: None,
            artifacts: BTreeMap::new(),
            stage: None,
        }
    }

    pub fn failed_with_error(name: impl Into<String>, error: impl std::fmt::Display) -> Self {
        let finding = Finding::new("engine/check-error", Severity::Error, error.to_string());
        let mut result = Self::new(name, vec![finding.clone()]);
        result.stderr = Some(finding.message);
        result
    }

    pub fn with_stdout(mut self, stdout: impl Into<String>) -> Self {
        self.stdout = Some(stdout.into());
        self
    }

    pub fn with_stderr(mut self, stderr: impl Into<String>) -> Self {
        self.stderr = Some(stderr.into());
        self
    }
}

/// File-selection mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display, strum::EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Scope {
    Staged,
    Changed,
    Full,
}

/// Controls whether checks are allowed to perform autofix writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum E2eMode {
    Auto,
    Always,
    #[default]
    Off,
}

/// Read-only record handed to every check for the duration of a run.
#[derive(Debug, Clone)]
pub struct CheckContext {
    pub cwd: PathBuf,
    pub ci: bool,
    pub scope: Scope,
    pub staged_files: Vec<String>,
    pub changed_files: Vec<String>,
    /// The full repository tree, resolved once by the driver when `scope`
    /// is `Scope::Full` (git-tracked files, falling back to a directory
    /// walk outside a repository). Empty for the other scopes.
    pub all_files: Vec<String>,
    pub target_files: Option<Vec<String>>,
    pub environment: BTreeMap<String, String>,
    pub config: PipelineConfig,
}

impl CheckContext {
    /// The file list a check should restrict itself to: explicit target
    /// files when given, otherwise the list matching `scope`.
    pub fn files(&self) -> &[String] {
        if let Some(targets) = &self.target_files {
            return targets;
        }
        match self.scope {
            Scope::Staged => &self.staged_files,
            Scope::Changed => &self.changed_files,
            Scope::Full => &self.all_files,
        }
    }
}

/// A single check's declared identity within a stage, used by the registry
/// to construct the boxed [`crate::check::Check`] trait object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckSpec {
    pub id: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

/// An ordered list of checks sharing a concurrency and failure policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageSpec {
    pub name: String,
    pub parallel: bool,
    pub checks: Vec<CheckSpec>,
    #[serde(default)]
    pub fail_on_warn: bool,
}

/// An ordered list of stages plus global defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub stages: Vec<StageSpec>,
    #[serde(default)]
    pub e2e: E2eMode,
    #[serde(default = "default_reporters")]
    pub reporters: Vec<ReportFormat>,
}

fn default_reporters() -> Vec<ReportFormat> {
    vec![ReportFormat::Summary]
}

/// Output format selected by `--report`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display, strum::EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ReportFormat {
    Summary,
    Json,
    Junit,
}

/// Parameters controlling a single invocation, owned exclusively by the
/// driver.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub scope: Scope,
    pub ci: bool,
    pub max_workers: usize,
    pub report: ReportFormat,
    pub quiet: bool,
    pub verbose: bool,
    pub paths: Option<Vec<PathBuf>>,
    pub cwd: Option<PathBuf>,
    pub e2e: E2eMode,
    /// Overrides every stage's `failOnWarn` policy to `true` for this run.
    pub fail_on_warn: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            scope: Scope::Full,
            ci: false,
            max_workers: default_max_workers(),
            report: ReportFormat::Summary,
            quiet: false,
            verbose: false,
            paths: None,
            cwd: None,
            e2e: E2eMode::Off,
            fail_on_warn: false,
        }
    }
}

/// `clamp(cpu_count-1, 2, 4)`, the scheduler's sensible parallel default.
pub fn default_max_workers() -> usize {
    let cpus = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4);
    cpus.saturating_sub(1).clamp(2, 4)
}

/// `(available, version, path)` — the tool prober's result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolInfo {
    pub available: bool,
    pub version: Option<String>,
    pub path: Option<String>,
}

impl ToolInfo {
    pub fn unavailable() -> Self {
        Self {
            available: false,
            version: None,
            path: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_from_findings_prefers_error_over_warn() {
        let findings = vec![
            Finding::new("a/1", Severity::Warn, "warn"),
            Finding::new("a/2", Severity::Error, "err"),
        ];
        assert_eq!(status_from_findings(&findings), Status::Fail);
    }

    #[test]
    fn status_from_findings_warn_without_error() {
        let findings = vec![Finding::new("a/1", Severity::Warn, "warn")];
        assert_eq!(status_from_findings(&findings), Status::Warn);
    }

    #[test]
    fn status_from_findings_empty_is_pass() {
        assert_eq!(status_from_findings(&[]), Status::Pass);
    }

    #[test]
    fn severity_orders_error_first() {
        let mut levels = vec![Severity::Info, Severity::Error, Severity::Warn];
        levels.sort();
        assert_eq!(levels, vec![Severity::Error, Severity::Warn, Severity::Info]);
    }
}
