//! Flags imports of a configured forbidden module prefix. Demonstrates the
//! tool-prober and file-hash-cache collaborators together: it prefers
//! `ripgrep` when available (falling back to a pure-Rust scan, never
//! failing when the tool is absent) and skips files whose content hash is
//! unchanged since the last run.

use std::collections::BTreeMap;

use crate::cache::{self, FileHashCache};
use crate::check::Check;
use crate::model::{CheckContext, CheckResult, Finding, Severity};
use crate::process::ProcessRunner;
use crate::tool_probe;
use crate::workspace;

const DEFAULT_FORBIDDEN_PREFIX: &str = "internal/";

pub struct ForbiddenImport {
    forbidden_prefix: String,
}

impl Default for ForbiddenImport {
    fn default() -> Self {
        Self { forbidden_prefix: DEFAULT_FORBIDDEN_PREFIX.to_string() }
    }
}

impl Check for ForbiddenImport {
    fn name(&self) -> &str {
        "forbidden-import"
    }

    fn run<'a>(
        &'a self,
        ctx: &'a CheckContext,
    ) -> std::pin::Pin<Box<dyn std::future::Future<Output = CheckResult> + Send + 'a>> {
        Box::pin(async move {
            let files = ctx.files();
            if files.is_empty() {
                return CheckResult::skipped(self.name());
            }

            let tool = tool_probe::probe("rg", &ctx.cwd, &["--version"]);

            let root = workspace::find_workspace_root(&ctx.cwd);
            let cache_dir = workspace::cache_dir(&root);
            let mut cache = FileHashCache::load(&cache_dir, self.name());

            let mut findings = Vec::new();
            let mut new_hashes = BTreeMap::new();
            let mut any_scanned = false;

            for file in files {
                let path = ctx.cwd.join(file);
                let Ok(hash) = cache::hash_file(&path) else { continue };
                new_hashes.insert(file.clone(), hash.clone());

                if !cache.is_stale(self.name(), file, &hash) {
                    continue;
                }
                any_scanned = true;

                let matches = if tool.available {
                    self.scan_with_ripgrep(&path).await
                } else {
                    self.scan_in_process(&path)
                };

                for line in matches {
                    findings.push(
                        Finding::new(
                            "composition/forbidden-import",
                            Severity::Error,
                            format!("import of forbidden module prefix '{}'", self.forbidden_prefix),
                        )
                        .with_file(file.clone())
                        .with_location(line, 1),
                    );
                }
            }

            cache.update_partition(self.name(), new_hashes);
            cache.save();

            let mut result = CheckResult::new(self.name(), findings);
            if !any_scanned && result.findings.is_empty() {
                result.status = crate::model::Status::Pass;
            }
            result
        })
    }
}

impl ForbiddenImport {
    async fn scan_with_ripgrep(&self, path: &std::path::Path) -> Vec<u32> {
        let pattern = format!("from ['\"].*{}", regex::escape(&self.forbidden_prefix));
        let output = ProcessRunner::new("rg")
            .args(["--line-number", "--no-heading", &pattern])
            .args([path.to_string_lossy().as_ref()])
            .run();
        match output {
            Ok(output) if output.success() => parse_rg_line_numbers(&output.stdout),
            _ => Vec::new(),
        }
    }

    fn scan_in_process(&self, path: &std::path::Path) -> Vec<u32> {
        let Ok(contents) = std::fs::read_to_string(path) else {
            return Vec::new();
        };
        contents
            .lines()
            .enumerate()
            .filter(|(_, line)| line.contains("from") && line.contains(&self.forbidden_prefix))
            .map(|(index, _)| index as u32 + 1)
            .collect()
    }
}

fn parse_rg_line_numbers(stdout: &str) -> Vec<u32> {
    stdout
        .lines()
        .filter_map(|line| line.split_once(':'))
        .filter_map(|(number, _)| number.parse().ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_process_scan_finds_forbidden_import_line() {
        let tmp = tempfile::tempdir().unwrap();
        let file = tmp.path().join("a.ts");
        std::fs::write(&file, "import x from './ok';\nimport y from '../internal/secret';\n").unwrap();
        let check = ForbiddenImport::default();
        let lines = check.scan_in_process(&file);
        assert_eq!(lines, vec![2]);
    }

    #[test]
    fn in_process_scan_is_empty_when_no_forbidden_import() {
        let tmp = tempfile::tempdir().unwrap();
        let file = tmp.path().join("a.ts");
        std::fs::write(&file, "import x from './ok';\n").unwrap();
        let check = ForbiddenImport::default();
        assert!(check.scan_in_process(&file).is_empty());
    }

    #[tokio::test]
    async fn check_skips_when_no_files_in_scope() {
        use crate::model::{E2eMode, PipelineConfig, Scope};
        let ctx = CheckContext {
            cwd: std::env::current_dir().unwrap(),
            ci: false,
            scope: Scope::Staged,
            staged_files: vec![],
            changed_files: vec![],
            all_files: vec![],
            target_files: None,
            environment: Default::default(),
            config: PipelineConfig { stages: vec![], e2e: E2eMode::Off, reporters: vec![] },
        };
        let result = ForbiddenImport::default().run(&ctx).await;
        assert_eq!(result.status, crate::model::Status::Skipped);
    }
}
