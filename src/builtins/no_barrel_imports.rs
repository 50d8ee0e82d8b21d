//! Flags barrel re-export files (`index.ts` files that only re-export
//! other modules), a common architectural smell in large codebases.

use std::sync::LazyLock;

use regex::Regex;

use crate::check::Check;
use crate::model::{CheckContext, CheckResult, Finding, Severity};

static RE_EXPORT_STAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^\s*export\s+\*\s+from\s+['"]"#).unwrap());

pub struct NoBarrelImports;

impl Check for NoBarrelImports {
    fn name(&self) -> &str {
        "no-barrel-imports"
    }

    fn run<'a>(
        &'a self,
        ctx: &'a CheckContext,
    ) -> std::pin::Pin<Box<dyn std::future::Future<Output = CheckResult> + Send + 'a>> {
        Box::pin(async move {
            let candidates: Vec<&String> = ctx
                .files()
                .iter()
                .filter(|file| file.ends_with("index.ts") || file.ends_with("index.tsx"))
                .collect();

            if candidates.is_empty() {
                return CheckResult::skipped(self.name());
            }

            let mut findings = Vec::new();
            for file in candidates {
                let path = ctx.cwd.join(file);
                let Ok(contents) = std::fs::read_to_string(&path) else {
                    continue;
                };
                if is_pure_barrel(&contents) {
                    findings.push(
                        Finding::new(
                            "composition/no-barrels",
                            Severity::Warn,
                            "barrel file re-exports an entire module",
                        )
                        .with_file(file.clone())
                        .with_suggestion("import directly from the source module instead"),
                    );
                }
            }
            CheckResult::new(self.name(), findings)
        })
    }
}

fn is_pure_barrel(contents: &str) -> bool {
    let mut has_re_export = false;
    for line in contents.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with("//") {
            continue;
        }
        if RE_EXPORT_STAR.is_match(trimmed) {
            has_re_export = true;
            continue;
        }
        return false;
    }
    has_re_export
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pure_re_export_file_is_a_barrel() {
        let contents = "export * from './a';\nexport * from './b';\n";
        assert!(is_pure_barrel(contents));
    }

    #[test]
    fn file_with_other_code_is_not_a_barrel() {
        let contents = "export * from './a';\nexport const x = 1;\n";
        assert!(!is_pure_barrel(contents));
    }

    #[test]
    fn empty_file_is_not_a_barrel() {
        assert!(!is_pure_barrel(""));
    }

    #[tokio::test]
    async fn check_skips_when_no_index_files_in_scope() {
        use crate::model::{E2eMode, PipelineConfig, Scope};
        let ctx = CheckContext {
            cwd: std::env::current_dir().unwrap(),
            ci: false,
            scope: Scope::Staged,
            staged_files: vec!["src/a.ts".into()],
            changed_files: vec![],
            all_files: vec![],
            target_files: None,
            environment: Default::default(),
            config: PipelineConfig { stages: vec![], e2e: E2eMode::Off, reporters: vec![] },
        };
        let result = NoBarrelImports.run(&ctx).await;
        assert_eq!(result.status, crate::model::Status::Skipped);
    }
}
