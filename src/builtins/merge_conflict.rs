//! Flags unresolved merge conflict markers left in tracked files.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::check::Check;
use crate::model::{CheckContext, CheckResult, Finding, Severity};

pub struct MergeConflictMarkers;

impl Check for MergeConflictMarkers {
    fn name(&self) -> &str {
        "merge-conflict-markers"
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

            let mut findings = Vec::new();
            for file in files {
                let path = ctx.cwd.join(file);
                if let Some(line) = first_conflict_marker_line(&path) {
                    findings.push(
                        Finding::new(
                            "composition/merge-conflict-marker",
                            Severity::Error,
                            "unresolved merge conflict marker",
                        )
                        .with_file(file.clone())
                        .with_location(line, 1),
                    );
                }
            }
            CheckResult::new(self.name(), findings)
        })
    }
}

/// Returns the 1-based line number of the first conflict marker found, if
/// any. Lines with invalid UTF-8 (likely binary files) are skipped rather
/// than treated as an error.
fn first_conflict_marker_line(path: &Path) -> Option<u32> {
    let file = File::open(path).ok()?;
    let reader = BufReader::new(file);
    for (index, line) in reader.lines().enumerate() {
        let Ok(line) = line else { continue };
        let trimmed = line.trim();
        if trimmed.starts_with("<<<<<<<")
            || trimmed.starts_with("=======")
            || trimmed.starts_with(">>>>>>>")
        {
            return Some(index as u32 + 1);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn detects_conflict_markers() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "normal line").unwrap();
        writeln!(file, "<<<<<<< HEAD").unwrap();
        writeln!(file, "=======").unwrap();
        writeln!(file, ">>>>>>> branch").unwrap();
        file.flush().unwrap();
        assert_eq!(first_conflict_marker_line(file.path()), Some(2));
    }

    #[test]
    fn clean_file_has_no_marker() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "normal line").unwrap();
        file.flush().unwrap();
        assert_eq!(first_conflict_marker_line(file.path()), None);
    }

    #[test]
    fn marker_in_middle_of_line_is_not_a_match() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "this is not <<<<<<< a conflict").unwrap();
        file.flush().unwrap();
        assert_eq!(first_conflict_marker_line(file.path()), None);
    }

    #[test]
    fn binary_file_does_not_panic_or_error() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(&[0xFF, 0xFE, 0xFD, 0xFC]).unwrap();
        file.flush().unwrap();
        assert_eq!(first_conflict_marker_line(file.path()), None);
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
        let result = MergeConflictMarkers.run(&ctx).await;
        assert_eq!(result.status, crate::model::Status::Skipped);
    }
}
