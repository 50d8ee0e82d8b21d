//! Finding aggregator (C9): a pure function of a result list, producing
//! top-line counts and per-rule-code finding groups. Sole input to every
//! reporter.

use std::collections::BTreeMap;

use crate::model::{CheckResult, Severity, Status};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SummaryCounts {
    pub total: usize,
    pub passed: usize,
    pub warned: usize,
    pub failed: usize,
    pub skipped: usize,
}

/// One rule code's findings across a single check result.
#[derive(Debug, Clone, PartialEq)]
pub struct FindingGroup {
    pub code: String,
    pub severity: Severity,
    pub count: usize,
    pub suggestion: Option<String>,
    /// File path (lexicographically sorted) to its occurrence count.
    pub files: Vec<(String, usize)>,
}

/// A single check result annotated with its finding groups, when the
/// result failed or warned.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregatedResult<'a> {
    pub result: &'a CheckResult,
    pub groups: Vec<FindingGroup>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AggregatedReport<'a> {
    pub counts: SummaryCounts,
    pub results: Vec<AggregatedResult<'a>>,
}

/// Groups findings by rule code, sorts groups by severity then code, and
/// computes top-line counts. Given the same input list, produces the same
/// structured summary every time.
pub fn aggregate(results: &[CheckResult]) -> AggregatedReport<'_> {
    let mut counts = SummaryCounts { total: results.len(), ..Default::default() };
    for result in results {
        match result.status {
            Status::Pass => counts.passed += 1,
            Status::Warn => counts.warned += 1,
            Status::Fail => counts.failed += 1,
            Status::Skipped => counts.skipped += 1,
        }
    }

    let aggregated = results
        .iter()
        .map(|result| AggregatedResult { result, groups: group_findings(result) })
        .collect();

    AggregatedReport { counts, results: aggregated }
}

fn group_findings(result: &CheckResult) -> Vec<FindingGroup> {
    if !matches!(result.status, Status::Fail | Status::Warn) {
        return Vec::new();
    }

    let mut by_code: BTreeMap<&str, Vec<&crate::model::Finding>> = BTreeMap::new();
    for finding in &result.findings {
        by_code.entry(&finding.code).or_default().push(finding);
    }

    let mut groups: Vec<FindingGroup> = by_code
        .into_iter()
        .map(|(code, findings)| {
            let severity = findings.iter().map(|f| f.severity).min().unwrap_or(Severity::Info);
            let suggestion = findings.iter().find_map(|f| f.suggestion.clone());
            let mut per_file: BTreeMap<String, usize> = BTreeMap::new();
            for finding in &findings {
                let file = finding.file.clone().unwrap_or_default();
                *per_file.entry(file).or_default() += 1;
            }
            FindingGroup {
                code: code.to_string(),
                severity,
                count: findings.len(),
                suggestion,
                files: per_file.into_iter().collect(),
            }
        })
        .collect();

    groups.sort_by(|a, b| a.severity.cmp(&b.severity).then_with(|| a.code.cmp(&b.code)));
    groups
}
