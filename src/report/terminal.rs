//! Terminal reporter: a summary block, then (unless quiet) one header per
//! failing or warning check with its grouped findings.

use crate::aggregate::AggregatedReport;

pub fn render_terminal(report: &AggregatedReport, verbose: bool, quiet: bool) -> String {
    let counts = &report.counts;
    let mut out = String::new();
    out.push_str(&format!(
        "Tasks: {}\nPassed: {}\nWarned: {}\nFailed: {}\nSkipped: {}\n",
        counts.total, counts.passed, counts.warned, counts.failed, counts.skipped
    ));

    if quiet {
        return out;
    }

    for aggregated in &report.results {
        if aggregated.groups.is_empty() {
            continue;
        }
        out.push('\n');
        out.push_str(&format!("== {} ==\n", aggregated.result.name));
        for group in &aggregated.groups {
            out.push_str(&format!("  [{:?}] {} ({})\n", group.severity, group.code, group.count));
            for (file, count) in &group.files {
                if file.is_empty() {
                    continue;
                }
                out.push_str(&format!("    {file} ({count})\n"));
            }
            if let Some(suggestion) = &group.suggestion {
                out.push_str(&format!("    suggestion: {suggestion}\n"));
            }
        }
        if verbose {
            if let Some(duration) = aggregated.result.duration_ms {
                out.push_str(&format!("  duration: {duration}ms\n"));
            }
        }
    }
    out
}
