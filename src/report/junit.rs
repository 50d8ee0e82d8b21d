//! JUnit reporter: one `<testsuite>` with a `<testcase>` per check; failures
//! carry a `<failure>` with CDATA findings, warnings a `<skipped>`.

use crate::aggregate::AggregatedReport;
use crate::model::Status;

pub fn render_junit(report: &AggregatedReport) -> String {
    let tests = report.counts.total;
    let failures = report.counts.failed;
    let mut out = String::new();
    out.push_str(&format!(
        "<testsuite name=\"hex-validator\" tests=\"{tests}\" failures=\"{failures}\">\n"
    ));
    for aggregated in &report.results {
        let result = aggregated.result;
        out.push_str(&format!(
            "  <testcase name=\"{}\">\n",
            escape_xml(&result.name)
        ));
        let body = findings_cdata(aggregated);
        match result.status {
            Status::Fail => {
                out.push_str(&format!(
                    "    <failure message=\"check failed\"><![CDATA[{body}]]></failure>\n"
                ));
            }
            Status::Warn => {
                out.push_str(&format!(
                    "    <skipped message=\"warning\"><![CDATA[{body}]]></skipped>\n"
                ));
            }
            Status::Pass | Status::Skipped => {}
        }
        out.push_str("  </testcase>\n");
    }
    out.push_str("</testsuite>\n");
    out
}

fn findings_cdata(aggregated: &crate::aggregate::AggregatedResult) -> String {
    aggregated
        .result
        .findings
        .iter()
        .map(|finding| {
            let location = match (&finding.file, finding.line) {
                (Some(file), Some(line)) => format!("{file}:{line}: "),
                (Some(file), None) => format!("{file}: "),
                _ => String::new(),
            };
            format!("{location}{} {}", finding.code, finding.message)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::aggregate;
    use crate::model::{CheckResult, Finding, Severity};

    #[test]
    fn failed_check_gets_failure_element() {
        let findings = vec![Finding::new("demo/x", Severity::Error, "bad").with_file("a.rs")];
        let results = vec![CheckResult::new("Demo", findings)];
        let aggregated = aggregate(&results);
        let xml = render_junit(&aggregated);
        assert!(xml.contains("<failure"));
        assert!(xml.contains("a.rs"));
    }

    #[test]
    fn warned_check_gets_skipped_element() {
        let findings = vec![Finding::new("demo/x", Severity::Warn, "careful")];
        let results = vec![CheckResult::new("Demo", findings)];
        let aggregated = aggregate(&results);
        let xml = render_junit(&aggregated);
        assert!(xml.contains("<skipped message=\"warning\""));
    }

    #[test]
    fn name_with_special_characters_is_escaped() {
        let results = vec![CheckResult::new("A & B < C", vec![])];
        let aggregated = aggregate(&results);
        let xml = render_junit(&aggregated);
        assert!(xml.contains("A &amp; B &lt; C"));
    }

    #[test]
    fn testsuite_attributes_reflect_counts() {
        let results = vec![
            CheckResult::new("ok", vec![]),
            CheckResult::new("bad", vec![Finding::new("x/y", Severity::Error, "e")]),
        ];
        let aggregated = aggregate(&results);
        let xml = render_junit(&aggregated);
        assert!(xml.contains("tests=\"2\""));
        assert!(xml.contains("failures=\"1\""));
    }
}
