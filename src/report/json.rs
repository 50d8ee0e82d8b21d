//! JSON reporter: `{ "results": [<check result>, ...] }`, round-trippable.

use crate::aggregate::AggregatedReport;

pub fn render_json(report: &AggregatedReport) -> String {
    let results: Vec<&crate::model::CheckResult> =
        report.results.iter().map(|aggregated| aggregated.result).collect();
    let document = serde_json::json!({
        "generated_at": chrono::Utc::now().to_rfc3339(),
        "results": results,
    });
    serde_json::to_string_pretty(&document).expect("check results are always serializable")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::aggregate;
    use crate::model::{CheckResult, Finding, Severity, Status};

    #[test]
    fn round_trips_through_serde_json() {
        let findings = vec![Finding::new("demo/x", Severity::Error, "bad").with_location(3, 1)];
        let results = vec![CheckResult::new("Demo", findings)];
        let aggregated = aggregate(&results);
        let rendered = render_json(&aggregated);

        let parsed: serde_json::Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(parsed["results"][0]["status"], "fail");
        assert_eq!(parsed["results"][0]["findings"][0]["line"], 3);
    }

    #[test]
    fn empty_results_still_produces_valid_document() {
        let aggregated = aggregate(&[]);
        let rendered = render_json(&aggregated);
        let parsed: serde_json::Value = serde_json::from_str(&rendered).unwrap();
        assert!(parsed["results"].as_array().unwrap().is_empty());
    }

    #[test]
    fn skipped_status_serializes_as_lowercase() {
        let results = vec![CheckResult::skipped("demo")];
        let aggregated = aggregate(&results);
        let rendered = render_json(&aggregated);
        let parsed: serde_json::Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(parsed["results"][0]["status"], "skipped");
        assert_eq!(results[0].status, Status::Skipped);
    }
}
