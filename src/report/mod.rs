//! Reporters (C10): render the aggregator's output as terminal text, JSON,
//! or JUnit XML.

mod json;
mod junit;
mod terminal;

pub use json::render_json;
pub use junit::render_junit;
pub use terminal::render_terminal;

use crate::aggregate::AggregatedReport;
use crate::model::ReportFormat;

/// Dispatches to the reporter selected by `--report`.
pub fn render(format: ReportFormat, report: &AggregatedReport, verbose: bool, quiet: bool) -> String {
    match format {
        ReportFormat::Summary => render_terminal(report, verbose, quiet),
        ReportFormat::Json => render_json(report),
        ReportFormat::Junit => render_junit(report),
    }
}
