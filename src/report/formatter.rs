use crate::validator::{GraphStats, Severity, Violation};
use itertools::Itertools;

/// Formats validation results into human-readable text.
pub struct ReportFormatter;

impl ReportFormatter {
    /// Format a full validation report: stats, errors, warnings and a verdict line.
    pub fn format_report(stats: &GraphStats, violations: &[Violation]) -> String {
        let (errors, warnings): (Vec<&Violation>, Vec<&Violation>) = violations
            .iter()
            .partition(|v| v.severity == Severity::Error);

        let mut result = String::new();
        result.push_str(&Self::format_stats(stats));
        result.push('\n');

        if !errors.is_empty() {
            result.push_str(&format!("\nErrors ({}):\n", errors.len()));
            result.push_str(&Self::format_list(&errors));
        }
        if !warnings.is_empty() {
            result.push_str(&format!("\nWarnings ({}):\n", warnings.len()));
            result.push_str(&Self::format_list(&warnings));
        }

        let verdict = if errors.is_empty() { "PASSED" } else { "FAILED" };
        result.push_str(&format!(
            "\nValidation {}: {} error(s), {} warning(s)",
            verdict,
            errors.len(),
            warnings.len()
        ));
        result
    }

    /// Format the graph size summary.
    pub fn format_stats(stats: &GraphStats) -> String {
        let mut result = format!(
            "Nodes: {}\nConnection sources: {}\nEdges: {}",
            stats.nodes, stats.sources, stats.edges
        );
        if !stats.edges_by_kind.is_empty() {
            let by_kind = stats
                .edges_by_kind
                .iter()
                .map(|(kind, count)| format!("{}={}", kind, count))
                .join(", ");
            result.push_str(&format!(" ({})", by_kind));
        }
        result
    }

    fn format_list(violations: &[&Violation]) -> String {
        violations
            .iter()
            .map(|v| format!("  - {}\n", v))
            .collect()
    }
}
