//! Output formatter trait

use consensus_domain::PipelineReport;

/// Trait for formatting pipeline reports
pub trait OutputFormatter {
    /// Format every stage with its provenance
    fn format(&self, report: &PipelineReport) -> String;

    /// Format as JSON
    fn format_json(&self, report: &PipelineReport) -> String;

    /// Format the final consensus only (concise output)
    fn format_final(&self, report: &PipelineReport) -> String;
}
