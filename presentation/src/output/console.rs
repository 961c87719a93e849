//! Console output formatter for pipeline reports

use crate::output::formatter::OutputFormatter;
use colored::Colorize;
use consensus_domain::{
    AnalysisValue, ConsensusResult, FactBasisVerdict, OutputFormat, PipelineReport, StageReport,
};

/// Formats pipeline reports for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Turn ANSI colors off (for `color = false` in the output config)
    pub fn disable_color() {
        colored::control::set_override(false);
    }

    /// Render `report` in the requested format
    pub fn render(report: &PipelineReport, format: OutputFormat) -> String {
        match format {
            OutputFormat::Full => Self::format(report),
            OutputFormat::Final => Self::format_final(report),
            OutputFormat::Json => Self::format_json(report),
        }
    }

    /// Format every stage with contributors, failures and warnings
    pub fn format(report: &PipelineReport) -> String {
        let mut output = String::new();

        output.push_str(&Self::header("Consensus Report"));
        output.push('\n');

        for stage_report in &report.stages {
            output.push_str(&Self::format_stage(stage_report));
        }

        if let Some(result) = report.final_result() {
            output.push_str(&Self::section_header("Final Consensus"));
            output.push('\n');
            output.push_str(&Self::render_value(result.final_value()));
            output.push('\n');
        }

        output.push_str(&format!(
            "\n{} {}\n",
            "Fact basis:".cyan().bold(),
            Self::fact_basis_line(&report.fact_basis)
        ));

        output.push_str(&Self::footer());

        output
    }

    /// Format as JSON
    pub fn format_json(report: &PipelineReport) -> String {
        serde_json::to_string_pretty(report).unwrap_or_else(|_| "{}".to_string())
    }

    /// Format the final consensus only (concise output)
    pub fn format_final(report: &PipelineReport) -> String {
        let Some(result) = report.final_result() else {
            return format!("{}\n", "No final consensus".red());
        };

        let mut output = String::new();
        output.push_str(&Self::render_value(result.final_value()));
        output.push_str("\n\n");
        output.push_str(&format!(
            "{} {:.2} ({}; {})\n",
            "Consensus:".dimmed(),
            result.consensus_score(),
            result.methodology(),
            result.backend_ids().join(", ")
        ));

        // Fact-basis findings are attached to the final result as warnings
        for warning in result.warnings() {
            output.push_str(&format!("{} {}\n", "!".yellow().bold(), warning));
        }

        output
    }

    fn format_stage(report: &StageReport) -> String {
        let stage = report.stage;
        let consensus = &report.consensus;
        let mut output = Self::section_header(&format!(
            "Stage {}: {}",
            stage.number(),
            stage.display_name()
        ));

        output.push_str(&format!(
            "{} {}\n",
            "Consensus:".cyan().bold(),
            Self::score_line(consensus)
        ));

        for result in consensus.contributing_results() {
            let mut line = format!(
                "  {} {} confidence {:.2} ({} ms)",
                "v".green(),
                result.backend_id(),
                result.confidence(),
                result.elapsed_ms()
            );
            if result.parse_failed() {
                line.push_str(&format!(" {}", "[unparsed]".yellow()));
            }
            output.push_str(&line);
            output.push('\n');
        }

        for failure in &report.failures {
            output.push_str(&format!(
                "  {} {} {}: {}\n",
                "x".red(),
                failure.backend_id,
                failure.kind,
                failure.message
            ));
        }

        if !consensus.divergent_keys().is_empty() {
            output.push_str(&format!(
                "{} {}\n",
                "Divergent keys:".yellow().bold(),
                consensus.divergent_keys().join(", ")
            ));
        }

        for warning in consensus.warnings() {
            output.push_str(&format!("{} {}\n", "Warning:".yellow().bold(), warning));
        }

        output.push('\n');
        output.push_str(&Self::indent(&Self::render_value(consensus.final_value()), "  "));
        output.push('\n');

        output
    }

    fn score_line(consensus: &ConsensusResult) -> String {
        let score = format!("{:.2}", consensus.consensus_score());
        let score = if consensus.is_low_consensus() {
            score.yellow().bold().to_string()
        } else {
            score.green().bold().to_string()
        };
        format!("{} ({})", score, consensus.methodology())
    }

    fn fact_basis_line(verdict: &FactBasisVerdict) -> String {
        if verdict.evidence_based && !verdict.empty_source {
            return "evidence-based".green().to_string();
        }
        let mut reasons = Vec::new();
        if verdict.empty_source {
            reasons.push("no source data".to_string());
        }
        if !verdict.speculative_terms.is_empty() {
            reasons.push(format!(
                "speculative language ({})",
                verdict.speculative_terms.join(", ")
            ));
        }
        format!("{} {}", "flagged:".yellow(), reasons.join("; "))
    }

    /// Strings print as-is, everything else as pretty JSON
    fn render_value(value: &AnalysisValue) -> String {
        match value {
            AnalysisValue::String(s) => s.clone(),
            other => serde_json::to_string_pretty(&other.to_json())
                .unwrap_or_else(|_| other.to_text()),
        }
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    fn footer() -> String {
        format!("\n{}\n", "=".repeat(60).cyan())
    }

    /// Indent a multi-line string
    pub fn indent(text: &str, prefix: &str) -> String {
        text.lines()
            .map(|line| format!("{}{}", prefix, line))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format(&self, report: &PipelineReport) -> String {
        Self::format(report)
    }

    fn format_json(&self, report: &PipelineReport) -> String {
        Self::format_json(report)
    }

    fn format_final(&self, report: &PipelineReport) -> String {
        Self::format_final(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use consensus_domain::{
        AnalysisResult, BackendId, ConsensusWarning, FailedBackend, FailureKind, PipelineState,
        Reconciler, Stage,
    };
    use serde_json::json;

    fn stage_report(stage: Stage, value: serde_json::Value) -> StageReport {
        let results = vec![
            AnalysisResult::new(BackendId::new("alpha"), AnalysisValue::from(value.clone()), 0.8)
                .with_elapsed_ms(120),
            AnalysisResult::new(BackendId::new("beta"), AnalysisValue::from(value), 0.7)
                .with_elapsed_ms(90),
        ];
        let consensus = Reconciler::default().reconcile(results, true).unwrap();
        StageReport::new(stage, consensus, vec![])
    }

    fn sample_report() -> PipelineReport {
        let mut reasoning = stage_report(Stage::Reasoning, json!({"gap": "staffing", "score": 70}));
        reasoning.failures.push(FailedBackend {
            backend_id: BackendId::new("gamma"),
            kind: FailureKind::Timeout,
            message: "no reply within 500 ms".to_string(),
        });

        PipelineReport::new(
            vec![
                stage_report(Stage::Knowledge, json!({"context": "retail"})),
                stage_report(Stage::Data, json!({"headcount": 12})),
                reasoning,
            ],
            FactBasisVerdict {
                evidence_based: true,
                ..Default::default()
            },
            vec![PipelineState::Done(Stage::Reasoning)],
        )
    }

    #[test]
    fn test_full_format_lists_every_stage() {
        let output = ConsoleFormatter::format(&sample_report());

        assert!(output.contains("Stage 1: Knowledge"));
        assert!(output.contains("Stage 2: Data"));
        assert!(output.contains("Stage 3: Reasoning"));
        assert!(output.contains("alpha confidence 0.80 (120 ms)"));
        assert!(output.contains("gamma timeout: no reply within 500 ms"));
        assert!(output.contains("\"gap\": \"staffing\""));
    }

    #[test]
    fn test_final_format_shows_value_and_score() {
        let output = ConsoleFormatter::format_final(&sample_report());

        assert!(output.contains("\"score\": 70"));
        assert!(output.contains("0.75 (multi-backend-merge; alpha, beta)"));
        assert!(!output.contains("Stage 1"));
    }

    #[test]
    fn test_final_format_shows_fact_basis_warnings() {
        let mut report = sample_report();
        let last = report.stages.pop().unwrap();
        let consensus = last
            .consensus
            .with_warning(ConsensusWarning::SpeculativeLanguage {
                terms: vec!["probably".to_string()],
            })
            .with_warning(ConsensusWarning::EmptySource);
        report
            .stages
            .push(StageReport::new(last.stage, consensus, last.failures));

        let output = ConsoleFormatter::format_final(&report);
        assert!(output.contains("speculative language: probably"));
        assert!(output.contains("no source data supplied"));
    }

    #[test]
    fn test_full_format_reports_empty_source() {
        let mut report = sample_report();
        report.fact_basis = FactBasisVerdict {
            evidence_based: true,
            speculative_terms: vec![],
            empty_source: true,
        };

        let output = ConsoleFormatter::format(&report);
        assert!(output.contains("no source data"));
        assert!(!output.contains("evidence-based"));
    }

    #[test]
    fn test_json_format_is_parseable() {
        let output = ConsoleFormatter::format_json(&sample_report());
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert_eq!(value["stages"].as_array().unwrap().len(), 3);
        assert_eq!(value["stages"][2]["failures"][0]["kind"], "timeout");
    }

    #[test]
    fn test_render_dispatches_on_format() {
        let report = sample_report();
        assert_eq!(
            ConsoleFormatter::render(&report, OutputFormat::Json),
            ConsoleFormatter::format_json(&report)
        );
    }

    #[test]
    fn test_plain_string_value_is_not_quoted() {
        let value = AnalysisValue::from("Staffing is the main gap.");
        assert_eq!(ConsoleFormatter::render_value(&value), "Staffing is the main gap.");
    }

    #[test]
    fn test_indent() {
        assert_eq!(ConsoleFormatter::indent("a\nb", "  "), "  a\n  b");
    }
}
