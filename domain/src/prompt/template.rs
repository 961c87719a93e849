//! Prompt templates for the three-stage pipeline

use crate::analysis::AnalysisRequest;
use crate::pipeline::stage::Stage;
use crate::pipeline::strategy::StageContext;

/// Templates for generating prompts at each stage
pub struct PromptTemplate;

impl PromptTemplate {
    /// System instruction adapters send alongside every request
    pub fn system(structured: bool) -> &'static str {
        if structured {
            r#"You are one of several independent analysts answering the same question.
Ground every statement in the data you are given and cite it ("based on", "according to").
Say explicitly when data is missing instead of speculating.
Respond with a single JSON object and nothing else. Include a "confidence" field (0-100)."#
        } else {
            r#"You are one of several independent analysts answering the same question.
Ground every statement in the data you are given and cite it ("based on", "according to").
Say explicitly when data is missing instead of speculating.
End your answer with a line of the form "confidence: NN%"."#
        }
    }

    /// Task description of a stage
    pub fn stage_task(stage: Stage) -> &'static str {
        match stage {
            Stage::Knowledge => {
                "Summarize the established domain knowledge that is relevant to the data below: \
                 definitions, benchmarks and known patterns."
            }
            Stage::Data => {
                "Analyze the data below. Report only what the data shows, with the figures \
                 that support each finding."
            }
            Stage::Reasoning => {
                "Using the knowledge and data findings below, draw conclusions and \
                 recommendations. Every conclusion must follow from a finding."
            }
        }
    }

    /// Build the request for a stage from its context
    pub fn stage_request(ctx: &StageContext<'_>, structured: bool) -> AnalysisRequest {
        let mut prompt = format!(
            "Stage {} of 3: {}\n\n{}\n\n## Data\n{}\n",
            ctx.stage.number(),
            ctx.stage.display_name(),
            Self::stage_task(ctx.stage),
            serde_json::to_string_pretty(ctx.payload).unwrap_or_else(|_| ctx.payload.to_string()),
        );

        for report in ctx.prior {
            prompt.push_str(&format!(
                "\n## {} findings (consensus {:.2})\n{}\n",
                report.stage.display_name(),
                report.consensus.consensus_score(),
                report.consensus.final_value().to_json()
            ));
        }

        if structured {
            prompt.push_str("\nRespond with a single JSON object.");
        }

        AnalysisRequest::new(prompt, ctx.payload.clone())
            .structured(structured)
            .with_hint("stage", ctx.stage.as_str())
    }
}
