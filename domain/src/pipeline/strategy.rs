//! Pipeline strategy: the per-call functions that specialise the engine.
//!
//! Instead of one orchestrator subclass per analytical domain, callers
//! supply two pure functions:
//!
//! - `build_prompt(StageContext) → AnalysisRequest`
//! - `parse_reply(text) → AnalysisValue | ParseFailure`
//!
//! [`PipelineStrategy::default`] builds prompts from the built-in
//! templates and parses JSON objects out of replies.

use super::report::StageReport;
use super::stage::Stage;
use crate::analysis::AnalysisRequest;
use crate::consensus::parsing::{ParseFailure, parse_structured_reply};
use crate::core::value::AnalysisValue;
use crate::prompt::PromptTemplate;
use std::sync::Arc;

/// Everything a prompt builder may look at
#[derive(Debug, Clone, Copy)]
pub struct StageContext<'a> {
    pub stage: Stage,
    /// The caller's domain payload
    pub payload: &'a serde_json::Value,
    /// Reports of the stages that already completed, in order
    pub prior: &'a [StageReport],
}

pub type BuildPromptFn = dyn Fn(&StageContext<'_>) -> AnalysisRequest + Send + Sync;
pub type ParseReplyFn = dyn Fn(&str) -> Result<AnalysisValue, ParseFailure> + Send + Sync;

/// Per-call prompt building and reply parsing
#[derive(Clone)]
pub struct PipelineStrategy {
    build_prompt: Arc<BuildPromptFn>,
    parse_reply: Arc<ParseReplyFn>,
}

impl PipelineStrategy {
    pub fn new<B, P>(build_prompt: B, parse_reply: P) -> Self
    where
        B: Fn(&StageContext<'_>) -> AnalysisRequest + Send + Sync + 'static,
        P: Fn(&str) -> Result<AnalysisValue, ParseFailure> + Send + Sync + 'static,
    {
        Self {
            build_prompt: Arc::new(build_prompt),
            parse_reply: Arc::new(parse_reply),
        }
    }

    /// Built-in templates; `structured` selects JSON-object or free-text replies
    pub fn templated(structured: bool) -> Self {
        Self::new(
            move |ctx: &StageContext<'_>| PromptTemplate::stage_request(ctx, structured),
            parse_structured_reply,
        )
    }

    pub fn build_request(&self, ctx: &StageContext<'_>) -> AnalysisRequest {
        (self.build_prompt)(ctx)
    }

    pub fn parse(&self, text: &str) -> Result<AnalysisValue, ParseFailure> {
        (self.parse_reply)(text)
    }
}

impl Default for PipelineStrategy {
    fn default() -> Self {
        Self::templated(true)
    }
}

impl std::fmt::Debug for PipelineStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineStrategy").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_custom_functions_are_used() {
        let strategy = PipelineStrategy::new(
            |ctx: &StageContext<'_>| {
                AnalysisRequest::new(format!("stage {}", ctx.stage.number()), ctx.payload.clone())
            },
            |text: &str| Ok(AnalysisValue::from(text.to_uppercase())),
        );

        let payload = json!({"x": 1});
        let ctx = StageContext {
            stage: Stage::Data,
            payload: &payload,
            prior: &[],
        };
        assert_eq!(strategy.build_request(&ctx).prompt, "stage 2");
        assert_eq!(strategy.parse("abc").unwrap(), AnalysisValue::from("ABC"));
    }

    #[test]
    fn test_default_is_structured() {
        let payload = json!({"x": 1});
        let ctx = StageContext {
            stage: Stage::Knowledge,
            payload: &payload,
            prior: &[],
        };
        let request = PipelineStrategy::default().build_request(&ctx);
        assert!(request.require_structured);
        assert_eq!(request.stage_hints.get("stage").map(String::as_str), Some("knowledge"));
    }
}
