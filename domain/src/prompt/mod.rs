//! Prompt domain
//!
//! Default templates for each pipeline stage. Callers with domain-specific
//! wording supply their own builder through `PipelineStrategy`.

mod template;

pub use template::PromptTemplate;
