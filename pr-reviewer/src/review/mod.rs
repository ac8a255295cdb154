//! Review engine: prompt, one model call, lenient parse.
//!
//! Every path yields a [`ReviewResult`]; the verdict records which one was taken.

pub mod llm;
pub mod parser;
pub mod prompt;

use std::sync::Arc;

use git_context_engine::CodeChange;
use tracing::{debug, info, warn};

use crate::types::{ReviewResult, Severity};
use llm::ChatModel;

pub const API_FAILURE_SUMMARY: &str = "Analysis failed due to API error";

/// How a review result came about.
#[derive(Debug, Clone, PartialEq)]
pub enum ReviewVerdict {
    /// The model replied with usable JSON.
    Parsed(ReviewResult),
    /// The model replied, but not with the expected JSON.
    MalformedResponse(ReviewResult),
    /// The model call itself failed.
    ProviderFailure(ReviewResult),
}

impl ReviewVerdict {
    pub fn result(&self) -> &ReviewResult {
        match self {
            ReviewVerdict::Parsed(r)
            | ReviewVerdict::MalformedResponse(r)
            | ReviewVerdict::ProviderFailure(r) => r,
        }
    }

    pub fn into_result(self) -> ReviewResult {
        match self {
            ReviewVerdict::Parsed(r)
            | ReviewVerdict::MalformedResponse(r)
            | ReviewVerdict::ProviderFailure(r) => r,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum EngineOutcome {
    /// Nothing to review; the model was not called.
    NoChanges,
    Reviewed(ReviewVerdict),
}

pub struct ReviewEngine {
    llm: Arc<dyn ChatModel>,
}

impl ReviewEngine {
    pub fn new(llm: Arc<dyn ChatModel>) -> Self {
        Self { llm }
    }

    /// Reviews `changes`, appending `context` to the prompt when non-empty.
    pub async fn review(&self, changes: &[CodeChange], context: &str) -> EngineOutcome {
        if changes.is_empty() {
            return EngineOutcome::NoChanges;
        }

        let prompt = prompt::build_analysis_prompt(changes, context);
        debug!(
            files = changes.len(),
            prompt_chars = prompt.len(),
            context_chars = context.len(),
            "review prompt built"
        );

        let reply = match self.llm.complete(prompt::SYSTEM_PROMPT, &prompt).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!(error = %e, "review model call failed");
                return EngineOutcome::Reviewed(ReviewVerdict::ProviderFailure(ReviewResult {
                    severity: Severity::Low,
                    summary: API_FAILURE_SUMMARY.to_string(),
                    issues: Vec::new(),
                }));
            }
        };
        info!(reply_chars = reply.len(), "review model replied");

        let verdict = match parser::parse_review(&reply) {
            Ok(result) => ReviewVerdict::Parsed(result),
            Err(e) => {
                let preview: String = reply.chars().take(500).collect();
                warn!(error = %e, reply = %preview, "review reply is not valid JSON");
                ReviewVerdict::MalformedResponse(parser::invalid_format_result(&e))
            }
        };
        EngineOutcome::Reviewed(verdict)
    }
}
