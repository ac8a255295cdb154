//! Chat-completion seam for the review engine.

use ai_llm_service::{error_handler::AiLlmError, service_profiles::LlmServiceProfiles};
use git_context_engine::BoxFuture;

/// One system + user exchange with the review model.
pub trait ChatModel: Send + Sync {
    fn complete<'a>(
        &'a self,
        system: &'a str,
        prompt: &'a str,
    ) -> BoxFuture<'a, Result<String, AiLlmError>>;
}

impl ChatModel for LlmServiceProfiles {
    fn complete<'a>(
        &'a self,
        system: &'a str,
        prompt: &'a str,
    ) -> BoxFuture<'a, Result<String, AiLlmError>> {
        Box::pin(self.chat(prompt, Some(system)))
    }
}
