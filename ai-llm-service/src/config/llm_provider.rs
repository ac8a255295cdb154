/// Represents the provider (backend) used for model inference.
///
/// `OpenAI` covers every OpenAI-compatible REST API (OpenAI itself, Groq, ...):
/// the wire format is identical, only the endpoint and key change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LlmProvider {
    /// Ollama runtime (used for local embeddings).
    Ollama,
    /// OpenAI-compatible chat/embeddings API.
    OpenAI,
}

impl LlmProvider {
    /// Parses a provider name as written in env (`ollama`, `openai`, `groq`).
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "ollama" => Some(LlmProvider::Ollama),
            "openai" | "groq" => Some(LlmProvider::OpenAI),
            _ => None,
        }
    }
}

impl std::fmt::Display for LlmProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LlmProvider::Ollama => f.write_str("ollama"),
            LlmProvider::OpenAI => f.write_str("openai"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_names() {
        assert_eq!(LlmProvider::parse("Ollama"), Some(LlmProvider::Ollama));
        assert_eq!(LlmProvider::parse("groq"), Some(LlmProvider::OpenAI));
        assert_eq!(LlmProvider::parse("anthropic"), None);
    }
}
