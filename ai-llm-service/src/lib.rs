//! LLM access for the review pipeline.
//!
//! - chat completion against an OpenAI-compatible endpoint (Groq by default)
//! - text embeddings via Ollama (default) or an OpenAI-compatible endpoint
//!
//! Both are exposed through [`service_profiles::LlmServiceProfiles`].

pub mod config;
pub mod error_handler;
pub mod service_profiles;
pub mod services;
