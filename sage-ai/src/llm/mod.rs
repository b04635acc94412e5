//! LLM Engine abstraction

use anyhow::Result;
use serde::{Deserialize, Serialize};

pub mod mock;
pub mod ollama;
pub mod openai;

pub use mock::MockLlm;
pub use ollama::OllamaLlm;
pub use openai::OpenAiLlm;

/// Completion produced by an engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmResponse {
    /// Generated text, `None` when the provider returned no choice
    pub text: Option<String>,
    /// Finish reason reported by the provider (stop, length, ...)
    pub finish_reason: String,
}

/// Message in a completion request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }
}

/// Message role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

impl MessageRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageRole::System => "system",
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
        }
    }
}

/// One round trip to a text-generation provider
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub messages: Vec<Message>,
    /// Output cap in tokens
    pub max_tokens: u32,
    /// Sampling temperature
    pub temperature: f32,
}

/// LLM Engine trait
#[async_trait::async_trait]
pub trait LlmEngine: Send + Sync {
    /// Generate a completion for the given messages
    async fn generate(&self, request: CompletionRequest) -> Result<LlmResponse>;

    /// Get model name
    fn model_name(&self) -> &str;
}
