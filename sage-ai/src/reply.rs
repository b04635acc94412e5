//! Email reply generation
//!
//! Turns an original email, an optional free-text context and a tone into a
//! pair of instructions, submits them to the injected [`LlmEngine`] in a
//! single round trip, and returns the first completion verbatim.

use crate::llm::{CompletionRequest, LlmEngine, Message};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info};

/// Returned when the provider answers without any text
pub const FALLBACK_REPLY: &str = "Sorry, I could not generate a reply.";

/// Message carried by the validation error for a missing email body
pub const EMPTY_EMAIL_MESSAGE: &str = "email content required";

/// Tone of the generated reply
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    #[default]
    Professional,
    Friendly,
    Formal,
}

impl fmt::Display for Tone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tone::Professional => write!(f, "professional"),
            Tone::Friendly => write!(f, "friendly"),
            Tone::Formal => write!(f, "formal"),
        }
    }
}

/// Sampling settings sent with every request
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerationSettings {
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_tokens: 500,
        }
    }
}

/// Input to [`ReplyGenerator::generate`]
#[derive(Debug, Clone, Default)]
pub struct ReplyRequest {
    pub original_email: String,
    pub context: Option<String>,
    pub tone: Tone,
}

impl ReplyRequest {
    pub fn new(original_email: impl Into<String>) -> Self {
        Self {
            original_email: original_email.into(),
            ..Self::default()
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn with_tone(mut self, tone: Tone) -> Self {
        self.tone = tone;
        self
    }
}

/// A generated draft
#[derive(Debug, Clone, Serialize)]
pub struct GeneratedReply {
    pub text: String,
    pub generated_at: DateTime<Utc>,
    pub model: String,
    /// True when the provider returned nothing and the fallback was used
    pub fallback: bool,
}

/// Reply generation errors
#[derive(Error, Debug)]
pub enum ReplyError {
    /// Missing or malformed input, nothing was sent to the provider
    #[error("{0}")]
    Validation(String),

    /// Provider-side failure; the cause is logged, never returned
    #[error("Failed to generate reply")]
    GenerationFailed,
}

/// Reply generation service
pub struct ReplyGenerator {
    llm: Arc<dyn LlmEngine>,
    settings: GenerationSettings,
}

impl ReplyGenerator {
    pub fn new(llm: Arc<dyn LlmEngine>) -> Self {
        Self::with_settings(llm, GenerationSettings::default())
    }

    pub fn with_settings(llm: Arc<dyn LlmEngine>, settings: GenerationSettings) -> Self {
        Self { llm, settings }
    }

    pub fn settings(&self) -> GenerationSettings {
        self.settings
    }

    pub fn model_name(&self) -> &str {
        self.llm.model_name()
    }

    /// Generate a reply draft
    pub async fn generate(&self, request: ReplyRequest) -> Result<GeneratedReply, ReplyError> {
        if request.original_email.trim().is_empty() {
            return Err(ReplyError::Validation(EMPTY_EMAIL_MESSAGE.to_string()));
        }

        let messages = vec![
            Message::system(system_prompt(request.tone, request.context.as_deref())),
            Message::user(user_prompt(&request.original_email)),
        ];

        info!(
            "Generating {} reply with {} ({} chars)",
            request.tone,
            self.llm.model_name(),
            request.original_email.len()
        );

        let response = self
            .llm
            .generate(CompletionRequest {
                messages,
                max_tokens: self.settings.max_tokens,
                temperature: self.settings.temperature,
            })
            .await
            .map_err(|e| {
                error!("Error generating email reply: {:#}", e);
                ReplyError::GenerationFailed
            })?;

        let (text, fallback) = match response.text {
            Some(text) if !text.trim().is_empty() => (text, false),
            _ => (FALLBACK_REPLY.to_string(), true),
        };

        Ok(GeneratedReply {
            text,
            generated_at: Utc::now(),
            model: self.llm.model_name().to_string(),
            fallback,
        })
    }
}

/// System instruction embedding tone and optional context
pub fn system_prompt(tone: Tone, context: Option<&str>) -> String {
    let mut prompt = String::from(
        "You are a professional email assistant that helps generate thoughtful, well-structured email replies.\n",
    );
    prompt.push_str(&format!("Generate a {} response to the given email.\n", tone));

    if let Some(context) = context.map(str::trim).filter(|c| !c.is_empty()) {
        prompt.push_str(&format!("Additional context: {}\n", context));
    }

    prompt.push_str(
        "Keep the response concise, helpful, and appropriate for business communication.\n\
         Ensure the reply addresses the key points from the original email.",
    );
    prompt
}

/// User instruction carrying the original email
pub fn user_prompt(original_email: &str) -> String {
    format!("Please generate a reply to this email:\n\n{}", original_email)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::mock::{MockBehavior, MockLlm};
    use crate::llm::MessageRole;

    fn generator(llm: Arc<MockLlm>) -> ReplyGenerator {
        ReplyGenerator::new(llm)
    }

    #[tokio::test]
    async fn test_friendly_reply_is_returned() {
        let llm = Arc::new(MockLlm::new());
        let generator = generator(llm.clone());

        let reply = generator
            .generate(ReplyRequest::new("Can we reschedule?").with_tone(Tone::Friendly))
            .await
            .unwrap();

        assert!(!reply.text.is_empty());
        assert!(!reply.fallback);
        assert_eq!(reply.model, "mock-llm-v1");
        assert_eq!(llm.calls(), 1);
    }

    #[tokio::test]
    async fn test_empty_email_fails_before_provider_call() {
        let llm = Arc::new(MockLlm::new());
        let generator = generator(llm.clone());

        for email in ["", "   ", "\n\t"] {
            let err = generator
                .generate(ReplyRequest::new(email).with_tone(Tone::Professional))
                .await
                .unwrap_err();

            match err {
                ReplyError::Validation(msg) => assert_eq!(msg, "email content required"),
                other => panic!("expected validation error, got {:?}", other),
            }
        }

        assert_eq!(llm.calls(), 0);
    }

    #[tokio::test]
    async fn test_empty_completion_uses_fallback() {
        let llm = Arc::new(MockLlm::with_behavior(MockBehavior::Empty));
        let reply = generator(llm.clone())
            .generate(ReplyRequest::new("Hello"))
            .await
            .unwrap();

        assert_eq!(reply.text, FALLBACK_REPLY);
        assert!(reply.fallback);
        assert_eq!(llm.calls(), 1);
    }

    #[tokio::test]
    async fn test_blank_completion_uses_fallback() {
        let llm = Arc::new(MockLlm::replying("  "));
        let reply = generator(llm).generate(ReplyRequest::new("Hello")).await.unwrap();
        assert_eq!(reply.text, FALLBACK_REPLY);
    }

    #[tokio::test]
    async fn test_provider_failure_is_opaque() {
        let llm = Arc::new(MockLlm::failing("401 invalid api key sk-secret"));
        let err = generator(llm.clone())
            .generate(ReplyRequest::new("Hello"))
            .await
            .unwrap_err();

        assert!(matches!(err, ReplyError::GenerationFailed));
        assert!(!err.to_string().contains("sk-secret"));
        assert_eq!(llm.calls(), 1);
    }

    #[tokio::test]
    async fn test_request_carries_prompts_and_settings() {
        let llm = Arc::new(MockLlm::replying("ok"));
        let generator = ReplyGenerator::with_settings(
            llm.clone(),
            GenerationSettings {
                temperature: 0.2,
                max_tokens: 120,
            },
        );

        generator
            .generate(
                ReplyRequest::new("Invoice #42 is overdue")
                    .with_context("We paid it yesterday")
                    .with_tone(Tone::Formal),
            )
            .await
            .unwrap();

        let request = llm.last_request().unwrap();
        assert_eq!(request.max_tokens, 120);
        assert!((request.temperature - 0.2).abs() < f32::EPSILON);
        assert_eq!(request.messages.len(), 2);
        assert_eq!(request.messages[0].role, MessageRole::System);
        assert!(request.messages[0].content.contains("formal response"));
        assert!(request.messages[0].content.contains("Additional context: We paid it yesterday"));
        assert_eq!(request.messages[1].role, MessageRole::User);
        assert!(request.messages[1].content.ends_with("Invoice #42 is overdue"));
    }

    #[test]
    fn test_blank_context_is_omitted() {
        let prompt = system_prompt(Tone::Professional, Some("   "));
        assert!(!prompt.contains("Additional context"));
        assert!(prompt.contains("professional response"));
    }

    #[test]
    fn test_tone_wire_names() {
        assert_eq!(serde_json::to_string(&Tone::Friendly).unwrap(), "\"friendly\"");
        let tone: Tone = serde_json::from_str("\"formal\"").unwrap();
        assert_eq!(tone, Tone::Formal);
        assert!(serde_json::from_str::<Tone>("\"sarcastic\"").is_err());
        assert_eq!(Tone::default(), Tone::Professional);
    }
}
