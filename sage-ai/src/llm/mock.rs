//! Mock LLM for testing and offline development
//!
//! Behaviour is scripted up front; every call is counted and the last
//! request is kept so tests can inspect the prompts that were sent.

use super::{CompletionRequest, LlmEngine, LlmResponse, MessageRole};
use anyhow::Result;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use tracing::debug;

/// What the mock does when asked to generate
#[derive(Debug, Clone)]
pub enum MockBehavior {
    /// Answer with a short canned draft that quotes the email's first line
    Echo,
    /// Answer with this exact text
    Reply(String),
    /// Return a completion without any text
    Empty,
    /// Fail as if the provider was unreachable
    Fail(String),
}

/// Mock LLM implementation
pub struct MockLlm {
    model_name: String,
    behavior: MockBehavior,
    calls: AtomicUsize,
    last_request: Mutex<Option<CompletionRequest>>,
}

impl MockLlm {
    pub fn new() -> Self {
        Self::with_behavior(MockBehavior::Echo)
    }

    pub fn with_behavior(behavior: MockBehavior) -> Self {
        Self {
            model_name: "mock-llm-v1".to_string(),
            behavior,
            calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        }
    }

    pub fn replying(text: &str) -> Self {
        Self::with_behavior(MockBehavior::Reply(text.to_string()))
    }

    pub fn failing(reason: &str) -> Self {
        Self::with_behavior(MockBehavior::Fail(reason.to_string()))
    }

    /// Number of generate calls received so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Copy of the most recent request, if any
    pub fn last_request(&self) -> Option<CompletionRequest> {
        self.last_request
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or(None)
    }

    fn echo(request: &CompletionRequest) -> String {
        let user_message = request
            .messages
            .iter()
            .rev()
            .find(|m| m.role == MessageRole::User)
            .map(|m| m.content.as_str())
            .unwrap_or("");

        // The email follows the blank line of the instruction
        let email = user_message
            .split_once("\n\n")
            .map(|(_, email)| email)
            .unwrap_or(user_message);
        let first_line = email.lines().next().unwrap_or("").trim();

        format!(
            "Hello,\n\nThank you for your message regarding \"{}\". I will get back to you shortly.\n\nBest regards",
            first_line
        )
    }
}

impl Default for MockLlm {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl LlmEngine for MockLlm {
    async fn generate(&self, request: CompletionRequest) -> Result<LlmResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        debug!("MockLLM: Processing {} messages", request.messages.len());

        if let Ok(mut last) = self.last_request.lock() {
            *last = Some(request.clone());
        }

        match &self.behavior {
            MockBehavior::Echo => Ok(LlmResponse {
                text: Some(Self::echo(&request)),
                finish_reason: "stop".to_string(),
            }),
            MockBehavior::Reply(text) => Ok(LlmResponse {
                text: Some(text.clone()),
                finish_reason: "stop".to_string(),
            }),
            MockBehavior::Empty => Ok(LlmResponse {
                text: None,
                finish_reason: "stop".to_string(),
            }),
            MockBehavior::Fail(reason) => anyhow::bail!("mock provider failure: {}", reason),
        }
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::Message;

    fn request(email: &str) -> CompletionRequest {
        CompletionRequest {
            messages: vec![
                Message::system("You are an email assistant."),
                Message::user(format!("Please generate a reply to this email:\n\n{}", email)),
            ],
            max_tokens: 500,
            temperature: 0.7,
        }
    }

    #[tokio::test]
    async fn test_mock_llm_echo_quotes_first_line() {
        let llm = MockLlm::new();

        let response = llm.generate(request("Can we reschedule?\nThanks")).await.unwrap();

        let text = response.text.unwrap();
        assert!(text.contains("Can we reschedule?"));
        assert!(!text.contains("Thanks\""));
        assert_eq!(llm.calls(), 1);
    }

    #[tokio::test]
    async fn test_mock_llm_records_last_request() {
        let llm = MockLlm::replying("ok");

        llm.generate(request("first")).await.unwrap();
        llm.generate(request("second")).await.unwrap();

        let last = llm.last_request().unwrap();
        assert!(last.messages[1].content.ends_with("second"));
        assert_eq!(llm.calls(), 2);
    }

    #[tokio::test]
    async fn test_mock_llm_failure() {
        let llm = MockLlm::failing("quota exceeded");

        let err = llm.generate(request("hi")).await.unwrap_err();
        assert!(err.to_string().contains("quota exceeded"));
        assert_eq!(llm.calls(), 1);
    }

    #[tokio::test]
    async fn test_mock_llm_empty() {
        let llm = MockLlm::with_behavior(MockBehavior::Empty);

        let response = llm.generate(request("hi")).await.unwrap();
        assert!(response.text.is_none());
    }
}
