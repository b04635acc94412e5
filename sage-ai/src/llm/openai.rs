//! OpenAI LLM implementation
//!
//! Talks to the Chat Completions endpoint (`POST /chat/completions`).

use super::{CompletionRequest, LlmEngine, LlmResponse};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// OpenAI LLM implementation
pub struct OpenAiLlm {
    model_name: String,
    api_key: String,
    base_url: String,
    client: reqwest::Client,
}

impl OpenAiLlm {
    pub fn new(api_key: String, model_name: String) -> Self {
        Self {
            model_name,
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            client: reqwest::Client::new(),
        }
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// Use a preconfigured client (timeouts, proxies)
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    fn build_request(&self, request: CompletionRequest) -> ChatRequest {
        ChatRequest {
            model: self.model_name.clone(),
            messages: request
                .messages
                .into_iter()
                .map(|m| ChatMessage {
                    role: m.role.as_str().to_string(),
                    content: Some(m.content),
                })
                .collect(),
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        }
    }
}

/// Chat completion request body
#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    #[serde(default)]
    content: Option<String>,
}

/// Chat completion response body
#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: Option<ChatMessage>,
    #[serde(default)]
    finish_reason: Option<String>,
}

impl ChatResponse {
    fn into_llm_response(self) -> LlmResponse {
        let first = self.choices.into_iter().next();
        let finish_reason = first
            .as_ref()
            .and_then(|c| c.finish_reason.clone())
            .unwrap_or_else(|| "none".to_string());

        LlmResponse {
            text: first.and_then(|c| c.message).and_then(|m| m.content),
            finish_reason,
        }
    }
}

#[async_trait::async_trait]
impl LlmEngine for OpenAiLlm {
    async fn generate(&self, request: CompletionRequest) -> Result<LlmResponse> {
        debug!(
            "OpenAiLLM: Processing {} messages with model {}",
            request.messages.len(),
            self.model_name
        );

        let body = self.build_request(request);

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            warn!("OpenAiLLM: Request failed with status {}: {}", status, error_text);
            anyhow::bail!("OpenAI request failed: {} - {}", status, error_text);
        }

        let chat_response: ChatResponse = response.json().await?;
        let llm_response = chat_response.into_llm_response();

        debug!("OpenAiLLM: Received response, finish_reason={}", llm_response.finish_reason);

        Ok(llm_response)
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::Message;

    #[test]
    fn test_build_request_carries_sampling_settings() {
        let llm = OpenAiLlm::new("sk-test".to_string(), DEFAULT_MODEL.to_string());

        let body = llm.build_request(CompletionRequest {
            messages: vec![Message::system("be brief"), Message::user("hello")],
            max_tokens: 500,
            temperature: 0.7,
        });

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["model"], "gpt-4o-mini");
        assert_eq!(json["max_tokens"], 500);
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["content"], "hello");
        assert!((json["temperature"].as_f64().unwrap() - 0.7).abs() < 1e-6);
    }

    #[test]
    fn test_first_choice_is_used() {
        let raw = r#"{
            "choices": [
                {"message": {"role": "assistant", "content": "Sure, Tuesday works."}, "finish_reason": "stop"},
                {"message": {"role": "assistant", "content": "ignored"}, "finish_reason": "stop"}
            ]
        }"#;

        let response: ChatResponse = serde_json::from_str(raw).unwrap();
        let response = response.into_llm_response();

        assert_eq!(response.text.as_deref(), Some("Sure, Tuesday works."));
        assert_eq!(response.finish_reason, "stop");
    }

    #[test]
    fn test_missing_choices_yield_no_text() {
        let response: ChatResponse = serde_json::from_str(r#"{"choices": []}"#).unwrap();
        let response = response.into_llm_response();
        assert!(response.text.is_none());

        let raw = r#"{"choices": [{"message": {"role": "assistant", "content": null}}]}"#;
        let response: ChatResponse = serde_json::from_str(raw).unwrap();
        assert!(response.into_llm_response().text.is_none());
    }

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let llm = OpenAiLlm::new("k".to_string(), "m".to_string())
            .with_base_url("http://localhost:9000/v1/".to_string());
        assert_eq!(llm.base_url, "http://localhost:9000/v1");
    }
}
