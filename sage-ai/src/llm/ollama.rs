//! Ollama LLM implementation
//!
//! This implementation uses Ollama's HTTP chat API for self-hosted models.

use super::{CompletionRequest, LlmEngine, LlmResponse};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

pub const DEFAULT_BASE_URL: &str = "http://localhost:11434";

/// Ollama LLM implementation
pub struct OllamaLlm {
    model_name: String,
    base_url: String,
    client: reqwest::Client,
}

impl OllamaLlm {
    pub fn new(model_name: String) -> Self {
        Self {
            model_name,
            base_url: DEFAULT_BASE_URL.to_string(),
            client: reqwest::Client::new(),
        }
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    fn build_request(&self, request: CompletionRequest) -> OllamaChatRequest {
        OllamaChatRequest {
            model: self.model_name.clone(),
            messages: request
                .messages
                .into_iter()
                .map(|m| OllamaMessage {
                    role: m.role.as_str().to_string(),
                    content: m.content,
                })
                .collect(),
            stream: false,
            options: OllamaOptions {
                temperature: request.temperature,
                num_predict: request.max_tokens,
            },
        }
    }
}

/// Ollama chat request
#[derive(Debug, Serialize)]
struct OllamaChatRequest {
    model: String,
    messages: Vec<OllamaMessage>,
    stream: bool,
    options: OllamaOptions,
}

/// Sampling options
#[derive(Debug, Serialize)]
struct OllamaOptions {
    temperature: f32,
    /// Ollama's name for the output token cap
    num_predict: u32,
}

/// Ollama message
#[derive(Debug, Serialize, Deserialize, Clone)]
struct OllamaMessage {
    role: String,
    #[serde(default)]
    content: String,
}

/// Ollama chat response
#[derive(Debug, Deserialize)]
struct OllamaChatResponse {
    message: Option<OllamaMessage>,
    #[serde(default)]
    done_reason: Option<String>,
    done: bool,
}

#[async_trait::async_trait]
impl LlmEngine for OllamaLlm {
    async fn generate(&self, request: CompletionRequest) -> Result<LlmResponse> {
        debug!(
            "OllamaLLM: Processing {} messages with model {}",
            request.messages.len(),
            self.model_name
        );

        let body = self.build_request(request);

        debug!("OllamaLLM: Sending request to {}/api/chat", self.base_url);

        let response = self
            .client
            .post(format!("{}/api/chat", self.base_url))
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            warn!("OllamaLLM: Request failed with status {}: {}", status, error_text);
            anyhow::bail!("Ollama request failed: {} - {}", status, error_text);
        }

        let ollama_response: OllamaChatResponse = response.json().await?;

        debug!("OllamaLLM: Received response, done={}", ollama_response.done);

        Ok(LlmResponse {
            text: ollama_response.message.map(|m| m.content),
            finish_reason: ollama_response
                .done_reason
                .unwrap_or_else(|| "stop".to_string()),
        })
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
    fn test_options_map_token_cap_to_num_predict() {
        let llm = OllamaLlm::new("mistral:latest".to_string());

        let body = llm.build_request(CompletionRequest {
            messages: vec![Message::user("Dis bonjour")],
            max_tokens: 500,
            temperature: 0.7,
        });

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["stream"], false);
        assert_eq!(json["options"]["num_predict"], 500);
        assert_eq!(json["messages"][0]["role"], "user");
    }

    #[tokio::test]
    #[ignore] // Only run when Ollama is available
    async fn test_ollama_simple_generation() {
        let llm = OllamaLlm::new("mistral:latest".to_string());

        let response = llm
            .generate(CompletionRequest {
                messages: vec![Message::user("Say hello in one short sentence.")],
                max_tokens: 64,
                temperature: 0.7,
            })
            .await
            .unwrap();

        assert!(!response.text.unwrap_or_default().is_empty());
    }
}
