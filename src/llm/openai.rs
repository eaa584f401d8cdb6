// file: src/llm/openai.rs
// description: OpenAI-compatible chat completions client (Groq, OpenAI)
// reference: https://console.groq.com/docs/api-reference#chat

use crate::error::{CrewError, Result};
use crate::llm::{CompletionClient, CompletionRequest};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    #[serde(default)]
    content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    refusal: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChatMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

pub struct OpenAiClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl OpenAiClient {
    pub fn new(api_key: String, model: String, base_url: String, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CrewError::LlmRequest(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key,
            model,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn build_body(&self, request: &CompletionRequest) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: Some(request.system.clone()),
                    refusal: None,
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: Some(request.prompt.clone()),
                    refusal: None,
                },
            ],
            temperature: request.temperature,
        }
    }

    fn extract_text(response: ChatCompletionResponse) -> Result<String> {
        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| CrewError::LlmRequest("No choices returned from chat API".to_string()))?;

        if let Some(refusal) = choice.message.refusal {
            return Err(CrewError::LlmRequest(format!("Model refused: {}", refusal)));
        }

        choice.message.content.ok_or_else(|| {
            CrewError::LlmRequest(format!(
                "Chat API returned no text content (finish_reason: {})",
                choice.finish_reason.as_deref().unwrap_or("unknown")
            ))
        })
    }
}

impl CompletionClient for OpenAiClient {
    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = self.build_body(request);

        debug!(
            "Requesting chat completion from {} for {} chars",
            self.model,
            request.prompt.len()
        );

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| CrewError::LlmRequest(format!("Failed to send chat API request: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(CrewError::LlmRequest(format!(
                "Chat API request failed with status {}: {}",
                status, error_text
            )));
        }

        let parsed: ChatCompletionResponse = response.json().await.map_err(|e| {
            CrewError::LlmRequest(format!("Failed to parse chat API response: {}", e))
        })?;

        Self::extract_text(parsed)
    }
}
