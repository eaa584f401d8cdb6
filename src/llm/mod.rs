// file: src/llm/mod.rs
// description: completion client abstraction and provider selection
// reference: provider/model naming as used by hosted LLM gateways

mod gemini;
mod openai;

pub use gemini::GeminiClient;
pub use openai::OpenAiClient;

use crate::config::ModelConfig;
use crate::error::{CrewError, Result};
use std::future::Future;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Provider {
    #[default]
    Gemini,
    Groq,
    OpenAi,
}

impl Provider {
    pub fn api_key_env(&self) -> &'static str {
        match self {
            Provider::Gemini => "GEMINI_API_KEY",
            Provider::Groq => "GROQ_API_KEY",
            Provider::OpenAi => "OPENAI_API_KEY",
        }
    }

    pub fn default_base_url(&self) -> &'static str {
        match self {
            Provider::Gemini => "https://generativelanguage.googleapis.com",
            Provider::Groq => "https://api.groq.com/openai/v1",
            Provider::OpenAi => "https://api.openai.com/v1",
        }
    }

    /// Provider of a `provider/model` name; falls back to Gemini when the prefix is unknown.
    pub fn from_model(name: &str) -> Self {
        ModelId::parse(name)
            .map(|id| id.provider)
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelId {
    pub provider: Provider,
    pub model: String,
}

impl ModelId {
    /// `gemini/gemini-1.5-flash`, `groq/openai/gpt-oss-120b`, or a bare Gemini model name.
    pub fn parse(name: &str) -> Result<Self> {
        let name = name.trim();
        if name.is_empty() {
            return Err(CrewError::Config("model name is empty".to_string()));
        }

        let Some((prefix, model)) = name.split_once('/') else {
            return Ok(Self {
                provider: Provider::Gemini,
                model: name.to_string(),
            });
        };

        let provider = match prefix.to_ascii_lowercase().as_str() {
            "gemini" | "google" => Provider::Gemini,
            "groq" => Provider::Groq,
            "openai" => Provider::OpenAi,
            other => {
                return Err(CrewError::Config(format!(
                    "unsupported model provider '{}' in '{}'",
                    other, name
                )));
            }
        };

        if model.is_empty() {
            return Err(CrewError::Config(format!("model name missing in '{}'", name)));
        }

        Ok(Self {
            provider,
            model: model.to_string(),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub system: String,
    pub prompt: String,
    pub temperature: f32,
}

pub trait CompletionClient: Send + Sync {
    fn model(&self) -> &str;

    fn complete(
        &self,
        request: &CompletionRequest,
    ) -> impl Future<Output = Result<String>> + Send;
}

/// Client for whichever provider the configured model name selects.
pub enum LlmClient {
    Gemini(GeminiClient),
    OpenAi(OpenAiClient),
}

impl LlmClient {
    pub fn from_config(config: &ModelConfig) -> Result<Self> {
        let id = ModelId::parse(&config.name)?;

        let api_key = config.api_key.clone().ok_or_else(|| {
            CrewError::Config(format!(
                "no API key for {}; set {} or model.api_key",
                config.name,
                id.provider.api_key_env()
            ))
        })?;

        let base_url = config
            .base_url
            .clone()
            .unwrap_or_else(|| id.provider.default_base_url().to_string());
        let timeout = Duration::from_secs(config.timeout_secs);

        match id.provider {
            Provider::Gemini => Ok(LlmClient::Gemini(GeminiClient::new(
                api_key, id.model, base_url, timeout,
            )?)),
            Provider::Groq | Provider::OpenAi => Ok(LlmClient::OpenAi(OpenAiClient::new(
                api_key, id.model, base_url, timeout,
            )?)),
        }
    }
}

impl CompletionClient for LlmClient {
    fn model(&self) -> &str {
        match self {
            LlmClient::Gemini(client) => client.model(),
            LlmClient::OpenAi(client) => client.model(),
        }
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        match self {
            LlmClient::Gemini(client) => client.complete(request).await,
            LlmClient::OpenAi(client) => client.complete(request).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_id_with_provider_prefix() {
        let id = ModelId::parse("gemini/gemini-1.5-flash").unwrap();
        assert_eq!(id.provider, Provider::Gemini);
        assert_eq!(id.model, "gemini-1.5-flash");
    }

    #[test]
    fn test_model_id_keeps_nested_model_path() {
        let id = ModelId::parse("groq/openai/gpt-oss-120b").unwrap();
        assert_eq!(id.provider, Provider::Groq);
        assert_eq!(id.model, "openai/gpt-oss-120b");
    }

    #[test]
    fn test_bare_model_is_gemini() {
        let id = ModelId::parse("gemini-1.5-pro").unwrap();
        assert_eq!(id.provider, Provider::Gemini);
    }

    #[test]
    fn test_unknown_provider_rejected() {
        assert!(ModelId::parse("mistral/large").is_err());
        assert!(ModelId::parse("").is_err());
        assert!(ModelId::parse("groq/").is_err());
        assert_eq!(Provider::from_model("mistral/large"), Provider::Gemini);
    }

    #[test]
    fn test_client_requires_api_key() {
        let config = ModelConfig::default();
        assert!(LlmClient::from_config(&config).is_err());
    }

    #[test]
    fn test_client_selected_by_provider() {
        let config = ModelConfig {
            name: "groq/llama-3.3-70b-versatile".to_string(),
            api_key: Some("test-key".to_string()),
            ..ModelConfig::default()
        };
        let client = LlmClient::from_config(&config).unwrap();
        assert!(matches!(client, LlmClient::OpenAi(_)));
        assert_eq!(client.model(), "llama-3.3-70b-versatile");
    }
}
