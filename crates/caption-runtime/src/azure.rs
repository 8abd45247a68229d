//! Azure OpenAI Provider
//!
//! Implementation of `TextProvider` for the Azure OpenAI
//! chat-completions REST API.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use caption_core::{
    error::{CaptionError, Result},
    message::Message,
    provider::{Completion, GenerationOptions, TextProvider, TokenUsage},
};

/// Azure OpenAI provider configuration
#[derive(Clone, Debug)]
pub struct AzureOpenAiConfig {
    /// Resource endpoint, e.g. `https://my-resource.openai.azure.com`
    pub endpoint: String,

    /// API key for the resource
    pub api_key: String,

    /// `api-version` query parameter
    pub api_version: String,

    /// Deployment (model) name
    pub deployment: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl AzureOpenAiConfig {
    /// Create from environment variables
    pub fn from_env() -> Result<Self> {
        let endpoint = std::env::var("AZURE_OPENAI_ENDPOINT")
            .map_err(|_| CaptionError::Config("AZURE_OPENAI_ENDPOINT not set".into()))?;
        let api_key = std::env::var("AZURE_OPENAI_API_KEY")
            .map_err(|_| CaptionError::Config("AZURE_OPENAI_API_KEY not set".into()))?;
        let api_version =
            std::env::var("AZURE_OPENAI_API_VERSION").unwrap_or_else(|_| "2024-02-01".into());
        let deployment = std::env::var("AZURE_OPENAI_API_DEPLOYMENT_NAME")
            .map_err(|_| CaptionError::Config("AZURE_OPENAI_API_DEPLOYMENT_NAME not set".into()))?;
        let timeout_secs = std::env::var("AZURE_OPENAI_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(120);

        Ok(Self {
            endpoint,
            api_key,
            api_version,
            deployment,
            timeout_secs,
        })
    }
}

/// Azure OpenAI text provider
pub struct AzureOpenAiProvider {
    client: reqwest::Client,
    config: AzureOpenAiConfig,
}

impl AzureOpenAiProvider {
    /// Create from configuration
    pub fn from_config(config: AzureOpenAiConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| CaptionError::Config(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// Create from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_config(AzureOpenAiConfig::from_env()?)
    }

    fn chat_url(&self) -> String {
        format!(
            "{}/openai/deployments/{}/chat/completions?api-version={}",
            self.config.endpoint.trim_end_matches('/'),
            self.config.deployment,
            self.config.api_version
        )
    }

    fn models_url(&self) -> String {
        format!(
            "{}/openai/models?api-version={}",
            self.config.endpoint.trim_end_matches('/'),
            self.config.api_version
        )
    }
}

// Wire types for the chat-completions endpoint.

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    messages: &'a [Message],
    max_tokens: u32,
    temperature: f32,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
    model: Option<String>,
    usage: Option<ChatUsage>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ChatUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}

#[async_trait]
impl TextProvider for AzureOpenAiProvider {
    fn name(&self) -> &str {
        "azure-openai"
    }

    async fn health_check(&self) -> Result<bool> {
        let probe = self
            .client
            .get(self.models_url())
            .header("api-key", &self.config.api_key)
            .send()
            .await;

        match probe {
            Ok(response) => Ok(response.status().is_success()),
            Err(e) => {
                tracing::warn!("Azure OpenAI health check failed: {}", e);
                Ok(false)
            }
        }
    }

    async fn complete(
        &self,
        messages: &[Message],
        options: &GenerationOptions,
    ) -> Result<Completion> {
        let body = ChatCompletionRequest {
            messages,
            max_tokens: options.max_tokens,
            temperature: options.temperature,
        };

        let response = self
            .client
            .post(self.chat_url())
            .header("api-key", &self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| CaptionError::ProviderUnavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(CaptionError::Provider(format!("HTTP {status}: {detail}")));
        }

        let parsed: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| CaptionError::Provider(e.to_string()))?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| CaptionError::Provider("no completion choices returned".into()))?;

        Ok(Completion {
            content,
            model: parsed
                .model
                .unwrap_or_else(|| self.config.deployment.clone()),
            usage: parsed.usage.map(|u| TokenUsage {
                prompt_tokens: u.prompt_tokens,
                completion_tokens: u.completion_tokens,
                total_tokens: u.total_tokens,
            }),
        })
    }
}
