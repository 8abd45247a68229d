//! Text Provider Strategy
//!
//! Defines a common interface for text-generation providers so the
//! caption generator works with any backend without code changes.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use caption_core::provider::{TextProvider, GenerationOptions};
//!
//! let completion = provider.complete(&messages, &options).await?;
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::message::Message;

/// Sampling knobs for a single generation call
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GenerationOptions {
    /// Maximum tokens to generate
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Temperature for sampling (0.0 = deterministic, 1.0 = creative)
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

fn default_max_tokens() -> u32 {
    150
}
fn default_temperature() -> f32 {
    0.7
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
        }
    }
}

impl GenerationOptions {
    /// Create from environment variables, falling back to the defaults
    pub fn from_env() -> Self {
        let max_tokens = std::env::var("CAPTION_MAX_TOKENS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or_else(default_max_tokens);
        let temperature = std::env::var("CAPTION_TEMPERATURE")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or_else(default_temperature);

        Self {
            max_tokens,
            temperature,
        }
    }
}

/// Response from a completion call
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Completion {
    /// The generated text
    pub content: String,

    /// Model (deployment) that generated this response
    pub model: String,

    /// Token usage statistics (if reported by the provider)
    pub usage: Option<TokenUsage>,
}

/// Token usage statistics
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Strategy trait for text-generation providers
///
/// Implement this trait to add support for new backends. The caption
/// generator works exclusively through this interface.
#[async_trait]
pub trait TextProvider: Send + Sync {
    /// Short provider name for logs
    fn name(&self) -> &str;

    /// Check if the provider is reachable and configured correctly
    async fn health_check(&self) -> Result<bool>;

    /// Generate a completion from messages
    async fn complete(
        &self,
        messages: &[Message],
        options: &GenerationOptions,
    ) -> Result<Completion>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generation_options_defaults() {
        let opts = GenerationOptions::default();
        assert_eq!(opts.max_tokens, 150);
        assert_eq!(opts.temperature, 0.7);
    }
}
