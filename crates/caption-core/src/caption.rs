//! Caption Generation
//!
//! Builds the provider prompt from a caption request and runs the
//! single-shot completion. No retries: a provider failure is terminal
//! for the request.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{CaptionError, Result};
use crate::message::Message;
use crate::provider::{GenerationOptions, TextProvider};

/// A request for one social media caption
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CaptionRequest {
    /// What the caption is about
    pub topic: String,

    /// Desired voice, e.g. "witty" or "formal"
    pub tone: String,

    /// Target platform, e.g. "instagram"
    pub channel: String,
}

impl CaptionRequest {
    /// All three fields are required and must be non-empty.
    pub fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("topic", &self.topic),
            ("tone", &self.tone),
            ("channel", &self.channel),
        ] {
            if value.trim().is_empty() {
                return Err(CaptionError::InvalidRequest(format!(
                    "{field} must not be empty"
                )));
            }
        }
        Ok(())
    }

    /// Build the model prompt. Caller text is embedded verbatim.
    pub fn to_prompt(&self) -> String {
        format!(
            "Generate a social media caption for {} on the topic \"{}\" in a {} tone. \
             Include relevant hashtags.",
            self.channel, self.topic, self.tone
        )
    }
}

/// Orchestrates the provider call for a caption request
pub struct CaptionGenerator {
    provider: Arc<dyn TextProvider>,
    options: GenerationOptions,
}

impl CaptionGenerator {
    /// Create a new generator
    pub fn new(provider: Arc<dyn TextProvider>, options: GenerationOptions) -> Self {
        Self { provider, options }
    }

    /// Generate a caption, trimming surrounding whitespace from the
    /// provider's response.
    pub async fn generate(&self, request: &CaptionRequest) -> Result<String> {
        request.validate()?;

        let messages = vec![Message::user(request.to_prompt())];
        let completion = self.provider.complete(&messages, &self.options).await?;
        let caption = completion.content.trim().to_string();

        tracing::debug!(
            provider = %self.provider.name(),
            model = %completion.model,
            chars = caption.len(),
            "Caption generated"
        );

        Ok(caption)
    }
}
