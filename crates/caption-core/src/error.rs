//! Error Types

use thiserror::Error;

/// Result type alias for caption operations
pub type Result<T> = std::result::Result<T, CaptionError>;

/// Caption generation error types
#[derive(Error, Debug)]
pub enum CaptionError {
    /// LLM provider returned an error
    #[error("Provider error: {0}")]
    Provider(String),

    /// Provider unavailable or not responding
    #[error("Provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// Request rejected before reaching the provider
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}
