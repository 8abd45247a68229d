//! # caption-runtime
//!
//! Concrete `TextProvider` implementations for the caption service.
//!
//! ## Providers
//!
//! - **Azure OpenAI** (default): chat completions against an Azure
//!   OpenAI deployment, plain request/response JSON over reqwest.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use caption_runtime::AzureOpenAiProvider;
//!
//! let provider = AzureOpenAiProvider::from_env()?;
//! let completion = provider.complete(&messages, &options).await?;
//! ```

pub mod azure;

pub use azure::{AzureOpenAiConfig, AzureOpenAiProvider};

// Re-export core types for convenience
pub use caption_core::{
    CaptionError, Completion, GenerationOptions, Message, Result, Role, TextProvider,
};
