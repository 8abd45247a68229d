//! # caption-core
//!
//! Core caption-generation logic: a provider-agnostic text-generation
//! abstraction and the prompt/orchestration layer on top of it.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │                 CaptionGenerator                      │
//! │  ┌────────────────┐        ┌──────────────────────┐  │
//! │  │ CaptionRequest │───────▶│   TextProvider       │  │
//! │  │  (prompt)      │        │   (Strategy)         │  │
//! │  └────────────────┘        └──────────────────────┘  │
//! └──────────────────────────────────────────────────────┘
//! ```
//!
//! The `TextProvider` trait decouples the generator from the concrete
//! LLM backend; `caption-runtime` supplies the production implementation.

pub mod caption;
pub mod error;
pub mod message;
pub mod provider;

pub use caption::{CaptionGenerator, CaptionRequest};
pub use error::{CaptionError, Result};
pub use message::{Message, Role};
pub use provider::{Completion, GenerationOptions, TextProvider, TokenUsage};
