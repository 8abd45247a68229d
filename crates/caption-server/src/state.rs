//! Application State

use std::sync::Arc;

use caption_core::provider::{GenerationOptions, TextProvider};

use crate::storage::Database;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Text-generation provider (Azure OpenAI in production)
    pub provider: Arc<dyn TextProvider>,

    /// SQLite database behind a connection pool
    pub db: Arc<Database>,

    /// Sampling knobs for caption generation
    pub generation: GenerationOptions,
}
