//! Caption Service HTTP Server
//!
//! Axum-based server proxying caption generation to Azure OpenAI,
//! gated behind licenses managed by payment-provider webhooks.

mod handlers;
mod state;
mod storage;

use std::path::Path;
use std::sync::Arc;

use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use caption_core::provider::{GenerationOptions, TextProvider};
use caption_runtime::AzureOpenAiProvider;

use crate::handlers::router;
use crate::state::AppState;
use crate::storage::Database;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load environment
    dotenvy::dotenv().ok();

    // Initialize the text-generation provider
    let provider = Arc::new(AzureOpenAiProvider::from_env()?);

    match provider.health_check().await {
        Ok(true) => tracing::info!("✓ Connected to Azure OpenAI"),
        Ok(false) | Err(_) => {
            tracing::warn!("⚠ Azure OpenAI not reachable - generation requests will fail");
            tracing::warn!("  Check AZURE_OPENAI_ENDPOINT and AZURE_OPENAI_API_KEY in .env");
        }
    }

    // Open the database; tables come from embedded migrations.
    let db_path = std::env::var("CAPTIONS_DB").unwrap_or_else(|_| "captions.db".into());
    let db = Arc::new(Database::open(Path::new(&db_path)).await?);

    // Build application state
    let state = AppState {
        provider,
        db,
        generation: GenerationOptions::from_env(),
    };

    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build router
    let app = router(state).layer(cors).layer(TraceLayer::new_for_http());

    // Start server
    let addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Caption service running on http://{}", addr);
    tracing::info!("");
    tracing::info!("Endpoints:");
    tracing::info!("  GET  /         - Liveness check");
    tracing::info!("  POST /generate - Generate a caption (X-License-Key header)");
    tracing::info!("  POST /webhook  - Payment provider lifecycle events");
    tracing::info!("");

    axum::serve(listener, app).await?;

    Ok(())
}
