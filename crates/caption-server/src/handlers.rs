//! HTTP Handlers

use std::collections::HashMap;

use axum::{
    Json, Router,
    extract::{Form, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
};
use chrono::Utc;
use serde::Serialize;
use serde_json::{Value, json};

use caption_core::{
    caption::{CaptionGenerator, CaptionRequest},
    error::CaptionError,
};
use caption_licensing::{
    LicenseError, LicenseKey, LifecycleManager, LifecycleOutcome, WebhookEvent,
};

use crate::state::AppState;

/// Header carrying the caller's license key
const LICENSE_KEY_HEADER: &str = "X-License-Key";

// ============================================================================
// Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub caption: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

type HandlerError = (StatusCode, Json<ErrorResponse>);

fn error_response(status: StatusCode, code: &str, error: impl Into<String>) -> HandlerError {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
            code: code.into(),
        }),
    )
}

fn license_error(e: LicenseError) -> HandlerError {
    match e {
        LicenseError::AccessDenied => {
            error_response(StatusCode::FORBIDDEN, "INVALID_LICENSE", e.to_string())
        }
        LicenseError::MalformedEvent(_) => {
            error_response(StatusCode::BAD_REQUEST, "MALFORMED_EVENT", e.to_string())
        }
        LicenseError::Storage(_) => {
            tracing::error!("License storage error: {}", e);
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "STORAGE_ERROR",
                e.to_string(),
            )
        }
    }
}

fn generation_error(e: CaptionError) -> HandlerError {
    match e {
        CaptionError::InvalidRequest(_) => error_response(
            StatusCode::UNPROCESSABLE_ENTITY,
            "INVALID_REQUEST",
            e.to_string(),
        ),
        // Provider failure detail is passed through untouched.
        other => {
            tracing::error!("Caption generation failed: {}", other);
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "GENERATION_FAILED",
                other.to_string(),
            )
        }
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// Service liveness probe
pub async fn root() -> Json<Value> {
    Json(json!({"message": "Service is up!"}))
}

/// Gated caption generation
pub async fn generate(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<CaptionRequest>,
) -> Result<Json<GenerateResponse>, HandlerError> {
    // A missing header is reported exactly like an unknown or expired
    // key: the caller learns nothing about whether the key exists.
    let key = headers
        .get(LICENSE_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(LicenseKey::new)
        .ok_or_else(|| license_error(LicenseError::AccessDenied))?;

    let manager = LifecycleManager::new(state.db.clone());
    manager
        .validate(&key, Utc::now())
        .await
        .map_err(license_error)?;

    let generator = CaptionGenerator::new(state.provider.clone(), state.generation.clone());
    let caption = generator
        .generate(&payload)
        .await
        .map_err(generation_error)?;

    state
        .db
        .insert_caption(
            &payload.topic,
            &payload.tone,
            &payload.channel,
            &caption,
            Utc::now(),
        )
        .await
        .map_err(|e| {
            tracing::error!("Caption insert failed: {}", e);
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "STORAGE_ERROR",
                e.to_string(),
            )
        })?;

    Ok(Json(GenerateResponse { caption }))
}

/// Payment-provider webhook ingest
pub async fn webhook(
    State(state): State<AppState>,
    Form(form): Form<HashMap<String, String>>,
) -> Result<Json<Value>, HandlerError> {
    let event = WebhookEvent::from_form(&form).map_err(license_error)?;

    let manager = LifecycleManager::new(state.db.clone());
    let outcome = manager
        .apply(event, Utc::now())
        .await
        .map_err(license_error)?;

    Ok(Json(outcome_body(&outcome)))
}

fn outcome_body(outcome: &LifecycleOutcome) -> Value {
    match outcome {
        LifecycleOutcome::Renewed { active_until } => {
            json!({"status": "ok", "active_until": active_until.to_rfc3339()})
        }
        LifecycleOutcome::Cancelled => json!({"status": "cancelled"}),
        LifecycleOutcome::Ignored { event_name } => {
            json!({"status": format!("ignored event {event_name}")})
        }
    }
}

/// Build the service router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/generate", post(generate))
        .route("/webhook", post(webhook))
        .with_state(state)
}
