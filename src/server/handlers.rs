use std::sync::Arc;

use axum::extract::State;
use axum::response::Json;
use chrono::SecondsFormat;
use serde::Serialize;

use super::response::JsonBody;
use super::AppState;
use crate::classify::ClassifiedError;
use crate::error_code::ErrorCode;
use crate::types::{EnhancePromptResponse, GenerateResponse};
use crate::validation::{validate_enhance_request, validate_generate_request};

pub async fn generate(
    State(state): State<Arc<AppState>>,
    JsonBody(body): JsonBody,
) -> Result<Json<GenerateResponse>, ClassifiedError> {
    let request = validate_generate_request(&body).map_err(|e| e.with_phase("validate-request"))?;
    let outputs = state.pipeline.generate(request).await?;
    Ok(Json(GenerateResponse { outputs }))
}

pub async fn enhance_prompt(
    State(state): State<Arc<AppState>>,
    JsonBody(body): JsonBody,
) -> Result<Json<EnhancePromptResponse>, ClassifiedError> {
    let prompt = validate_enhance_request(&body).map_err(|e| e.with_phase("validate-request"))?;
    let enhanced_prompt = state.enhancer.enhance(&prompt).await?;
    Ok(Json(EnhancePromptResponse { enhanced_prompt }))
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: String,
    /// Seconds since the server started.
    pub uptime: f64,
}

pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        timestamp: chrono::Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        uptime: state.started.elapsed().as_secs_f64(),
    })
}

/// Unknown `/api/*` routes answer in the API error shape.
pub async fn api_not_found() -> ClassifiedError {
    ClassifiedError::new(ErrorCode::NotFound, "Not found").with_phase("route")
}
