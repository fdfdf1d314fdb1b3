use axum::extract::State;
use axum::response::Response;
use axum::Json;
use tracing::warn;

use crate::chat::{relay, ChatRequest, ChatResponse};
use crate::error::{ApiError, ApiResult};
use crate::extract::ApiJson;
use crate::state::AppState;

/// POST /gemini/chat - One blocking generation
pub async fn chat(State(state): State<AppState>, ApiJson(payload): ApiJson<ChatRequest>) -> ApiResult<ChatResponse> {
    let model = state.chat()?;
    let request = payload.into_generation(&state.config.gemini.default_model);

    let generation = model.generate(&request).await.map_err(|e| {
        warn!(error = %e, model = %request.model, "chat generation failed");
        ApiError::internal_server_error(format!("Gemini error: {}", e))
    })?;

    Ok(Json(ChatResponse {
        text: generation.text,
        model: Some(request.model),
        finish_reason: generation.finish_reason,
    }))
}

/// POST /gemini/chat/stream - Incremental text as server-sent events
pub async fn chat_stream(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<ChatRequest>,
) -> Result<Response, ApiError> {
    let model = state.chat()?;
    let request = payload.into_generation(&state.config.gemini.default_model);
    Ok(relay(model, request))
}
