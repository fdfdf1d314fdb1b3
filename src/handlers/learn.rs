use axum::extract::State;
use axum::Json;
use serde_json::Value;

use crate::error::ApiResult;
use crate::extract::ApiJson;
use crate::learn::{self, LearnError, LearnRequest};
use crate::state::AppState;

/// POST /learn - Generate a mini-course for a topic
pub async fn learn(State(state): State<AppState>, ApiJson(payload): ApiJson<LearnRequest>) -> ApiResult<Value> {
    let topic = payload.topic.clone().unwrap_or_default();
    if topic.trim().is_empty() {
        return Err(LearnError::MissingTopic.into());
    }

    let model = state.chat()?;
    let course = learn::generate_course(
        model.as_ref(),
        &state.config.gemini.learn_model,
        &topic,
        payload.level(),
    )
    .await?;

    Ok(Json(course))
}
