// Mini-course generator.
//
// One prompt to the chat model asks for a strict-JSON course outline. The
// reply is unfenced, shape-checked and its resource links are filtered down to
// a small set of reputable hosts before it is returned.

pub mod prompt;
pub mod sanitize;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::chat::{ChatError, ChatModel, GenerationRequest};

pub use prompt::build_prompt;
pub use sanitize::{canonicalize_url, sanitize_resources, strip_fences};

pub const LEARN_TEMPERATURE: f64 = 0.6;
pub const DEFAULT_LEVEL: &str = "beginner";

/// Body of POST /learn. The level is free text and only steers the prompt.
#[derive(Debug, Clone, Deserialize)]
pub struct LearnRequest {
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(default)]
    pub level: Option<String>,
}

impl LearnRequest {
    pub fn level(&self) -> &str {
        self.level
            .as_deref()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .unwrap_or(DEFAULT_LEVEL)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    pub title: String,
    pub url: String,
}

#[derive(Debug, Error)]
pub enum LearnError {
    #[error("Missing 'topic'")]
    MissingTopic,

    #[error("Gemini request failed: {0}")]
    Upstream(#[from] ChatError),

    #[error("No content returned from Gemini")]
    EmptyContent,

    #[error("Failed to parse Gemini JSON: {0}")]
    Parse(String),

    #[error("Invalid MiniCourse structure")]
    InvalidStructure,
}

/// Ask the model for a course on `topic` and return the cleaned result
pub async fn generate_course(
    model: &dyn ChatModel,
    model_name: &str,
    topic: &str,
    level: &str,
) -> Result<Value, LearnError> {
    let topic = topic.trim();
    if topic.is_empty() {
        return Err(LearnError::MissingTopic);
    }

    let request = GenerationRequest::prompt(model_name, build_prompt(topic, level), LEARN_TEMPERATURE);
    let generation = model.generate(&request).await?;
    if generation.text.trim().is_empty() {
        return Err(LearnError::EmptyContent);
    }

    debug!(topic, level, "parsing generated course");
    parse_course(&generation.text)
}

/// Parse raw model text into a course object, sanitizing its resources.
///
/// Only `title` and `lessons` are checked; every other key is returned as the
/// model wrote it.
pub fn parse_course(text: &str) -> Result<Value, LearnError> {
    let mut course: Value =
        serde_json::from_str(strip_fences(text)).map_err(|e| LearnError::Parse(e.to_string()))?;

    let has_title = course
        .get("title")
        .is_some_and(|t| t.as_str().map_or(!t.is_null(), |s| !s.is_empty()));
    let has_lessons = course.get("lessons").is_some_and(Value::is_array);
    let Some(object) = course.as_object_mut().filter(|_| has_title && has_lessons) else {
        return Err(LearnError::InvalidStructure);
    };

    let resources = match object.remove("resources") {
        Some(Value::Array(items)) => items,
        _ => Vec::new(),
    };
    let cleaned = serde_json::to_value(sanitize_resources(&resources))
        .map_err(|e| LearnError::Parse(e.to_string()))?;
    object.insert("resources".to_string(), cleaned);

    Ok(course)
}
