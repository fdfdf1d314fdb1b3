use serde::{Deserialize, Serialize};

use super::model::{GenerationRequest, Turn};

pub const DEFAULT_SYSTEM_INSTRUCTION: &str = "You are a financial advisor in investing. Your name is Honk.";
pub const DEFAULT_TEMPERATURE: f64 = 0.8;
pub const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 1024;

/// Conversation role as understood by the model provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

impl Role {
    /// Assistant-like names collapse to `Model`, anything else is the user
    pub fn normalize(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "assistant" | "model" | "ai" | "bot" => Role::Model,
            _ => Role::User,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Model => "model",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

/// Body of POST /gemini/chat and /gemini/chat/stream
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
    pub model: Option<String>,
    #[serde(default = "default_system_instruction")]
    pub system_instruction: Option<String>,
    #[serde(default = "default_temperature")]
    pub temperature: Option<f64>,
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: Option<u32>,
}

impl ChatRequest {
    pub fn into_generation(self, default_model: &str) -> GenerationRequest {
        let turns = self
            .messages
            .into_iter()
            .map(|m| Turn { role: Role::normalize(&m.role), text: m.content })
            .collect();

        GenerationRequest {
            model: self.model.unwrap_or_else(|| default_model.to_string()),
            turns,
            system_instruction: self.system_instruction,
            temperature: self.temperature,
            max_output_tokens: self.max_output_tokens,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub text: String,
    pub model: Option<String>,
    pub finish_reason: Option<String>,
}

fn default_system_instruction() -> Option<String> {
    Some(DEFAULT_SYSTEM_INSTRUCTION.to_string())
}

fn default_temperature() -> Option<f64> {
    Some(DEFAULT_TEMPERATURE)
}

fn default_max_output_tokens() -> Option<u32> {
    Some(DEFAULT_MAX_OUTPUT_TOKENS)
}
