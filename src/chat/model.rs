use async_trait::async_trait;
use futures::stream::BoxStream;
use thiserror::Error;

use super::types::Role;

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("{status} {message}")]
    Upstream { status: u16, message: String },

    #[error("unexpected response: {0}")]
    Decode(String),

    #[error("stream error: {0}")]
    Stream(String),

    #[error(transparent)]
    Transport(#[from] reqwest::Error),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Turn {
    pub role: Role,
    pub text: String,
}

/// Provider-neutral generation input
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub model: String,
    pub turns: Vec<Turn>,
    pub system_instruction: Option<String>,
    pub temperature: Option<f64>,
    pub max_output_tokens: Option<u32>,
}

impl GenerationRequest {
    /// One user turn and nothing else
    pub fn prompt(model: impl Into<String>, text: impl Into<String>, temperature: f64) -> Self {
        Self {
            model: model.into(),
            turns: vec![Turn { role: Role::User, text: text.into() }],
            system_instruction: None,
            temperature: Some(temperature),
            max_output_tokens: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Generation {
    pub text: String,
    pub finish_reason: Option<String>,
}

/// Ordered text increments from an upstream stream
pub type TextStream = BoxStream<'static, Result<String, ChatError>>;

/// Blocking and incremental generation against a model provider
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> Result<Generation, ChatError>;

    async fn generate_stream(&self, request: &GenerationRequest) -> Result<TextStream, ChatError>;
}
