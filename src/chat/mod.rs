pub mod gemini;
pub mod model;
pub mod relay;
pub mod types;

pub use gemini::GeminiClient;
pub use model::{ChatError, ChatModel, Generation, GenerationRequest, TextStream, Turn};
pub use relay::{relay, StreamFrame};
pub use types::{ChatMessage, ChatRequest, ChatResponse, Role};
