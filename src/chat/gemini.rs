// Gemini REST client.
//
// Blocking generation goes through `:generateContent`; incremental generation
// goes through `:streamGenerateContent?alt=sse` and is parsed with
// reqwest-eventsource. Each SSE message carries a complete
// GenerateContentResponse whose text parts are the next increment.

use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use reqwest_eventsource::{Event, EventSource, RequestBuilderExt};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use super::model::{ChatError, ChatModel, Generation, GenerationRequest, TextStream};

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentBody<'a> {
    contents: Vec<ContentBody<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<InstructionBody<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct ContentBody<'a> {
    role: &'static str,
    parts: Vec<PartBody<'a>>,
}

#[derive(Debug, Serialize)]
struct InstructionBody<'a> {
    parts: Vec<PartBody<'a>>,
}

#[derive(Debug, Serialize)]
struct PartBody<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
}

impl<'a> GenerateContentBody<'a> {
    fn from_request(request: &'a GenerationRequest) -> Self {
        Self {
            contents: request
                .turns
                .iter()
                .map(|turn| ContentBody {
                    role: turn.role.as_str(),
                    parts: vec![PartBody { text: &turn.text }],
                })
                .collect(),
            system_instruction: request
                .system_instruction
                .as_deref()
                .map(|text| InstructionBody { parts: vec![PartBody { text }] }),
            generation_config: GenerationConfig {
                temperature: request.temperature,
                max_output_tokens: request.max_output_tokens,
            },
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    error: Option<ErrorBody>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    code: Option<u16>,
    message: Option<String>,
}

impl GenerateContentResponse {
    /// Concatenated text parts of the first candidate
    pub(crate) fn text(&self) -> String {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|content| content.parts.iter().filter_map(|p| p.text.as_deref()).collect())
            .unwrap_or_default()
    }

    pub(crate) fn finish_reason(&self) -> Option<String> {
        self.candidates.first().and_then(|c| c.finish_reason.clone())
    }
}

/// Parse one streamed chunk into its text increment
pub(crate) fn parse_chunk(data: &str) -> Result<String, ChatError> {
    let chunk: GenerateContentResponse =
        serde_json::from_str(data).map_err(|e| ChatError::Decode(e.to_string()))?;
    if let Some(error) = chunk.error {
        return Err(ChatError::Upstream {
            status: error.code.unwrap_or(500),
            message: error.message.unwrap_or_default(),
        });
    }
    Ok(chunk.text())
}

/// `error.message` from a Google API error body, or the raw body
pub(crate) fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("error")?.get("message")?.as_str().map(str::to_string))
        .unwrap_or_else(|| body.to_string())
}

// ---------------------------------------------------------------------------
// GeminiClient
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl GeminiClient {
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> Result<Self, ChatError> {
        // Streams can outlive a request timeout, so only connecting is bounded
        let http = reqwest::Client::builder().connect_timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    fn endpoint(&self, model: &str, method: &str) -> String {
        format!("{}/v1beta/models/{}:{}", self.base_url, model, method)
    }
}

#[async_trait]
impl ChatModel for GeminiClient {
    async fn generate(&self, request: &GenerationRequest) -> Result<Generation, ChatError> {
        let body = GenerateContentBody::from_request(request);
        let response = self
            .http
            .post(self.endpoint(&request.model, "generateContent"))
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(ChatError::Upstream {
                status: status.as_u16(),
                message: error_message(&text),
            });
        }

        let parsed: GenerateContentResponse =
            serde_json::from_str(&text).map_err(|e| ChatError::Decode(e.to_string()))?;
        Ok(Generation {
            text: parsed.text(),
            finish_reason: parsed.finish_reason(),
        })
    }

    async fn generate_stream(&self, request: &GenerationRequest) -> Result<TextStream, ChatError> {
        let body = GenerateContentBody::from_request(request);
        let es = self
            .http
            .post(self.endpoint(&request.model, "streamGenerateContent"))
            .query(&[("alt", "sse")])
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .eventsource()
            .map_err(|e| ChatError::Stream(e.to_string()))?;

        Ok(text_stream(es))
    }
}

/// Adapt an event source into text increments, ending on the first error or
/// on upstream exhaustion. The event source never reconnects.
fn text_stream(es: EventSource) -> TextStream {
    futures::stream::unfold(Some(es), |state| async move {
        let mut es = state?;
        loop {
            match es.next().await {
                Some(Ok(Event::Open)) => debug!("gemini stream opened"),
                Some(Ok(Event::Message(msg))) => {
                    return match parse_chunk(&msg.data) {
                        Ok(text) => Some((Ok(text), Some(es))),
                        Err(e) => {
                            es.close();
                            Some((Err(e), None))
                        }
                    };
                }
                Some(Err(reqwest_eventsource::Error::StreamEnded)) | None => {
                    es.close();
                    return None;
                }
                Some(Err(err)) => {
                    es.close();
                    warn!(?err, "gemini stream error");
                    return Some((Err(stream_error(err).await), None));
                }
            }
        }
    })
    .boxed()
}

async fn stream_error(err: reqwest_eventsource::Error) -> ChatError {
    match err {
        reqwest_eventsource::Error::InvalidStatusCode(status, response) => {
            let body = response.text().await.unwrap_or_default();
            ChatError::Upstream {
                status: status.as_u16(),
                message: error_message(&body),
            }
        }
        reqwest_eventsource::Error::Transport(e) => ChatError::Transport(e),
        other => ChatError::Stream(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::model::Turn;
    use crate::chat::types::Role;
    use serde_json::json;

    #[test]
    fn request_body_uses_gemini_field_names() {
        let request = GenerationRequest {
            model: "gemini-2.5-flash".to_string(),
            turns: vec![
                Turn { role: Role::User, text: "hi".to_string() },
                Turn { role: Role::Model, text: "honk".to_string() },
            ],
            system_instruction: Some("be brief".to_string()),
            temperature: Some(0.5),
            max_output_tokens: None,
        };
        let body = serde_json::to_value(GenerateContentBody::from_request(&request)).unwrap();

        assert_eq!(
            body,
            json!({
                "contents": [
                    {"role": "user", "parts": [{"text": "hi"}]},
                    {"role": "model", "parts": [{"text": "honk"}]}
                ],
                "systemInstruction": {"parts": [{"text": "be brief"}]},
                "generationConfig": {"temperature": 0.5}
            })
        );
    }

    #[test]
    fn text_joins_parts_of_first_candidate() {
        let parsed: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [
                {"content": {"parts": [{"text": "Buy "}, {"text": "index funds"}]}, "finishReason": "STOP"},
                {"content": {"parts": [{"text": "ignored"}]}}
            ]
        }))
        .unwrap();
        assert_eq!(parsed.text(), "Buy index funds");
        assert_eq!(parsed.finish_reason().as_deref(), Some("STOP"));
    }

    #[test]
    fn missing_candidates_yield_empty_text_and_no_reason() {
        let parsed: GenerateContentResponse = serde_json::from_value(json!({"promptFeedback": {}})).unwrap();
        assert_eq!(parsed.text(), "");
        assert!(parsed.finish_reason().is_none());
    }

    #[test]
    fn chunk_with_error_body_is_an_error() {
        let err = parse_chunk(r#"{"error": {"code": 429, "message": "quota exceeded"}}"#).unwrap_err();
        match err {
            ChatError::Upstream { status, message } => {
                assert_eq!(status, 429);
                assert_eq!(message, "quota exceeded");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn error_message_falls_back_to_raw_body() {
        assert_eq!(error_message(r#"{"error": {"message": "API key not valid"}}"#), "API key not valid");
        assert_eq!(error_message("Service Unavailable"), "Service Unavailable");
    }
}
