mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use axum::http::StatusCode;
use futures::stream::{self, StreamExt};
use serde_json::json;

use honk_bff::chat::{ChatError, ChatModel, Generation, GenerationRequest, Role, TextStream};

/// Split an SSE body into its frames
fn frames(body: &str) -> Vec<String> {
    body.split("\n\n")
        .map(str::trim)
        .filter(|frame| !frame.is_empty())
        .map(str::to_string)
        .collect()
}

#[tokio::test]
async fn non_streaming_chat_returns_text_and_model() -> Result<()> {
    let chat = common::FakeChat::replying(&["Hello, ", "I am Honk."]);
    let state = common::state().with_chat(chat.clone());

    let body = json!({"messages": [{"role": "user", "content": "hi"}], "model": "gemini-2.5-flash"});
    let (status, payload) = common::send(state, common::post_json("/gemini/chat", body)).await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(payload["text"], "Hello, I am Honk.");
    assert_eq!(payload["model"], "gemini-2.5-flash");
    assert_eq!(payload["finish_reason"], "STOP");
    Ok(())
}

#[tokio::test]
async fn roles_are_normalized_and_defaults_applied() -> Result<()> {
    let chat = common::FakeChat::replying(&["ok"]);
    let state = common::state().with_chat(chat.clone());

    let body = json!({"messages": [
        {"role": "user", "content": "hi"},
        {"role": "assistant", "content": "honk"},
        {"role": "Bot", "content": "honk honk"},
        {"role": "system", "content": "?"}
    ]});
    let (status, payload) = common::send(state, common::post_json("/gemini/chat", body)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(payload["model"], "gemini-2.5-flash");

    let request = chat.last_request().expect("request recorded");
    let roles: Vec<Role> = request.turns.iter().map(|t| t.role).collect();
    assert_eq!(roles, vec![Role::User, Role::Model, Role::Model, Role::User]);
    assert_eq!(request.temperature, Some(0.8));
    assert_eq!(request.max_output_tokens, Some(1024));
    assert!(request.system_instruction.as_deref().unwrap_or_default().contains("Honk"));
    Ok(())
}

#[tokio::test]
async fn chat_upstream_error_is_500() -> Result<()> {
    let state = common::state().with_chat(common::FakeChat::failing_after(&[], "quota exceeded"));

    let body = json!({"messages": [{"role": "user", "content": "hi"}]});
    let (status, payload) = common::send(state, common::post_json("/gemini/chat", body)).await?;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(payload["detail"].as_str().unwrap_or_default().starts_with("Gemini error:"));
    Ok(())
}

#[tokio::test]
async fn chat_without_key_is_500() -> Result<()> {
    let body = json!({"messages": [{"role": "user", "content": "hi"}]});
    let (status, payload) = common::send(common::state(), common::post_json("/gemini/chat", body)).await?;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(payload["detail"], "Missing GOOGLE_API_KEY/GEMINI_API_KEY in environment");
    Ok(())
}

#[tokio::test]
async fn stream_forwards_chunks_in_order_then_done() -> Result<()> {
    let state = common::state().with_chat(common::FakeChat::replying(&["a", "b", "c"]));

    let body = json!({"messages": [{"role": "user", "content": "hi"}]});
    let response = common::send_raw(state, common::post_json("/gemini/chat/stream", body)).await?;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["content-type"], "text/event-stream");
    assert_eq!(response.headers()["x-accel-buffering"], "no");

    let text = common::body_text(response).await?;
    assert_eq!(frames(&text), vec!["data: a", "data: b", "data: c", "event: done\ndata: [DONE]"]);
    Ok(())
}

#[tokio::test]
async fn stream_error_after_one_chunk_ends_with_error_frame() -> Result<()> {
    let state = common::state().with_chat(common::FakeChat::failing_after(&["a"], "connection reset"));

    let body = json!({"messages": [{"role": "user", "content": "hi"}]});
    let response = common::send_raw(state, common::post_json("/gemini/chat/stream", body)).await?;
    let text = common::body_text(response).await?;

    let frames = frames(&text);
    assert_eq!(frames.len(), 2, "frames: {:?}", frames);
    assert_eq!(frames[0], "data: a");
    assert!(frames[1].starts_with("event: error\ndata: error: "), "frame: {}", frames[1]);
    assert!(frames[1].contains("connection reset"));
    Ok(())
}

#[tokio::test]
async fn stream_skips_empty_chunks() -> Result<()> {
    let state = common::state().with_chat(common::FakeChat::replying(&["a", "", "b"]));

    let body = json!({"messages": [{"role": "user", "content": "hi"}]});
    let response = common::send_raw(state, common::post_json("/gemini/chat/stream", body)).await?;
    let text = common::body_text(response).await?;

    assert_eq!(frames(&text), vec!["data: a", "data: b", "event: done\ndata: [DONE]"]);
    Ok(())
}

/// Model whose stream never ends; counts how often it is polled for a chunk
#[derive(Default)]
struct EndlessChat {
    pulls: Arc<AtomicUsize>,
}

#[async_trait]
impl ChatModel for EndlessChat {
    async fn generate(&self, _request: &GenerationRequest) -> Result<Generation, ChatError> {
        Ok(Generation::default())
    }

    async fn generate_stream(&self, _request: &GenerationRequest) -> Result<TextStream, ChatError> {
        let pulls = self.pulls.clone();
        Ok(stream::unfold(pulls, |pulls| async move {
            pulls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(5)).await;
            Some((Ok("honk".to_string()), pulls))
        })
        .boxed())
    }
}

#[tokio::test]
async fn client_disconnect_stops_upstream_consumption() -> Result<()> {
    let chat = Arc::new(EndlessChat::default());
    let pulls = chat.pulls.clone();
    let state = common::state().with_chat(chat);

    let body = json!({"messages": [{"role": "user", "content": "hi"}]});
    let response = common::send_raw(state, common::post_json("/gemini/chat/stream", body)).await?;
    assert_eq!(response.status(), StatusCode::OK);

    let mut frames = response.into_body().into_data_stream();
    for _ in 0..3 {
        let frame = frames.next().await.expect("stream open")?;
        assert!(String::from_utf8_lossy(&frame).contains("honk"));
    }
    drop(frames);

    tokio::time::sleep(Duration::from_millis(100)).await;
    let settled = pulls.load(Ordering::SeqCst);
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(pulls.load(Ordering::SeqCst), settled, "upstream still being drained");
    assert!(settled >= 3);
    Ok(())
}
