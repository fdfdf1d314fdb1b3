#![allow(dead_code)]

use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::Response;
use axum::Router;
use futures::stream::{self, StreamExt};
use serde_json::{json, Value};
use tower::ServiceExt;

use honk_bff::chat::{ChatError, ChatModel, Generation, GenerationRequest, TextStream};
use honk_bff::database::{AuthOutcome, AuthProvider, DatabaseError, RowStore};
use honk_bff::filter::TableQuery;
use honk_bff::{AppConfig, AppState};

// ---------------------------------------------------------------------------
// Row store
// ---------------------------------------------------------------------------

/// Records every query and answers from a queue (default: no rows)
#[derive(Default)]
pub struct RecordingStore {
    queries: Mutex<Vec<TableQuery>>,
    responses: Mutex<VecDeque<Result<Value, String>>>,
}

impl RecordingStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn respond(&self, body: Value) {
        self.responses.lock().unwrap().push_back(Ok(body));
    }

    pub fn fail(&self, message: &str) {
        self.responses.lock().unwrap().push_back(Err(message.to_string()));
    }

    pub fn queries(&self) -> Vec<TableQuery> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl RowStore for RecordingStore {
    async fn execute(&self, query: TableQuery) -> Result<Value, DatabaseError> {
        self.queries.lock().unwrap().push(query);
        match self.responses.lock().unwrap().pop_front() {
            Some(Ok(body)) => Ok(body),
            Some(Err(message)) => Err(DatabaseError::Upstream { status: 400, message }),
            None => Ok(json!([])),
        }
    }
}

// ---------------------------------------------------------------------------
// Auth provider
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct FakeAuth {
    pub outcome: Mutex<Option<AuthOutcome>>,
    pub error: Mutex<Option<String>>,
    pub signed_out: Mutex<Vec<String>>,
}

impl FakeAuth {
    pub fn returning(body: Value) -> Arc<Self> {
        let auth = Self::default();
        *auth.outcome.lock().unwrap() = Some(AuthOutcome::from_response(body));
        Arc::new(auth)
    }

    pub fn failing(message: &str) -> Arc<Self> {
        let auth = Self::default();
        *auth.error.lock().unwrap() = Some(message.to_string());
        Arc::new(auth)
    }

    fn answer(&self) -> Result<AuthOutcome, DatabaseError> {
        if let Some(message) = self.error.lock().unwrap().clone() {
            return Err(DatabaseError::Upstream { status: 400, message });
        }
        Ok(self.outcome.lock().unwrap().clone().unwrap_or_default())
    }
}

#[async_trait]
impl AuthProvider for FakeAuth {
    async fn sign_up(&self, _email: &str, _password: &str) -> Result<AuthOutcome, DatabaseError> {
        self.answer()
    }

    async fn sign_in_with_password(&self, _email: &str, _password: &str) -> Result<AuthOutcome, DatabaseError> {
        self.answer()
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), DatabaseError> {
        self.answer()?;
        self.signed_out.lock().unwrap().push(access_token.to_string());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Chat model
// ---------------------------------------------------------------------------

/// Scripted model: yields `chunks` in order, then optionally fails
#[derive(Default)]
pub struct FakeChat {
    pub chunks: Vec<String>,
    pub error: Option<String>,
    pub requests: Mutex<Vec<GenerationRequest>>,
}

impl FakeChat {
    pub fn replying(chunks: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            chunks: chunks.iter().map(|c| c.to_string()).collect(),
            ..Default::default()
        })
    }

    pub fn failing_after(chunks: &[&str], message: &str) -> Arc<Self> {
        Arc::new(Self {
            chunks: chunks.iter().map(|c| c.to_string()).collect(),
            error: Some(message.to_string()),
            ..Default::default()
        })
    }

    pub fn last_request(&self) -> Option<GenerationRequest> {
        self.requests.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl ChatModel for FakeChat {
    async fn generate(&self, request: &GenerationRequest) -> Result<Generation, ChatError> {
        self.requests.lock().unwrap().push(request.clone());
        if let Some(message) = &self.error {
            return Err(ChatError::Upstream { status: 503, message: message.clone() });
        }
        Ok(Generation {
            text: self.chunks.concat(),
            finish_reason: Some("STOP".to_string()),
        })
    }

    async fn generate_stream(&self, request: &GenerationRequest) -> Result<TextStream, ChatError> {
        self.requests.lock().unwrap().push(request.clone());
        let chunks: Vec<Result<String, ChatError>> = self.chunks.iter().cloned().map(Ok).collect();
        let tail: Vec<Result<String, ChatError>> = self
            .error
            .iter()
            .map(|message| Err(ChatError::Stream(message.clone())))
            .collect();
        Ok(stream::iter(chunks).chain(stream::iter(tail)).boxed())
    }
}

// ---------------------------------------------------------------------------
// App and request helpers
// ---------------------------------------------------------------------------

pub fn config() -> AppConfig {
    let mut config = AppConfig::development();
    config.supabase.url = Some("https://demo.supabase.co".to_string());
    config
}

/// State with no providers; attach fakes with the `with_*` builders
pub fn state() -> AppState {
    state_with(config())
}

pub fn state_with(config: AppConfig) -> AppState {
    AppState::new(config).expect("state")
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().method("GET").uri(uri).body(Body::empty()).expect("request")
}

pub fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

pub async fn send_raw(state: AppState, request: Request<Body>) -> Result<Response> {
    let response = honk_bff::app(state).oneshot(request).await?;
    Ok(response)
}

pub async fn body_text(response: Response) -> Result<String> {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
    Ok(String::from_utf8(bytes.to_vec())?)
}

/// Run one request through the router and decode the JSON body
pub async fn send(state: AppState, request: Request<Body>) -> Result<(StatusCode, Value)> {
    let response = send_raw(state, request).await?;
    let status = response.status();
    let text = body_text(response).await?;
    let body = serde_json::from_str(&text).with_context(|| format!("non-JSON body: {}", text))?;
    Ok((status, body))
}

/// Serve a throwaway upstream on an ephemeral local port
pub async fn spawn_upstream(router: Router) -> Result<SocketAddr> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
    Ok(addr)
}
