use std::convert::Infallible;
use std::sync::Arc;

use axum::http::{HeaderName, HeaderValue};
use axum::response::sse::{Event, Sse};
use axum::response::{IntoResponse, Response};
use futures::StreamExt;
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tracing::{debug, warn};

use super::model::{ChatModel, GenerationRequest};

pub const DONE_EVENT: &str = "done";
pub const ERROR_EVENT: &str = "error";
pub const DONE_DATA: &str = "[DONE]";

/// One server-push frame sent to the browser
#[derive(Debug, Clone, PartialEq)]
pub enum StreamFrame {
    Text(String),
    Done,
    Error(String),
}

impl StreamFrame {
    pub fn into_event(self) -> Event {
        match self {
            StreamFrame::Text(text) => Event::default().data(sse_safe(&text)),
            StreamFrame::Done => Event::default().event(DONE_EVENT).data(DONE_DATA),
            StreamFrame::Error(message) => Event::default()
                .event(ERROR_EVENT)
                .data(sse_safe(&format!("error: {}", message))),
        }
    }
}

// SSE cannot carry bare carriage returns; fold them into line breaks
fn sse_safe(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}

/// Open an event stream that forwards upstream text increments in arrival order
pub fn relay(model: Arc<dyn ChatModel>, request: GenerationRequest) -> Response {
    let (tx, rx) = mpsc::unbounded_channel::<Event>();
    tokio::spawn(forward(model, request, tx));

    let stream = UnboundedReceiverStream::new(rx).map(Ok::<_, Infallible>);
    (
        [(HeaderName::from_static("x-accel-buffering"), HeaderValue::from_static("no"))],
        Sse::new(stream),
    )
        .into_response()
}

async fn forward(model: Arc<dyn ChatModel>, request: GenerationRequest, tx: mpsc::UnboundedSender<Event>) {
    let mut upstream = match model.generate_stream(&request).await {
        Ok(stream) => stream,
        Err(e) => {
            warn!(error = %e, model = %request.model, "chat stream failed to open");
            let _ = tx.send(StreamFrame::Error(e.to_string()).into_event());
            return;
        }
    };

    loop {
        let item = tokio::select! {
            _ = tx.closed() => {
                debug!(model = %request.model, "chat stream client disconnected");
                return;
            }
            item = upstream.next() => item,
        };

        let frame = match item {
            Some(Ok(text)) if text.is_empty() => continue,
            Some(Ok(text)) => StreamFrame::Text(text),
            Some(Err(e)) => {
                warn!(error = %e, model = %request.model, "chat stream interrupted");
                let _ = tx.send(StreamFrame::Error(e.to_string()).into_event());
                return;
            }
            None => break,
        };

        if tx.send(frame.into_event()).is_err() {
            debug!(model = %request.model, "chat stream client disconnected");
            return;
        }
    }

    let _ = tx.send(StreamFrame::Done.into_event());
}
