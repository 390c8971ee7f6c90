//! Test utilities for fingenie-core
//!
//! Provides a mock OpenAI-compatible chat completions server. It binds to an
//! ephemeral port, records every request it receives, and answers according
//! to a fixed [`Behavior`].

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use tokio::sync::oneshot;

use crate::ai::MockBackend;

/// How the mock server answers chat completion requests
#[derive(Debug, Clone)]
pub enum Behavior {
    /// Reply with the heuristic extraction of the prompt's transcript
    Heuristic,
    /// Wrap this text as `choices[0].message.content`
    Reply(String),
    /// Send this status and body verbatim
    Raw { status: u16, body: String },
    /// Wait before replying (for client timeout tests)
    Delayed { delay: Duration, reply: String },
}

/// A chat completion request as seen by the mock server
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub authorization: Option<String>,
    pub body: Value,
}

struct ServerState {
    behavior: Behavior,
    requests: Mutex<Vec<RecordedRequest>>,
}

/// Mock chat completions server for tests
pub struct MockCompletionServer {
    addr: SocketAddr,
    state: Arc<ServerState>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockCompletionServer {
    /// Start a server that extracts expenses heuristically
    pub async fn start() -> Self {
        Self::start_with(Behavior::Heuristic).await
    }

    /// Start a server whose model always replies with `reply`
    pub async fn start_with_reply(reply: &str) -> Self {
        Self::start_with(Behavior::Reply(reply.to_string())).await
    }

    /// Start a server that answers every request with a raw status and body
    pub async fn start_with_raw(status: u16, body: &str) -> Self {
        Self::start_with(Behavior::Raw {
            status,
            body: body.to_string(),
        })
        .await
    }

    /// Start the mock server on an available port
    pub async fn start_with(behavior: Behavior) -> Self {
        let state = Arc::new(ServerState {
            behavior,
            requests: Mutex::new(Vec::new()),
        });

        let app = Router::new()
            .route("/v1/chat/completions", post(handle_chat))
            .route("/v1/models", get(handle_models))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .unwrap();
        });

        Self {
            addr,
            state,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    /// Get the base URL for this mock server
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Full chat completions URL, suitable for `ExtractionConfig::endpoint_url`
    pub fn endpoint_url(&self) -> String {
        format!("{}/v1/chat/completions", self.url())
    }

    /// Requests received so far, oldest first
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.state.requests.lock().unwrap().len()
    }

    /// Stop the mock server
    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for MockCompletionServer {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Wrap reply text in a chat completion envelope
pub fn completion_envelope(content: &str) -> Value {
    json!({
        "id": "chatcmpl-mock",
        "object": "chat.completion",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": content },
            "finish_reason": "stop"
        }]
    })
}

async fn handle_models() -> impl IntoResponse {
    axum::Json(json!({ "object": "list", "data": [{ "id": "mock-model" }] }))
}

async fn handle_chat(
    State(state): State<Arc<ServerState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let body: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    let authorization = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let prompt = body["messages"][0]["content"]
        .as_str()
        .unwrap_or_default()
        .to_string();

    state.requests.lock().unwrap().push(RecordedRequest {
        authorization,
        body,
    });

    match &state.behavior {
        Behavior::Heuristic => {
            let reply = MockBackend::heuristic_reply(&prompt);
            json_response(StatusCode::OK, completion_envelope(&reply).to_string())
        }
        Behavior::Reply(reply) => {
            json_response(StatusCode::OK, completion_envelope(reply).to_string())
        }
        Behavior::Raw { status, body } => {
            let status = StatusCode::from_u16(*status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            json_response(status, body.clone())
        }
        Behavior::Delayed { delay, reply } => {
            tokio::time::sleep(*delay).await;
            json_response(StatusCode::OK, completion_envelope(reply).to_string())
        }
    }
}

fn json_response(status: StatusCode, body: String) -> Response {
    (status, [(header::CONTENT_TYPE, "application/json")], body).into_response()
}
