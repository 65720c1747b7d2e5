//! In-process mock of a STAC `POST /search` endpoint.
//!
//! Binds to an ephemeral localhost port, counts requests and records their
//! JSON bodies so tests can assert on exactly what a resolver sent.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde_json::Value;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;

/// What the mock answers with.
#[derive(Debug, Clone)]
pub enum MockReply {
    /// 200 with a JSON body
    Json(Value),
    /// The given status with a short text body
    Status(u16),
    /// 200 with a raw body labelled as JSON
    Raw(String),
}

struct MockState {
    reply: Mutex<MockReply>,
    requests: AtomicUsize,
    bodies: Mutex<Vec<Value>>,
    held: AtomicBool,
    gate: Semaphore,
}

/// A running mock search endpoint. Shut down on drop.
pub struct MockSearchServer {
    addr: SocketAddr,
    state: Arc<MockState>,
    handle: JoinHandle<()>,
}

impl MockSearchServer {
    /// Start serving `reply` on `127.0.0.1:0`.
    pub async fn start(reply: MockReply) -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind mock search server");
        let addr = listener
            .local_addr()
            .expect("Mock search server has no local address");

        let state = Arc::new(MockState {
            reply: Mutex::new(reply),
            requests: AtomicUsize::new(0),
            bodies: Mutex::new(Vec::new()),
            held: AtomicBool::new(false),
            gate: Semaphore::new(0),
        });

        let app = Router::new()
            .route("/search", post(search_handler))
            .with_state(state.clone());

        let handle = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self {
            addr,
            state,
            handle,
        }
    }

    /// Start serving a JSON body.
    pub async fn with_json(body: Value) -> Self {
        Self::start(MockReply::Json(body)).await
    }

    /// Full URL of the search endpoint.
    pub fn url(&self) -> String {
        format!("http://{}/search", self.addr)
    }

    /// Number of requests received so far.
    pub fn request_count(&self) -> usize {
        self.state.requests.load(Ordering::SeqCst)
    }

    /// JSON bodies of every request received, in order.
    pub fn request_bodies(&self) -> Vec<Value> {
        self.state
            .bodies
            .lock()
            .expect("mock state poisoned")
            .clone()
    }

    /// Change the reply for subsequent requests.
    pub fn set_reply(&self, reply: MockReply) {
        *self.state.reply.lock().expect("mock state poisoned") = reply;
    }

    /// Make subsequent requests wait until [`release_one`](Self::release_one).
    pub fn hold(&self) {
        self.state.held.store(true, Ordering::SeqCst);
    }

    /// Let one held request through.
    pub fn release_one(&self) {
        self.state.gate.add_permits(1);
    }

    /// Stop holding new requests.
    pub fn unhold(&self) {
        self.state.held.store(false, Ordering::SeqCst);
    }
}

impl Drop for MockSearchServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn search_handler(State(state): State<Arc<MockState>>, body: String) -> Response {
    let held = state.held.load(Ordering::SeqCst);
    if let Ok(json) = serde_json::from_str::<Value>(&body) {
        state.bodies.lock().expect("mock state poisoned").push(json);
    }
    state.requests.fetch_add(1, Ordering::SeqCst);

    if held {
        if let Ok(permit) = state.gate.acquire().await {
            permit.forget();
        }
    }

    let reply = state.reply.lock().expect("mock state poisoned").clone();
    match reply {
        MockReply::Json(value) => Json(value).into_response(),
        MockReply::Status(code) => (
            StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            "mock search error",
        )
            .into_response(),
        MockReply::Raw(body) => ([(header::CONTENT_TYPE, "application/json")], body).into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_mock_records_requests() {
        let server = MockSearchServer::with_json(json!({ "features": [] })).await;
        let client = reqwest::Client::new();

        let response = client
            .post(server.url())
            .json(&json!({ "collections": ["noaa-hrrr"] }))
            .send()
            .await
            .unwrap();

        assert!(response.status().is_success());
        assert_eq!(server.request_count(), 1);
        assert_eq!(server.request_bodies()[0]["collections"][0], "noaa-hrrr");
    }

    #[tokio::test]
    async fn test_mock_status_reply() {
        let server = MockSearchServer::start(MockReply::Status(503)).await;
        let response = reqwest::Client::new()
            .post(server.url())
            .body("{}")
            .send()
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 503);
    }
}
