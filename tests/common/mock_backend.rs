//! Local JSON endpoint for hydration tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::extract::State;
use axum::http::{header, Request, Response, StatusCode};
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::{watch, Mutex};

/// What the endpoint saw of one request.
#[derive(Debug, Clone)]
pub struct CapturedRequest {
    pub method: String,
    pub path: String,
    pub accept: Option<String>,
}

/// One queued reply.
#[derive(Debug, Clone)]
pub struct MockResponse {
    status: u16,
    content_type: &'static str,
    body: String,
    delay: Duration,
}

impl MockResponse {
    pub fn json(body: &str) -> Self {
        Self {
            status: 200,
            content_type: "application/json",
            body: body.to_string(),
            delay: Duration::ZERO,
        }
    }

    /// A non-2xx reply with a small JSON error body.
    pub fn status(status: u16) -> Self {
        Self {
            status,
            ..Self::json(r#"{"error": "unavailable"}"#)
        }
    }

    pub fn text(body: &str) -> Self {
        Self {
            content_type: "text/plain",
            ..Self::json(body)
        }
    }

    pub fn with_delay(mut self, ms: u64) -> Self {
        self.delay = Duration::from_millis(ms);
        self
    }
}

#[derive(Clone, Default)]
struct Endpoint {
    requests: Arc<Mutex<Vec<CapturedRequest>>>,
    replies: Arc<Mutex<VecDeque<MockResponse>>>,
}

/// Serves queued replies on an ephemeral port. Unqueued requests get `{}`.
pub struct MockBackend {
    addr: SocketAddr,
    endpoint: Endpoint,
    shutdown: watch::Sender<bool>,
}

impl MockBackend {
    pub async fn start() -> Self {
        let endpoint = Endpoint::default();
        let app = Router::new().fallback(reply).with_state(endpoint.clone());

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind mock endpoint");
        let addr = listener.local_addr().expect("Mock endpoint has no address");

        let (shutdown, mut stop) = watch::channel(false);
        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    let _ = stop.changed().await;
                })
                .await
                .ok();
        });

        Self {
            addr,
            endpoint,
            shutdown,
        }
    }

    pub async fn enqueue_response(&self, response: MockResponse) {
        self.endpoint.replies.lock().await.push_back(response);
    }

    pub async fn captured_requests(&self) -> Vec<CapturedRequest> {
        self.endpoint.requests.lock().await.clone()
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for MockBackend {
    fn drop(&mut self) {
        let _ = self.shutdown.send(true);
    }
}

async fn reply(State(endpoint): State<Endpoint>, req: Request<Body>) -> Response<Body> {
    endpoint.requests.lock().await.push(CapturedRequest {
        method: req.method().to_string(),
        path: req.uri().path().to_string(),
        accept: req
            .headers()
            .get(header::ACCEPT)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string),
    });

    let queued = endpoint.replies.lock().await.pop_front();
    let response = queued.unwrap_or_else(|| MockResponse::json("{}"));
    if !response.delay.is_zero() {
        tokio::time::sleep(response.delay).await;
    }

    Response::builder()
        .status(StatusCode::from_u16(response.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR))
        .header(header::CONTENT_TYPE, response.content_type)
        .body(Body::from(response.body))
        .expect("Mock response is well formed")
}
