//! HTTP transport abstraction.
//!
//! Provides a trait-based seam over outgoing GET requests to enable:
//! - Unit testing endpoint resolution without a network
//! - Scripting per-path vendor responses (including the not-found sentinel)
//! - Swapping the HTTP stack without touching resolution logic

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use super::error::TransportError;

/// Status and raw body of a completed request
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// True for 2xx statuses
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Outgoing HTTP GET
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(
        &self,
        url: &str,
        headers: &[(String, String)],
    ) -> Result<HttpResponse, TransportError>;
}

/// Transport backed by `reqwest`
#[derive(Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Create a transport whose requests give up after `timeout`
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("studio-site/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| TransportError::ClientBuild(e.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn get(
        &self,
        url: &str,
        headers: &[(String, String)],
    ) -> Result<HttpResponse, TransportError> {
        debug!("GET {}", url);

        let mut request = self.client.get(url);
        for (name, value) in headers {
            request = request.header(name.as_str(), value.as_str());
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                TransportError::Timeout(e.to_string())
            } else {
                TransportError::Network(e.to_string())
            }
        })?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        Ok(HttpResponse { status, body })
    }
}

// ─── Mock Transport ──────────────────────────────────────────────────────────

/// Body FitDegree returns for an unknown route
pub const NOT_FOUND_BODY: &str = r#"{"auth_status":{"code":19,"msg":"Endpoint not found"}}"#;

#[derive(Debug, Clone)]
enum MockReply {
    Response(HttpResponse),
    Failure(String),
}

/// A request the mock received
#[derive(Debug, Clone)]
pub struct MockRequest {
    pub url: String,
    pub path: String,
    pub headers: Vec<(String, String)>,
}

/// Scripted transport keyed by URL path.
///
/// Paths without a scripted reply answer with the vendor not-found sentinel
/// (HTTP 200), which is what the real API does for unknown routes.
#[derive(Clone)]
pub struct MockTransport {
    replies: Arc<Mutex<HashMap<String, MockReply>>>,
    fallback: Arc<Mutex<MockReply>>,
    /// Record of requests received, in order
    pub requests: Arc<Mutex<Vec<MockRequest>>>,
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl MockTransport {
    pub fn new() -> Self {
        Self {
            replies: Arc::new(Mutex::new(HashMap::new())),
            fallback: Arc::new(Mutex::new(MockReply::Response(HttpResponse::new(
                200,
                NOT_FOUND_BODY,
            )))),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Answer requests for `path` with `status` and `body`
    pub fn respond(self, path: &str, status: u16, body: impl Into<String>) -> Self {
        self.replies.lock().unwrap().insert(
            path.to_string(),
            MockReply::Response(HttpResponse::new(status, body)),
        );
        self
    }

    /// Fail requests for `path` at the transport level
    pub fn fail(self, path: &str, message: &str) -> Self {
        self.replies
            .lock()
            .unwrap()
            .insert(path.to_string(), MockReply::Failure(message.to_string()));
        self
    }

    /// Fail every unscripted path at the transport level
    pub fn fail_by_default(self, message: &str) -> Self {
        *self.fallback.lock().unwrap() = MockReply::Failure(message.to_string());
        self
    }

    /// Paths requested so far, in order
    pub fn requested_paths(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.path.clone())
            .collect()
    }

    /// Number of requests received
    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn get(
        &self,
        url: &str,
        headers: &[(String, String)],
    ) -> Result<HttpResponse, TransportError> {
        let parsed = reqwest::Url::parse(url)
            .map_err(|e| TransportError::InvalidUrl(url.to_string(), e.to_string()))?;
        let path = parsed.path().to_string();

        self.requests.lock().unwrap().push(MockRequest {
            url: url.to_string(),
            path: path.clone(),
            headers: headers.to_vec(),
        });

        let reply = self
            .replies
            .lock()
            .unwrap()
            .get(&path)
            .cloned()
            .unwrap_or_else(|| self.fallback.lock().unwrap().clone());

        match reply {
            MockReply::Response(response) => Ok(response),
            MockReply::Failure(message) => Err(TransportError::Network(message)),
        }
    }
}
