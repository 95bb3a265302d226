//! HTTP transport seam
//!
//! The executor and the swarm talk to the exchange through `Transport` so
//! tests can script responses without a live server.

use async_trait::async_trait;
use reqwest::{Client, Method};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

/// One fully-specified HTTP call
#[derive(Debug, Clone, PartialEq)]
pub struct ActionRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Value>,
    /// Applies to this attempt only
    pub timeout: Duration,
}

impl ActionRequest {
    pub fn new(method: Method, url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Vec::new(),
            body: None,
            timeout,
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn bearer(self, access_token: &str) -> Self {
        self.header("Authorization", format!("Bearer {}", access_token))
    }

    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

/// Status and body of a received response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

/// Failure before a complete response was received
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("connection failed: {0}")]
    Connect(String),

    #[error("request timed out")]
    Timeout,

    #[error("request failed: {0}")]
    Request(String),
}

impl TransportError {
    /// Short class name used in `NETWORK_ERROR:<class>` notes
    pub fn kind_name(&self) -> &'static str {
        match self {
            TransportError::Connect(_) => "ConnectionError",
            TransportError::Timeout => "Timeout",
            TransportError::Request(_) => "RequestError",
        }
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Timeout
        } else if err.is_connect() {
            TransportError::Connect(err.to_string())
        } else {
            TransportError::Request(err.to_string())
        }
    }
}

/// Sends one request, no retries
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: &ActionRequest) -> Result<RawResponse, TransportError>;
}

/// `Transport` backed by a shared reqwest connection pool
#[derive(Debug, Clone, Default)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: &ActionRequest) -> Result<RawResponse, TransportError> {
        let mut builder = self
            .client
            .request(request.method.clone(), &request.url)
            .timeout(request.timeout);

        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        Ok(RawResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_builder() {
        let req = ActionRequest::new(Method::POST, "http://h/api", Duration::from_secs(5))
            .bearer("tok")
            .json(json!({"amount": 1}));
        assert_eq!(req.headers, vec![("Authorization".to_string(), "Bearer tok".to_string())]);
        assert_eq!(req.body, Some(json!({"amount": 1})));
        assert_eq!(req.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(TransportError::Connect("refused".into()).kind_name(), "ConnectionError");
        assert_eq!(TransportError::Timeout.kind_name(), "Timeout");
        assert_eq!(TransportError::Request("bad".into()).kind_name(), "RequestError");
    }

    #[tokio::test]
    async fn test_connection_refused_maps_to_connect() {
        // Port 9 (discard) is not listening on test hosts
        let transport = HttpTransport::new();
        let req = ActionRequest::new(Method::GET, "http://127.0.0.1:9/", Duration::from_secs(2));
        match transport.send(&req).await {
            Err(TransportError::Connect(_)) | Err(TransportError::Timeout) => {}
            other => panic!("expected network failure, got {:?}", other),
        }
    }
}
