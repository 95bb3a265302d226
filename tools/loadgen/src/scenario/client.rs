//! Authenticated scenario client
//!
//! Sends one request per call with the bound user's bearer token. Calls are
//! not retried and their responses are not checked; every call is recorded
//! into the shared metrics instead.

use crate::config::TargetConfig;
use crate::endpoints::Endpoint;
use crate::metrics::{RequestResult, SwarmMetrics};
use crate::transport::{ActionRequest, Transport};
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;
use types::credential::UserCredential;

#[derive(Clone)]
pub struct AuthenticatedClient {
    transport: Arc<dyn Transport>,
    target: TargetConfig,
    credential: UserCredential,
    metrics: Arc<SwarmMetrics>,
}

impl AuthenticatedClient {
    pub fn new(
        transport: Arc<dyn Transport>,
        target: TargetConfig,
        credential: UserCredential,
        metrics: Arc<SwarmMetrics>,
    ) -> Self {
        Self {
            transport,
            target,
            credential,
            metrics,
        }
    }

    pub fn credential(&self) -> &UserCredential {
        &self.credential
    }

    pub async fn get(&self, endpoint: Endpoint) -> RequestResult {
        self.call(endpoint, None).await
    }

    pub async fn post(&self, endpoint: Endpoint, body: Value) -> RequestResult {
        self.call(endpoint, Some(body)).await
    }

    async fn call(&self, endpoint: Endpoint, body: Option<Value>) -> RequestResult {
        let mut request = ActionRequest::new(endpoint.method(), self.target.url(&endpoint.path()), self.target.timeout);
        if endpoint.requires_auth() {
            request = request.bearer(&self.credential.access_token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let started = Instant::now();
        let result = match self.transport.send(&request).await {
            Ok(response) => RequestResult::Status(response.status),
            Err(e) => {
                debug!(user_id = %self.credential.user_id, endpoint = endpoint.name(), error = %e, "request failed");
                RequestResult::TransportFailure
            }
        };
        self.metrics.record(endpoint.name(), result, started.elapsed());
        result
    }
}
