//! Resilient action executor
//!
//! Runs the retry state machine against a `Transport`. Attempts are strictly
//! sequential and backoff waits go through an injected `Sleeper`, so the
//! whole loop is deterministic under test.

use crate::config::RetryPolicy;
use crate::retry::{transition, RetryState};
use crate::transport::{ActionRequest, Transport};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use types::outcome::ActionOutcome;

/// Waits between attempts
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Real wall-clock sleeper
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Issues one action with bounded retry and reduces it to an `ActionOutcome`
#[derive(Clone)]
pub struct ActionExecutor {
    transport: Arc<dyn Transport>,
    sleeper: Arc<dyn Sleeper>,
}

impl ActionExecutor {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self::with_sleeper(transport, Arc::new(TokioSleeper))
    }

    pub fn with_sleeper(transport: Arc<dyn Transport>, sleeper: Arc<dyn Sleeper>) -> Self {
        Self { transport, sleeper }
    }

    /// Execute `request` under `policy`. Never fails: every error is folded
    /// into the returned outcome.
    pub async fn execute(&self, request: &ActionRequest, policy: &RetryPolicy) -> ActionOutcome {
        let mut state = RetryState::initial();

        loop {
            state = match state {
                RetryState::Attempting { attempt } => {
                    let result = self.transport.send(request).await;
                    if let Err(err) = &result {
                        debug!(url = %request.url, attempt, error = %err, "transport failure");
                    }
                    transition(result.into(), attempt, policy)
                }
                RetryState::Backoff { attempt, delay } => {
                    warn!(
                        url = %request.url,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        "transient failure, backing off"
                    );
                    self.sleeper.sleep(delay).await;
                    RetryState::Attempting { attempt: attempt + 1 }
                }
                RetryState::Succeeded(outcome)
                | RetryState::PermanentlyFailed(outcome)
                | RetryState::RetriesExhausted(outcome) => return outcome,
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{RecordingSleeper, ScriptedTransport};
    use crate::transport::{RawResponse, TransportError};
    use reqwest::Method;

    fn request() -> ActionRequest {
        ActionRequest::new(Method::POST, "http://test/api/v1/cash-wallet", Duration::from_secs(5))
            .bearer("tok")
    }

    fn ok(status: u16) -> Result<RawResponse, TransportError> {
        Ok(RawResponse { status, body: String::new() })
    }

    fn executor(transport: &Arc<ScriptedTransport>, sleeper: &Arc<RecordingSleeper>) -> ActionExecutor {
        ActionExecutor::with_sleeper(transport.clone(), sleeper.clone())
    }

    #[tokio::test]
    async fn test_2xx_first_attempt_no_sleep() {
        let transport = Arc::new(ScriptedTransport::new(vec![ok(201)]));
        let sleeper = Arc::new(RecordingSleeper::default());

        let outcome = executor(&transport, &sleeper).execute(&request(), &RetryPolicy::default()).await;

        assert!(outcome.succeeded);
        assert_eq!(outcome.status_code, 201);
        assert_eq!(transport.call_count(), 1);
        assert!(sleeper.sleeps().is_empty());
    }

    #[tokio::test]
    async fn test_409_on_create_is_already_exists() {
        let transport = Arc::new(ScriptedTransport::new(vec![ok(409)]));
        let sleeper = Arc::new(RecordingSleeper::default());
        let policy = RetryPolicy::default().idempotent_create();

        let outcome = executor(&transport, &sleeper).execute(&request(), &policy).await;

        assert!(outcome.succeeded);
        assert_eq!(outcome.note.as_deref(), Some("ALREADY_EXISTS"));
        assert_eq!(transport.call_count(), 1);
    }

    #[tokio::test]
    async fn test_client_errors_not_retried() {
        for status in [400u16, 401, 404, 422] {
            let transport = Arc::new(ScriptedTransport::new(vec![
                Ok(RawResponse { status, body: "denied".into() }),
                ok(200),
            ]));
            let sleeper = Arc::new(RecordingSleeper::default());

            let outcome = executor(&transport, &sleeper).execute(&request(), &RetryPolicy::default()).await;

            assert!(!outcome.succeeded, "status {}", status);
            assert_eq!(outcome.note.as_deref(), Some("denied"));
            assert_eq!(transport.call_count(), 1, "status {}", status);
            assert!(sleeper.sleeps().is_empty());
        }
    }

    #[tokio::test]
    async fn test_500_with_two_retries_makes_three_attempts() {
        let transport = Arc::new(ScriptedTransport::new(vec![ok(500), ok(500), ok(500)]));
        let sleeper = Arc::new(RecordingSleeper::default());

        let outcome = executor(&transport, &sleeper).execute(&request(), &RetryPolicy::new(2)).await;

        assert!(!outcome.succeeded);
        assert_eq!(outcome.status_code, 500);
        assert_eq!(outcome.attempts, 3);
        assert_eq!(transport.call_count(), 3);
        assert_eq!(
            sleeper.sleeps(),
            vec![Duration::from_millis(500), Duration::from_millis(1000)]
        );
    }

    #[tokio::test]
    async fn test_recovers_after_server_error() {
        let transport = Arc::new(ScriptedTransport::new(vec![ok(503), ok(200)]));
        let sleeper = Arc::new(RecordingSleeper::default());

        let outcome = executor(&transport, &sleeper).execute(&request(), &RetryPolicy::default()).await;

        assert!(outcome.succeeded);
        assert_eq!(outcome.attempts, 2);
        assert_eq!(sleeper.sleeps(), vec![Duration::from_millis(500)]);
    }

    #[tokio::test]
    async fn test_network_errors_exhaust_budget() {
        let transport = Arc::new(ScriptedTransport::new(vec![
            Err(TransportError::Timeout),
            Err(TransportError::Timeout),
            Err(TransportError::Timeout),
        ]));
        let sleeper = Arc::new(RecordingSleeper::default());

        let outcome = executor(&transport, &sleeper).execute(&request(), &RetryPolicy::default()).await;

        assert_eq!(outcome.status_code, -1);
        assert_eq!(outcome.note.as_deref(), Some("NETWORK_ERROR:Timeout"));
        assert_eq!(transport.call_count(), 3);
        assert_eq!(sleeper.sleeps().len(), 2);
    }

    #[tokio::test]
    async fn test_request_forwarded_unchanged() {
        let transport = Arc::new(ScriptedTransport::new(vec![ok(200)]));
        let sleeper = Arc::new(RecordingSleeper::default());

        executor(&transport, &sleeper).execute(&request(), &RetryPolicy::default()).await;

        assert_eq!(transport.requests(), vec![request()]);
    }
}
