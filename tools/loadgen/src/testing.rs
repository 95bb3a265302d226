//! Test doubles for the transport and sleeper seams

use crate::executor::Sleeper;
use crate::transport::{ActionRequest, RawResponse, Transport, TransportError};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

type Responder = Box<dyn Fn(&ActionRequest) -> Result<RawResponse, TransportError> + Send + Sync>;

/// Replays a fixed script of results, then answers with the fallback
pub struct ScriptedTransport {
    script: Mutex<VecDeque<Result<RawResponse, TransportError>>>,
    fallback: Responder,
    requests: Mutex<Vec<ActionRequest>>,
}

impl ScriptedTransport {
    pub fn new(script: Vec<Result<RawResponse, TransportError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            fallback: Box::new(|_| Ok(RawResponse { status: 200, body: String::new() })),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Answer every request through `responder`
    pub fn responding<F>(responder: F) -> Self
    where
        F: Fn(&ActionRequest) -> Result<RawResponse, TransportError> + Send + Sync + 'static,
    {
        Self {
            script: Mutex::new(VecDeque::new()),
            fallback: Box::new(responder),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<ActionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: &ActionRequest) -> Result<RawResponse, TransportError> {
        self.requests.lock().unwrap().push(request.clone());
        let scripted = self.script.lock().unwrap().pop_front();
        match scripted {
            Some(result) => result,
            None => (self.fallback)(request),
        }
    }
}

/// Records requested sleeps without waiting
#[derive(Default)]
pub struct RecordingSleeper {
    sleeps: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().unwrap().clone()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.sleeps.lock().unwrap().push(duration);
    }
}
