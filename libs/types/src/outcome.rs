//! Classified result of one resilient HTTP action
//!
//! Every executor invocation is reduced to an `ActionOutcome` before the batch
//! runner counts it. No error crosses the per-record boundary.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Status code sentinel for failures where no HTTP response was received
pub const NETWORK_FAILURE_STATUS: i32 = -1;

/// Note attached to a 409 that is treated as idempotent success
pub const NOTE_ALREADY_EXISTS: &str = "ALREADY_EXISTS";
/// Note for a 4xx response with an empty body
pub const NOTE_CLIENT_ERROR: &str = "CLIENT_ERROR";
/// Note for an unexpected or exhausted status with an empty body
pub const NOTE_UNEXPECTED_STATUS: &str = "UNEXPECTED_STATUS";
/// Prefix of the note for network-level failures
pub const NOTE_NETWORK_ERROR: &str = "NETWORK_ERROR";

/// Failure taxonomy of an HTTP action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FailureClass {
    /// 4xx: definitive rejection, never retried
    ClientError,
    /// 5xx: retried up to the budget
    ServerError,
    /// Connection refused or timed out: retried like `ServerError`
    NetworkError,
    /// Anything outside 2xx/4xx/5xx: never retried
    UnexpectedStatus,
}

impl FailureClass {
    /// Classify a status code; `None` for 2xx.
    pub fn of_status(status: u16) -> Option<Self> {
        match status {
            200..=299 => None,
            400..=499 => Some(FailureClass::ClientError),
            500..=599 => Some(FailureClass::ServerError),
            _ => Some(FailureClass::UnexpectedStatus),
        }
    }

    /// Whether a failure of this class may be retried
    pub fn is_retryable(&self) -> bool {
        matches!(self, FailureClass::ServerError | FailureClass::NetworkError)
    }
}

/// Outcome of one executor invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionOutcome {
    pub succeeded: bool,
    /// Last HTTP status, or `NETWORK_FAILURE_STATUS`
    pub status_code: i32,
    /// Failure classification note, `ALREADY_EXISTS` on idempotent success
    pub note: Option<String>,
    /// Body of the last response (empty on network failure)
    #[serde(default)]
    pub body: String,
    /// Number of requests issued (initial attempt plus retries)
    pub attempts: u32,
}

impl ActionOutcome {
    pub fn success(status: u16, body: String, attempts: u32) -> Self {
        Self {
            succeeded: true,
            status_code: i32::from(status),
            note: None,
            body,
            attempts,
        }
    }

    /// Success with a note, e.g. an already-existing resource
    pub fn success_with_note(status: u16, note: &str, body: String, attempts: u32) -> Self {
        Self {
            succeeded: true,
            status_code: i32::from(status),
            note: Some(note.to_string()),
            body,
            attempts,
        }
    }

    /// Failure carrying the response body as note, or `fallback` if the body is blank.
    pub fn http_failure(status: u16, body: String, fallback: &str, attempts: u32) -> Self {
        let trimmed = body.trim();
        let note = if trimmed.is_empty() {
            fallback.to_string()
        } else {
            trimmed.to_string()
        };
        Self {
            succeeded: false,
            status_code: i32::from(status),
            note: Some(note),
            body,
            attempts,
        }
    }

    /// Failure with no HTTP response; `kind` names the transport error.
    pub fn network_failure(kind: &str, attempts: u32) -> Self {
        Self {
            succeeded: false,
            status_code: NETWORK_FAILURE_STATUS,
            note: Some(format!("{}:{}", NOTE_NETWORK_ERROR, kind)),
            body: String::new(),
            attempts,
        }
    }

    /// Failure class derived from the recorded status
    pub fn failure_class(&self) -> Option<FailureClass> {
        if self.succeeded {
            return None;
        }
        if self.status_code == NETWORK_FAILURE_STATUS {
            return Some(FailureClass::NetworkError);
        }
        match u16::try_from(self.status_code) {
            Ok(status) => FailureClass::of_status(status),
            Err(_) => Some(FailureClass::UnexpectedStatus),
        }
    }
}

impl fmt::Display for ActionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verdict = if self.succeeded { "ok" } else { "failed" };
        match &self.note {
            Some(note) => write!(f, "{} ({}): {}", verdict, self.status_code, note),
            None => write!(f, "{} ({})", verdict, self.status_code),
        }
    }
}
