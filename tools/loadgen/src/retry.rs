//! Retry state machine
//!
//! `transition` is a pure function from (attempt result, attempt index,
//! policy) to the next state. The executor owns the loop and the sleeping;
//! nothing in here touches a clock.
//!
//! Classification priority after each attempt:
//! 1. 2xx: success
//! 2. 409 when the policy treats conflicts as idempotent success
//! 3. 4xx: permanent failure, no retry
//! 4. 5xx: backoff if budget remains, otherwise exhausted
//! 5. transport failure: same as 5xx, reported with status -1
//! 6. anything else: permanent failure

use crate::config::RetryPolicy;
use crate::transport::{RawResponse, TransportError};
use std::time::Duration;
use types::outcome::{
    ActionOutcome, NOTE_ALREADY_EXISTS, NOTE_CLIENT_ERROR, NOTE_UNEXPECTED_STATUS,
};

/// What one attempt produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptResult {
    Response(RawResponse),
    Failed(TransportError),
}

impl From<Result<RawResponse, TransportError>> for AttemptResult {
    fn from(result: Result<RawResponse, TransportError>) -> Self {
        match result {
            Ok(resp) => AttemptResult::Response(resp),
            Err(err) => AttemptResult::Failed(err),
        }
    }
}

/// States of one resilient action
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryState {
    /// About to issue attempt `attempt` (0-based)
    Attempting { attempt: u32 },
    /// Attempt `attempt` failed transiently; wait `delay` before the next one
    Backoff { attempt: u32, delay: Duration },
    Succeeded(ActionOutcome),
    PermanentlyFailed(ActionOutcome),
    RetriesExhausted(ActionOutcome),
}

impl RetryState {
    pub fn initial() -> Self {
        RetryState::Attempting { attempt: 0 }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RetryState::Succeeded(_) | RetryState::PermanentlyFailed(_) | RetryState::RetriesExhausted(_)
        )
    }

    /// Final outcome, if the state is terminal
    pub fn into_outcome(self) -> Option<ActionOutcome> {
        match self {
            RetryState::Succeeded(o) | RetryState::PermanentlyFailed(o) | RetryState::RetriesExhausted(o) => Some(o),
            RetryState::Attempting { .. } | RetryState::Backoff { .. } => None,
        }
    }
}

/// Next state after attempt `attempt` (0-based) produced `result`.
pub fn transition(result: AttemptResult, attempt: u32, policy: &RetryPolicy) -> RetryState {
    let attempts = attempt + 1;
    let budget_left = attempt < policy.max_retries;

    match result {
        AttemptResult::Response(RawResponse { status, body }) => match status {
            200..=299 => RetryState::Succeeded(ActionOutcome::success(status, body, attempts)),
            409 if policy.conflict_is_success => RetryState::Succeeded(
                ActionOutcome::success_with_note(status, NOTE_ALREADY_EXISTS, body, attempts),
            ),
            400..=499 => RetryState::PermanentlyFailed(ActionOutcome::http_failure(
                status,
                body,
                NOTE_CLIENT_ERROR,
                attempts,
            )),
            500..=599 if budget_left => RetryState::Backoff {
                attempt,
                delay: policy.backoff_for(attempt),
            },
            500..=599 => RetryState::RetriesExhausted(ActionOutcome::http_failure(
                status,
                body,
                NOTE_UNEXPECTED_STATUS,
                attempts,
            )),
            _ => RetryState::PermanentlyFailed(ActionOutcome::http_failure(
                status,
                body,
                NOTE_UNEXPECTED_STATUS,
                attempts,
            )),
        },
        AttemptResult::Failed(_) if budget_left => RetryState::Backoff {
            attempt,
            delay: policy.backoff_for(attempt),
        },
        AttemptResult::Failed(err) => {
            RetryState::RetriesExhausted(ActionOutcome::network_failure(err.kind_name(), attempts))
        }
    }
}
