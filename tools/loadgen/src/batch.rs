//! Batch runner
//!
//! Feeds an ordered input through one fixed action, one record at a time,
//! and counts outcomes. A failed record is counted and skipped; the only
//! fatal condition is an empty input.

use std::fmt;
use std::future::Future;
use thiserror::Error;
use tracing::{debug, info};
use types::outcome::ActionOutcome;
use types::tally::BatchTally;

/// Records between progress lines
pub const PROGRESS_EVERY: usize = 1000;

const SEPARATOR_WIDTH: usize = 50;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BatchError {
    #[error("no input records loaded")]
    EmptyInput,
}

/// Which seeding batch is running; decides the wording of log lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BatchKind {
    CreateWallets,
    DepositCash,
    ReserveStock,
}

impl BatchKind {
    /// What one input record is
    pub fn unit(&self) -> &'static str {
        match self {
            BatchKind::CreateWallets | BatchKind::DepositCash => "users",
            BatchKind::ReserveStock => "wallets",
        }
    }

    /// What one successful action is
    pub fn noun(&self) -> &'static str {
        match self {
            BatchKind::CreateWallets => "creations",
            BatchKind::DepositCash => "deposits",
            BatchKind::ReserveStock => "reservations",
        }
    }

    pub fn command(&self) -> &'static str {
        match self {
            BatchKind::CreateWallets => "create-wallets",
            BatchKind::DepositCash => "deposit-cash",
            BatchKind::ReserveStock => "reserve-stock",
        }
    }
}

impl fmt::Display for BatchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.command())
    }
}

/// Sequential batch driver
#[derive(Debug, Clone)]
pub struct BatchRunner {
    kind: BatchKind,
    progress_every: usize,
}

impl BatchRunner {
    pub fn new(kind: BatchKind) -> Self {
        Self {
            kind,
            progress_every: PROGRESS_EVERY,
        }
    }

    pub fn with_progress_every(mut self, every: usize) -> Self {
        self.progress_every = every.max(1);
        self
    }

    /// Run `action` once per item, in order.
    ///
    /// Returns `BatchError::EmptyInput` without calling `action` if `items` is empty.
    pub async fn run<I, F, Fut>(&self, items: Vec<I>, mut action: F) -> Result<BatchTally, BatchError>
    where
        F: FnMut(I) -> Fut,
        Fut: Future<Output = ActionOutcome>,
    {
        if items.is_empty() {
            return Err(BatchError::EmptyInput);
        }

        let total = items.len();
        let mut tally = BatchTally::new(total as u64);
        info!(batch = %self.kind, total, "starting batch");

        for (index, item) in items.into_iter().enumerate() {
            let outcome = action(item).await;
            if !outcome.succeeded {
                debug!(
                    batch = %self.kind,
                    record = index + 1,
                    status = outcome.status_code,
                    note = outcome.note.as_deref().unwrap_or(""),
                    "record failed"
                );
            }
            tally.record(outcome.succeeded);

            let processed = index + 1;
            if processed % self.progress_every == 0 {
                info!(
                    "Processed {}/{} {} (Success: {}, Failed: {})",
                    processed,
                    total,
                    self.kind.unit(),
                    tally.success_count,
                    tally.fail_count
                );
            }
        }

        Ok(tally)
    }
}

/// Closing summary block printed after a batch
pub fn format_summary(kind: BatchKind, tally: &BatchTally) -> String {
    format!(
        "{}\nSuccessful {}: {}\nFailed {}: {}\nSuccess rate: {}",
        "-".repeat(SEPARATOR_WIDTH),
        kind.noun(),
        tally.success_count,
        kind.noun(),
        tally.fail_count,
        tally.success_rate_display()
    )
}
