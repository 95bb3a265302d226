//! Run report export
//!
//! Serializes the outcome of a batch, login or swarm run to JSON for
//! external consumption.

use crate::login::LoginSummary;
use crate::scenario::swarm::SwarmReport;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use types::tally::BatchTally;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to write report to {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// What the run produced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RunResult {
    Seed { users: usize },
    Login(LoginSummary),
    Batch { tally: BatchTally, success_rate: String },
    Swarm(SwarmReport),
}

impl RunResult {
    pub fn batch(tally: BatchTally) -> Self {
        RunResult::Batch {
            success_rate: tally.success_rate_display(),
            tally,
        }
    }
}

/// Complete report of one command invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub version: String,
    pub command: String,
    pub target: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub result: RunResult,
}

impl RunReport {
    /// Build a report finishing now.
    pub fn new(command: &str, target: &str, started_at: DateTime<Utc>, result: RunResult) -> Self {
        Self {
            version: crate::VERSION.to_string(),
            command: command.to_string(),
            target: target.to_string(),
            started_at,
            finished_at: Utc::now(),
            result,
        }
    }

    pub fn duration_ms(&self) -> i64 {
        (self.finished_at - self.started_at).num_milliseconds()
    }
}

/// Export a report as pretty-printed JSON.
pub fn export_json(report: &RunReport) -> Result<String, ReportError> {
    Ok(serde_json::to_string_pretty(report)?)
}

/// Write a report to a file path.
pub fn write_to_file(report: &RunReport, path: impl AsRef<Path>) -> Result<(), ReportError> {
    let path = path.as_ref();
    let json = export_json(report)?;
    std::fs::write(path, json).map_err(|source| ReportError::Write {
        path: path.display().to_string(),
        source,
    })
}
