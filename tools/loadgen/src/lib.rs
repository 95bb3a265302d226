//! Data Seeding & Load Generation Tools
//!
//! Seeds an exchange deployment with users, tokens, cash and stock, then
//! drives it with a swarm of virtual users. Every seeding call goes through a
//! retrying executor whose outcome is classified and counted per record.
//!
//! # Modules
//! - `config`: Target address, timeouts and retry policy
//! - `endpoints`: Exchange API endpoints
//! - `transport`: HTTP transport seam
//! - `retry`: Retry state machine
//! - `executor`: Resilient action executor
//! - `credentials`: Colon-delimited credential and seed files
//! - `jwt`: Access-token subject extraction
//! - `batch`: Sequential batch runner and summary
//! - `jobs`: Wallet creation, cash deposit and stock reservation batches
//! - `login`: Token acquisition for seed users
//! - `seed`: Seed-user generation
//! - `scenario`: Virtual-user swarm
//! - `metrics`: Per-endpoint request counters and latency histograms
//! - `report`: JSON run report export

pub mod config;
pub mod endpoints;
pub mod transport;
pub mod retry;
pub mod executor;
pub mod credentials;
pub mod jwt;
pub mod batch;
pub mod jobs;
pub mod login;
pub mod seed;
pub mod scenario;
pub mod metrics;
pub mod report;

#[cfg(test)]
mod testing;

/// Crate version constant
pub const VERSION: &str = "1.0.0";
