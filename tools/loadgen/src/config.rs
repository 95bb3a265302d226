//! Target and retry configuration
//!
//! Defaults mirror how the seeding scripts are run against a local stack:
//! `http://localhost:8080`, 5 second per-attempt timeout, 2 retries.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Environment variable overriding the target host
pub const BASE_URL_ENV: &str = "BASE_URL";
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";
pub const DEFAULT_TIMEOUT_SECS: u64 = 5;
pub const DEFAULT_MAX_RETRIES: u32 = 2;
/// Backoff unit: attempt `i` (0-based) waits `unit * (i + 1)`
pub const DEFAULT_BACKOFF_UNIT_MS: u64 = 500;

/// Where requests go and how long each attempt may take
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetConfig {
    /// Base URL without trailing slash
    pub base_url: String,
    /// Per-attempt timeout; no timeout spans several attempts
    pub timeout: Duration,
}

impl TargetConfig {
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        Self {
            base_url: normalize_base_url(base_url),
            timeout,
        }
    }

    /// Read `BASE_URL` from the environment, falling back to the default.
    pub fn from_env() -> Self {
        let base_url = std::env::var(BASE_URL_ENV).unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        Self::new(&base_url, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Absolute URL for an API path starting with `/`
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }
}

/// Strip every trailing slash from a base URL
pub fn normalize_base_url(raw: &str) -> String {
    raw.trim().trim_end_matches('/').to_string()
}

/// Bounded linear-backoff retry policy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Retries after the initial attempt; total attempts = `max_retries + 1`
    pub max_retries: u32,
    /// Linear backoff unit
    pub backoff_unit: Duration,
    /// Treat HTTP 409 as idempotent success (`ALREADY_EXISTS`)
    pub conflict_is_success: bool,
}

impl RetryPolicy {
    pub fn new(max_retries: u32) -> Self {
        Self {
            max_retries,
            ..Self::default()
        }
    }

    /// Same policy, with 409 accepted as "resource already exists"
    pub fn idempotent_create(mut self) -> Self {
        self.conflict_is_success = true;
        self
    }

    /// Delay before the retry that follows attempt `attempt` (0-based)
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        self.backoff_unit * (attempt + 1)
    }

    /// Total number of requests the policy allows
    pub fn max_attempts(&self) -> u32 {
        self.max_retries + 1
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            backoff_unit: Duration::from_millis(DEFAULT_BACKOFF_UNIT_MS),
            conflict_is_success: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_slashes_stripped() {
        assert_eq!(normalize_base_url("http://host:8080/"), "http://host:8080");
        assert_eq!(normalize_base_url("http://host:8080///"), "http://host:8080");
        assert_eq!(normalize_base_url("http://host:8080"), "http://host:8080");
    }

    #[test]
    fn test_url_join() {
        let target = TargetConfig::new("http://localhost:9000/", Duration::from_secs(1));
        assert_eq!(target.url("/api/v1/cash-wallet"), "http://localhost:9000/api/v1/cash-wallet");
    }

    #[test]
    fn test_default_target() {
        let target = TargetConfig::default();
        assert_eq!(target.base_url, "http://localhost:8080");
        assert_eq!(target.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_linear_backoff() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.backoff_for(0), Duration::from_millis(500));
        assert_eq!(policy.backoff_for(1), Duration::from_millis(1000));
        assert_eq!(policy.backoff_for(2), Duration::from_millis(1500));
        assert_eq!(policy.max_attempts(), 3);
    }

    #[test]
    fn test_idempotent_create_only_flips_conflict() {
        let policy = RetryPolicy::new(4).idempotent_create();
        assert!(policy.conflict_is_success);
        assert_eq!(policy.max_retries, 4);
        assert!(!RetryPolicy::default().conflict_is_success);
    }
}
