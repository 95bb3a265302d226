//! Request metrics for swarm runs
//!
//! Tracks per-endpoint request counts, failures and latency histograms.
//! `SwarmMetrics` is shared by every virtual user; entries are keyed by the
//! endpoint name so path ids collapse into one row.

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Latency histogram bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LatencyBucket {
    pub label: String,
    pub lower_ms: u64,
    pub upper_ms: u64,
    pub count: u64,
}

/// Counters for one endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointStats {
    pub name: String,
    pub requests: u64,
    pub failures: u64,
    /// Requests that never got a response
    pub network_failures: u64,
    pub total_latency_ms: u64,
    pub max_latency_ms: u64,
    pub latency_buckets: Vec<LatencyBucket>,
}

impl EndpointStats {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            requests: 0,
            failures: 0,
            network_failures: 0,
            total_latency_ms: 0,
            max_latency_ms: 0,
            latency_buckets: default_buckets(),
        }
    }

    fn record_latency(&mut self, latency_ms: u64) {
        self.total_latency_ms += latency_ms;
        self.max_latency_ms = self.max_latency_ms.max(latency_ms);
        for bucket in &mut self.latency_buckets {
            if latency_ms >= bucket.lower_ms && latency_ms < bucket.upper_ms {
                bucket.count += 1;
                return;
            }
        }
        // Overflow bucket (last)
        if let Some(last) = self.latency_buckets.last_mut() {
            last.count += 1;
        }
    }

    pub fn average_latency_ms(&self) -> f64 {
        if self.requests == 0 {
            return 0.0;
        }
        self.total_latency_ms as f64 / self.requests as f64
    }

    pub fn failure_rate(&self) -> f64 {
        if self.requests == 0 {
            return 0.0;
        }
        self.failures as f64 / self.requests as f64 * 100.0
    }
}

/// How one scenario request ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestResult {
    Status(u16),
    TransportFailure,
}

impl RequestResult {
    pub fn is_success(&self) -> bool {
        matches!(self, RequestResult::Status(status) if (200..300).contains(status))
    }
}

/// Aggregated request metrics, safe to share across tasks.
#[derive(Debug, Default)]
pub struct SwarmMetrics {
    endpoints: DashMap<&'static str, EndpointStats>,
}

impl SwarmMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one request against `endpoint`.
    pub fn record(&self, endpoint: &'static str, result: RequestResult, latency: Duration) {
        let mut stats = self
            .endpoints
            .entry(endpoint)
            .or_insert_with(|| EndpointStats::new(endpoint));
        stats.requests += 1;
        if !result.is_success() {
            stats.failures += 1;
        }
        if result == RequestResult::TransportFailure {
            stats.network_failures += 1;
        }
        stats.record_latency(latency.as_millis() as u64);
    }

    pub fn total_requests(&self) -> u64 {
        self.endpoints.iter().map(|e| e.requests).sum()
    }

    pub fn total_failures(&self) -> u64 {
        self.endpoints.iter().map(|e| e.failures).sum()
    }

    pub fn endpoint(&self, name: &str) -> Option<EndpointStats> {
        self.endpoints.get(name).map(|e| e.clone())
    }

    /// Point-in-time copy, endpoints sorted by name.
    pub fn snapshot(&self, elapsed: Duration) -> MetricsSnapshot {
        let mut endpoints: Vec<EndpointStats> = self.endpoints.iter().map(|e| e.value().clone()).collect();
        endpoints.sort_by(|a, b| a.name.cmp(&b.name));
        MetricsSnapshot {
            total_requests: endpoints.iter().map(|e| e.requests).sum(),
            total_failures: endpoints.iter().map(|e| e.failures).sum(),
            elapsed_ms: elapsed.as_millis() as u64,
            endpoints,
        }
    }
}

/// Serializable copy of `SwarmMetrics`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub total_requests: u64,
    pub total_failures: u64,
    pub elapsed_ms: u64,
    pub endpoints: Vec<EndpointStats>,
}

impl MetricsSnapshot {
    /// Throughput: requests per second.
    pub fn requests_per_second(&self) -> f64 {
        if self.elapsed_ms == 0 {
            return 0.0;
        }
        self.total_requests as f64 / (self.elapsed_ms as f64 / 1_000.0)
    }

    /// Build a summary string.
    pub fn summary(&self) -> String {
        let mut out = format!(
            "Requests: {} | Failures: {} | Throughput: {:.1} req/s",
            self.total_requests,
            self.total_failures,
            self.requests_per_second(),
        );
        for endpoint in &self.endpoints {
            out.push_str(&format!(
                "\n  {:<28} {:>8} req {:>6} fail ({:.1}%) avg {:.0}ms max {}ms",
                endpoint.name,
                endpoint.requests,
                endpoint.failures,
                endpoint.failure_rate(),
                endpoint.average_latency_ms(),
                endpoint.max_latency_ms,
            ));
        }
        out
    }
}

/// Default latency histogram buckets.
fn default_buckets() -> Vec<LatencyBucket> {
    vec![
        LatencyBucket { label: "<10ms".into(), lower_ms: 0, upper_ms: 10, count: 0 },
        LatencyBucket { label: "10-50ms".into(), lower_ms: 10, upper_ms: 50, count: 0 },
        LatencyBucket { label: "50-100ms".into(), lower_ms: 50, upper_ms: 100, count: 0 },
        LatencyBucket { label: "100-500ms".into(), lower_ms: 100, upper_ms: 500, count: 0 },
        LatencyBucket { label: "500ms-1s".into(), lower_ms: 500, upper_ms: 1_000, count: 0 },
        LatencyBucket { label: "1-5s".into(), lower_ms: 1_000, upper_ms: 5_000, count: 0 },
        LatencyBucket { label: ">5s".into(), lower_ms: 5_000, upper_ms: u64::MAX, count: 0 },
    ]
}
