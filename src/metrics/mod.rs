//! Routing metrics recorded by callers of the router
//!
//! The router itself keeps no mutable state; front ends that want running
//! totals record each outcome here.

use crate::providers::{GenerationResult, ProviderKind};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Per-provider counters
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProviderMetrics {
    /// Requests answered by this provider
    pub requests: u64,
    /// Input tokens consumed
    pub input_tokens: u64,
    /// Output tokens generated
    pub output_tokens: u64,
    /// Accumulated cost (USD)
    pub cost: f64,
}

/// Routing outcome metrics
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoutingMetrics {
    pub local: ProviderMetrics,
    pub cloud: ProviderMetrics,
    /// Successful requests answered by a fallback candidate
    pub fallbacks: u64,
    /// Requests that ended in a routing error
    pub failures: u64,
    #[serde(skip)]
    pub started: Option<Instant>,
}

impl RoutingMetrics {
    pub fn new() -> Self {
        Self {
            started: Some(Instant::now()),
            ..Default::default()
        }
    }

    pub fn provider_mut(&mut self, kind: ProviderKind) -> &mut ProviderMetrics {
        match kind {
            ProviderKind::Local => &mut self.local,
            ProviderKind::Cloud => &mut self.cloud,
        }
    }

    pub fn record_result(&mut self, result: &GenerationResult) {
        let provider = self.provider_mut(result.provider);
        provider.requests += 1;
        provider.input_tokens += result.usage.input_tokens as u64;
        provider.output_tokens += result.usage.output_tokens as u64;
        provider.cost += result.cost;

        if result.fallback {
            self.fallbacks += 1;
        }
    }

    pub fn record_failure(&mut self) {
        self.failures += 1;
    }

    pub fn request_count(&self) -> u64 {
        self.local.requests + self.cloud.requests
    }

    pub fn total_tokens(&self) -> u64 {
        self.local.input_tokens
            + self.local.output_tokens
            + self.cloud.input_tokens
            + self.cloud.output_tokens
    }

    /// Share of answered requests served locally (0.0 - 1.0)
    pub fn local_share(&self) -> f64 {
        let total = self.request_count();
        if total == 0 {
            return 0.0;
        }
        self.local.requests as f64 / total as f64
    }
}

/// Thread-safe metrics tracker
#[derive(Clone)]
pub struct MetricsTracker {
    inner: Arc<Mutex<RoutingMetrics>>,
}

impl MetricsTracker {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(RoutingMetrics::new())),
        }
    }

    pub fn record_result(&self, result: &GenerationResult) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.record_result(result);
        }
    }

    pub fn record_failure(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.record_failure();
        }
    }

    pub fn get_metrics(&self) -> RoutingMetrics {
        self.inner
            .lock()
            .map(|m| m.clone())
            .unwrap_or_default()
    }

    pub fn summary(&self) -> MetricsSummary {
        let metrics = self.get_metrics();
        MetricsSummary {
            request_count: metrics.request_count(),
            local_requests: metrics.local.requests,
            cloud_requests: metrics.cloud.requests,
            fallbacks: metrics.fallbacks,
            failures: metrics.failures,
            total_tokens: metrics.total_tokens(),
            total_cost: metrics.cloud.cost + metrics.local.cost,
            local_share: metrics.local_share(),
            elapsed: metrics.started.map(|s| s.elapsed()).unwrap_or_default(),
        }
    }
}

impl Default for MetricsTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MetricsSummary {
    pub request_count: u64,
    pub local_requests: u64,
    pub cloud_requests: u64,
    pub fallbacks: u64,
    pub failures: u64,
    pub total_tokens: u64,
    pub total_cost: f64,
    pub local_share: f64,
    #[serde(skip)]
    pub elapsed: Duration,
}

impl std::fmt::Display for MetricsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Routing Summary ===")?;
        writeln!(f, "Requests: {} ({} local, {} cloud)", self.request_count, self.local_requests, self.cloud_requests)?;
        writeln!(f, "Served locally: {:.1}%", self.local_share * 100.0)?;
        writeln!(f, "Fallbacks: {}", self.fallbacks)?;
        writeln!(f, "Failures: {}", self.failures)?;
        writeln!(f, "Total tokens: {}", self.total_tokens)?;
        writeln!(f, "Total cost: ${:.4}", self.total_cost)?;
        writeln!(f, "Elapsed: {:.1}s", self.elapsed.as_secs_f64())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::TokenUsage;

    fn result(provider: ProviderKind, cost: f64, fallback: bool) -> GenerationResult {
        GenerationResult {
            content: String::new(),
            provider,
            model: "m".to_string(),
            usage: TokenUsage::new(100, 50),
            cost,
            fallback,
        }
    }

    #[test]
    fn test_record_results() {
        let tracker = MetricsTracker::new();
        tracker.record_result(&result(ProviderKind::Local, 0.0, false));
        tracker.record_result(&result(ProviderKind::Cloud, 0.01, true));
        tracker.record_failure();

        let summary = tracker.summary();
        assert_eq!(summary.request_count, 2);
        assert_eq!(summary.local_requests, 1);
        assert_eq!(summary.fallbacks, 1);
        assert_eq!(summary.failures, 1);
        assert_eq!(summary.total_tokens, 300);
        assert!((summary.total_cost - 0.01).abs() < 1e-9);
        assert!((summary.local_share - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_empty_share() {
        assert_eq!(RoutingMetrics::default().local_share(), 0.0);
    }

    #[test]
    fn test_summary_display() {
        let tracker = MetricsTracker::default();
        tracker.record_result(&result(ProviderKind::Cloud, 0.5, false));
        let text = tracker.summary().to_string();
        assert!(text.contains("Requests: 1 (0 local, 1 cloud)"));
        assert!(text.contains("$0.5000"));
    }

    #[test]
    fn test_summary_shows_elapsed() {
        let mut summary = MetricsTracker::new().summary();
        summary.elapsed = Duration::from_millis(90_500);
        assert!(summary.to_string().contains("Elapsed: 90.5s"));
    }
}
