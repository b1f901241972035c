//! Prometheus metrics infrastructure
//!
//! Recording functions are no-ops until a recorder is installed, so engines
//! can call them unconditionally.

use std::sync::Arc;

use metrics::{counter, gauge};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use super::config::MetricsConfig;

/// Prometheus metrics handle for rendering the exposition text
#[derive(Clone)]
pub struct PrometheusMetrics {
    handle: Arc<PrometheusHandle>,
}

impl std::fmt::Debug for PrometheusMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrometheusMetrics").finish_non_exhaustive()
    }
}

impl PrometheusMetrics {
    /// Get the metrics in Prometheus text format
    pub fn render(&self) -> String {
        self.handle.render()
    }
}

/// Initialize Prometheus metrics
pub fn init_metrics(config: &MetricsConfig) -> Option<PrometheusMetrics> {
    if !config.enabled {
        tracing::info!("Prometheus metrics disabled");
        return None;
    }

    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            gauge!("llm_cache_info", "version" => env!("CARGO_PKG_VERSION")).set(1.0);

            tracing::info!("Prometheus metrics recorder installed");

            Some(PrometheusMetrics {
                handle: Arc::new(handle),
            })
        }
        Err(e) => {
            tracing::error!("Failed to initialize Prometheus metrics: {}", e);
            None
        }
    }
}

/// Outcome of a cache lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupOutcome {
    /// Answered by the exact query text
    ExactHit,
    /// Answered by a similar entry
    SimilarityHit,
    /// No usable entry
    Miss,
}

impl LookupOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            LookupOutcome::ExactHit => "exact_hit",
            LookupOutcome::SimilarityHit => "similarity_hit",
            LookupOutcome::Miss => "miss",
        }
    }

    pub fn is_hit(&self) -> bool {
        !matches!(self, LookupOutcome::Miss)
    }
}

/// Record a cache lookup
pub fn record_lookup(engine: &'static str, outcome: LookupOutcome) {
    counter!(
        "llm_cache_lookups_total",
        "engine" => engine,
        "outcome" => outcome.as_str()
    )
    .increment(1);
}

/// Record a cache update
pub fn record_update(engine: &'static str, success: bool) {
    counter!(
        "llm_cache_updates_total",
        "engine" => engine,
        "status" => if success { "success" } else { "error" }
    )
    .increment(1);
}

/// Record an LRU eviction
pub fn record_eviction(engine: &'static str) {
    counter!("llm_cache_evictions_total", "engine" => engine).increment(1);
}

/// Record a failed, cancelled or timed out embedding call
pub fn record_embedding_failure(engine: &'static str, operation: &'static str) {
    counter!(
        "llm_cache_embedding_failures_total",
        "engine" => engine,
        "operation" => operation
    )
    .increment(1);
}
