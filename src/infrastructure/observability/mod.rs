//! Observability infrastructure - Prometheus metrics

mod config;
mod metrics;

pub use config::MetricsConfig;
pub use metrics::{
    init_metrics, record_embedding_failure, record_eviction, record_lookup, record_update,
    LookupOutcome, PrometheusMetrics,
};
