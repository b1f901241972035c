//! Cache engine configuration

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::embedding::MetricKind;
use crate::domain::DomainError;

/// Supported engine strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineType {
    /// Exact query text match only
    Exact,
    /// Exact match first, then embedding similarity
    #[default]
    Similarity,
}

impl std::fmt::Display for EngineType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineType::Exact => write!(f, "exact"),
            EngineType::Similarity => write!(f, "similarity"),
        }
    }
}

impl std::str::FromStr for EngineType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "exact" | "lru" => Ok(EngineType::Exact),
            "similarity" | "semantic" => Ok(EngineType::Similarity),
            _ => Err(DomainError::configuration(format!(
                "Unknown engine type: {}. Valid types: exact, similarity",
                s
            ))),
        }
    }
}

/// How a similarity scan picks among qualifying entries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchPolicy {
    /// Scan every entry and return the closest qualifying one
    #[default]
    Best,
    /// Return the first qualifying entry found
    First,
}

/// Configuration for a cache engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Engine strategy
    #[serde(default)]
    pub engine: EngineType,

    /// Maximum number of entries to store
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,

    /// Metric used to compare embeddings
    #[serde(default)]
    pub metric: MetricKind,

    /// Acceptance threshold; the metric's default when unset.
    /// Similarity metrics must exceed it, distance metrics must stay below it.
    #[serde(default)]
    pub threshold: Option<f32>,

    /// Selection among qualifying entries
    #[serde(default)]
    pub match_policy: MatchPolicy,

    /// Upper bound on a single embedding call in milliseconds
    #[serde(default)]
    pub embed_timeout_ms: Option<u64>,
}

fn default_max_entries() -> usize {
    1000
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            engine: EngineType::default(),
            max_entries: default_max_entries(),
            metric: MetricKind::default(),
            threshold: None,
            match_policy: MatchPolicy::default(),
            embed_timeout_ms: None,
        }
    }
}

impl EngineConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a config for the exact engine
    pub fn exact() -> Self {
        Self::default().with_engine(EngineType::Exact)
    }

    /// Create a config for the similarity engine
    pub fn similarity() -> Self {
        Self::default().with_engine(EngineType::Similarity)
    }

    /// Set the engine strategy
    pub fn with_engine(mut self, engine: EngineType) -> Self {
        self.engine = engine;
        self
    }

    /// Set the maximum number of entries
    pub fn with_max_entries(mut self, max: usize) -> Self {
        self.max_entries = max;
        self
    }

    /// Set the metric
    pub fn with_metric(mut self, metric: MetricKind) -> Self {
        self.metric = metric;
        self
    }

    /// Set the threshold
    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = Some(threshold);
        self
    }

    /// Set the match policy
    pub fn with_match_policy(mut self, policy: MatchPolicy) -> Self {
        self.match_policy = policy;
        self
    }

    /// Set the embedding timeout
    pub fn with_embed_timeout(mut self, timeout: Duration) -> Self {
        self.embed_timeout_ms = Some(timeout.as_millis() as u64);
        self
    }

    /// Effective threshold
    pub fn threshold(&self) -> f32 {
        self.threshold
            .unwrap_or_else(|| self.metric.default_threshold())
    }

    /// Embedding timeout as Duration
    pub fn embed_timeout(&self) -> Option<Duration> {
        self.embed_timeout_ms.map(Duration::from_millis)
    }

    /// Reject settings that cannot produce a working engine
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.max_entries == 0 {
            return Err(DomainError::configuration(
                "max_entries must be greater than zero",
            ));
        }

        if !self.threshold().is_finite() {
            return Err(DomainError::configuration("threshold must be a finite number"));
        }

        if self.embed_timeout_ms == Some(0) {
            return Err(DomainError::configuration(
                "embed_timeout_ms must be greater than zero",
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();

        assert_eq!(config.engine, EngineType::Similarity);
        assert_eq!(config.max_entries, 1000);
        assert_eq!(config.metric, MetricKind::Cosine);
        assert!((config.threshold() - 0.95).abs() < 0.0001);
        assert_eq!(config.match_policy, MatchPolicy::Best);
        assert!(config.embed_timeout().is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_builder() {
        let config = EngineConfig::similarity()
            .with_max_entries(10)
            .with_metric(MetricKind::SquaredL2)
            .with_threshold(0.25)
            .with_match_policy(MatchPolicy::First)
            .with_embed_timeout(Duration::from_millis(1500));

        assert_eq!(config.max_entries, 10);
        assert_eq!(config.metric, MetricKind::SquaredL2);
        assert!((config.threshold() - 0.25).abs() < 0.0001);
        assert_eq!(config.match_policy, MatchPolicy::First);
        assert_eq!(config.embed_timeout(), Some(Duration::from_millis(1500)));
    }

    #[test]
    fn test_threshold_follows_metric_default() {
        let config = EngineConfig::new().with_metric(MetricKind::SquaredL2);

        assert!((config.threshold() - 0.5).abs() < 0.0001);
    }

    #[test]
    fn test_validate_rejects_zero_capacity() {
        let result = EngineConfig::exact().with_max_entries(0).validate();

        assert!(matches!(result, Err(DomainError::Configuration { .. })));
    }

    #[test]
    fn test_validate_rejects_nan_threshold() {
        let result = EngineConfig::new().with_threshold(f32::NAN).validate();

        assert!(result.is_err());
    }

    #[test]
    fn test_engine_type_from_str() {
        assert_eq!("exact".parse::<EngineType>().unwrap(), EngineType::Exact);
        assert_eq!("LRU".parse::<EngineType>().unwrap(), EngineType::Exact);
        assert_eq!("semantic".parse::<EngineType>().unwrap(), EngineType::Similarity);
        assert!("redis".parse::<EngineType>().is_err());
        assert_eq!(EngineType::Similarity.to_string(), "similarity");
    }

    #[test]
    fn test_deserialize_partial() {
        let config: EngineConfig =
            serde_json::from_str(r#"{"engine": "exact", "max_entries": 5}"#).unwrap();

        assert_eq!(config.engine, EngineType::Exact);
        assert_eq!(config.max_entries, 5);
        assert_eq!(config.metric, MetricKind::Cosine);
        assert_eq!(config.match_policy, MatchPolicy::Best);
    }
}
