//! Vector distance and similarity functions
//!
//! All functions are pure and never fail. Degenerate input (mismatched
//! lengths, empty vectors, zero magnitude) resolves to the function's neutral
//! value: `0.0` for similarities and `f32::INFINITY` for distances, so a
//! degenerate pair never falls within a threshold.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

/// Shape shared by every metric function
pub type MetricFn = fn(&[f32], &[f32]) -> f32;

/// Calculate cosine similarity between two vectors
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}

/// Calculate the squared Euclidean distance between two vectors
pub fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return f32::INFINITY;
    }

    a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let diff = x - y;
            diff * diff
        })
        .sum()
}

/// A metric together with the direction in which it measures closeness
///
/// The direction decides how the configured threshold is applied, so a
/// distance function can never be paired with a similarity comparison.
#[derive(Clone, Copy)]
pub enum Metric {
    /// Higher is closer; a candidate qualifies when `score > threshold`
    Similarity(MetricFn),
    /// Lower is closer; a candidate qualifies when `score < threshold`
    Distance(MetricFn),
}

impl Metric {
    /// Cosine similarity in [-1, 1]
    pub const COSINE: Metric = Metric::Similarity(cosine_similarity);

    /// Squared Euclidean distance in [0, inf)
    pub const SQUARED_L2: Metric = Metric::Distance(squared_l2);

    /// Compute the metric between two vectors
    pub fn score(&self, a: &[f32], b: &[f32]) -> f32 {
        match self {
            Metric::Similarity(f) | Metric::Distance(f) => f(a, b),
        }
    }

    /// Whether a score falls within the acceptance threshold
    pub fn qualifies(&self, score: f32, threshold: f32) -> bool {
        match self {
            Metric::Similarity(_) => score > threshold,
            Metric::Distance(_) => score < threshold,
        }
    }

    /// Whether `candidate` is strictly closer than `current`
    pub fn is_closer(&self, candidate: f32, current: f32) -> bool {
        match self {
            Metric::Similarity(_) => candidate > current,
            Metric::Distance(_) => candidate < current,
        }
    }

    /// Whether higher scores mean closer vectors
    pub fn is_similarity(&self) -> bool {
        matches!(self, Metric::Similarity(_))
    }
}

impl fmt::Debug for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Metric::Similarity(_) => f.write_str("Metric::Similarity"),
            Metric::Distance(_) => f.write_str("Metric::Distance"),
        }
    }
}

/// Built-in metrics selectable from configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    /// Cosine similarity, higher is closer
    #[default]
    Cosine,
    /// Squared Euclidean distance, lower is closer
    SquaredL2,
}

impl MetricKind {
    /// Get the metric function with its direction
    pub fn metric(&self) -> Metric {
        match self {
            MetricKind::Cosine => Metric::COSINE,
            MetricKind::SquaredL2 => Metric::SQUARED_L2,
        }
    }

    /// Threshold used when the configuration does not set one
    pub fn default_threshold(&self) -> f32 {
        match self {
            MetricKind::Cosine => 0.95,
            MetricKind::SquaredL2 => 0.5,
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricKind::Cosine => write!(f, "cosine"),
            MetricKind::SquaredL2 => write!(f, "squared_l2"),
        }
    }
}

impl std::str::FromStr for MetricKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "cosine" => Ok(MetricKind::Cosine),
            "squared_l2" | "l2" | "euclidean" => Ok(MetricKind::SquaredL2),
            _ => Err(DomainError::configuration(format!(
                "Unknown metric: {}. Valid metrics: cosine, squared_l2",
                s
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cosine_similarity_identical() {
        let a = vec![0.5, 0.5, 0.5];

        let similarity = cosine_similarity(&a, &a);

        assert!((similarity - 1.0).abs() < 0.0001);
    }

    #[test]
    fn test_cosine_similarity_orthogonal() {
        let similarity = cosine_similarity(&[1.0, 0.0, 0.0], &[0.0, 1.0, 0.0]);

        assert!(similarity.abs() < 0.0001);
    }

    #[test]
    fn test_cosine_similarity_opposite() {
        let similarity = cosine_similarity(&[0.1, 0.2, 0.3], &[-0.1, -0.2, -0.3]);

        assert!((similarity + 1.0).abs() < 0.0001);
    }

    #[test]
    fn test_cosine_similarity_near_duplicate() {
        let similarity = cosine_similarity(&[0.1, 0.2, 0.3, 0.4], &[0.2, 0.2, 0.3, 0.4]);

        assert!(similarity > 0.95);
        assert!(similarity < 1.0);
    }

    #[test]
    fn test_cosine_similarity_empty() {
        assert_eq!(cosine_similarity(&[], &[]), 0.0);
    }

    #[test]
    fn test_cosine_similarity_zero_magnitude() {
        assert_eq!(cosine_similarity(&[0.0, 0.0, 0.0], &[1.0, 2.0, 3.0]), 0.0);
        assert_eq!(cosine_similarity(&[1.0, 2.0, 3.0], &[0.0, 0.0, 0.0]), 0.0);
    }

    #[test]
    fn test_cosine_similarity_mismatched_lengths() {
        assert_eq!(cosine_similarity(&[1.0, 2.0], &[1.0, 2.0, 3.0]), 0.0);
    }

    #[test]
    fn test_squared_l2() {
        let distance = squared_l2(&[0.1, 0.2, 0.3, 0.4], &[0.2, 0.2, 0.3, 0.4]);

        assert!((distance - 0.01).abs() < 0.0001);
        assert_eq!(squared_l2(&[1.0, 2.0], &[1.0, 2.0]), 0.0);
    }

    #[test]
    fn test_squared_l2_degenerate() {
        assert_eq!(squared_l2(&[], &[]), f32::INFINITY);
        assert_eq!(squared_l2(&[1.0], &[1.0, 2.0]), f32::INFINITY);
        assert_eq!(squared_l2(&[0.0, 0.0], &[0.0, 0.0]), 0.0);
    }

    #[test]
    fn test_metric_direction() {
        let cosine = Metric::COSINE;
        assert!(cosine.is_similarity());
        assert!(cosine.qualifies(0.96, 0.95));
        assert!(!cosine.qualifies(0.95, 0.95));
        assert!(cosine.is_closer(0.99, 0.97));

        let l2 = Metric::SQUARED_L2;
        assert!(!l2.is_similarity());
        assert!(l2.qualifies(0.1, 0.5));
        assert!(!l2.qualifies(0.5, 0.5));
        assert!(l2.is_closer(0.1, 0.2));
    }

    #[test]
    fn test_degenerate_never_qualifies() {
        let l2 = Metric::SQUARED_L2;
        let score = l2.score(&[], &[]);
        assert!(!l2.qualifies(score, f32::MAX));

        let cosine = Metric::COSINE;
        let score = cosine.score(&[0.0, 0.0], &[1.0, 1.0]);
        assert!(!cosine.qualifies(score, 0.5));
    }

    #[test]
    fn test_custom_metric() {
        fn dot(a: &[f32], b: &[f32]) -> f32 {
            a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
        }

        let metric = Metric::Similarity(dot);
        assert_eq!(metric.score(&[1.0, 2.0], &[3.0, 4.0]), 11.0);
    }

    #[test]
    fn test_metric_kind_from_str() {
        assert_eq!("cosine".parse::<MetricKind>().unwrap(), MetricKind::Cosine);
        assert_eq!("SQUARED_L2".parse::<MetricKind>().unwrap(), MetricKind::SquaredL2);
        assert_eq!("l2".parse::<MetricKind>().unwrap(), MetricKind::SquaredL2);
        assert!("manhattan".parse::<MetricKind>().is_err());
    }

    #[test]
    fn test_metric_kind_defaults() {
        assert!((MetricKind::Cosine.default_threshold() - 0.95).abs() < 0.0001);
        assert!((MetricKind::SquaredL2.default_threshold() - 0.5).abs() < 0.0001);
        assert!(MetricKind::Cosine.metric().is_similarity());
        assert!(!MetricKind::SquaredL2.metric().is_similarity());
        assert_eq!(MetricKind::SquaredL2.to_string(), "squared_l2");
    }

    #[test]
    fn test_metric_kind_serde() {
        let kind: MetricKind = serde_json::from_str(r#""squared_l2""#).unwrap();
        assert_eq!(kind, MetricKind::SquaredL2);
        assert_eq!(serde_json::to_string(&MetricKind::Cosine).unwrap(), r#""cosine""#);
    }
}
