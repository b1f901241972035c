//! Embedding domain - provider contract and vector metrics

mod provider;
mod similarity;

pub use provider::Embedder;
pub use similarity::{cosine_similarity, squared_l2, Metric, MetricFn, MetricKind};

#[cfg(test)]
pub use provider::mock::StaticEmbedder;
#[cfg(test)]
pub use provider::MockEmbedder;
