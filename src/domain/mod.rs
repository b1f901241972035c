//! Domain layer - Cache contracts, entries and vector metrics

pub mod cache;
pub mod context;
pub mod embedding;
pub mod error;

pub use cache::{CacheEntry, CacheStats, CacheValue, Engine, EngineConfig, EngineType, MatchPolicy};
pub use context::{CancelHandle, RequestContext};
pub use embedding::{cosine_similarity, squared_l2, Embedder, Metric, MetricFn, MetricKind};
pub use error::DomainError;
