//! llm-cache
//!
//! A result cache for expensive text-generation calls with support for:
//! - Exact lookups keyed by the raw query text
//! - Similarity lookups over query embeddings (cosine or squared L2)
//! - Bounded LRU eviction
//! - Remembering embeddings of missed queries so a following update never
//!   embeds twice
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use llm_cache::{Embedder, EngineConfig, HashingEmbedder, LlmCache, RequestContext};
//!
//! # async fn demo() -> Result<(), llm_cache::DomainError> {
//! let embedder: Arc<dyn Embedder> = Arc::new(HashingEmbedder::default());
//! let config = EngineConfig::similarity();
//! let cache: LlmCache<String> = LlmCache::from_config(&config, Some(embedder))?;
//! let ctx = RequestContext::background();
//!
//! if cache.lookup(&ctx, "What is the capital of France?").await.is_none() {
//!     cache.update(&ctx, "What is the capital of France?", "Paris".to_string()).await?;
//! }
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;
pub use domain::{
    CacheEntry, CacheStats, CacheValue, CancelHandle, DomainError, Embedder, Engine, EngineConfig,
    EngineType, MatchPolicy, Metric, MetricKind, RequestContext,
};
pub use infrastructure::cache::{EngineFactory, ExactEngine, LruStore, SimilarityEngine};
pub use infrastructure::embedding::{
    EmbedderConfig, EmbedderFactory, HashingEmbedder, OpenAiEmbedder,
};
pub use infrastructure::services::LlmCache;
