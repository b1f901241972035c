//! Engine factory for runtime selection

use std::sync::Arc;

use tracing::info;

use crate::domain::{CacheValue, DomainError, Embedder, Engine, EngineConfig, EngineType};

use super::exact::ExactEngine;
use super::similarity::SimilarityEngine;

/// Factory for creating cache engines
#[derive(Debug, Default)]
pub struct EngineFactory;

impl EngineFactory {
    /// Creates an engine instance based on configuration
    ///
    /// The exact engine ignores `embedder`; the similarity engine requires one.
    pub fn create<T: CacheValue>(
        config: &EngineConfig,
        embedder: Option<Arc<dyn Embedder>>,
    ) -> Result<Arc<dyn Engine<T>>, DomainError> {
        let engine: Arc<dyn Engine<T>> = match config.engine {
            EngineType::Exact => Arc::new(ExactEngine::with_config(config)?),
            EngineType::Similarity => {
                let embedder = embedder.ok_or_else(|| {
                    DomainError::configuration("An embedder is required for the similarity engine")
                })?;

                Arc::new(SimilarityEngine::new(embedder, config)?)
            }
        };

        info!(
            engine = %config.engine,
            max_entries = config.max_entries,
            "Cache engine created"
        );

        Ok(engine)
    }

    /// Creates an exact-match engine
    pub fn create_exact<T: CacheValue>(
        max_entries: usize,
    ) -> Result<Arc<dyn Engine<T>>, DomainError> {
        Ok(Arc::new(ExactEngine::new(max_entries)?))
    }

    /// Creates a similarity engine
    pub fn create_similarity<T: CacheValue>(
        embedder: Arc<dyn Embedder>,
        config: &EngineConfig,
    ) -> Result<Arc<dyn Engine<T>>, DomainError> {
        Ok(Arc::new(SimilarityEngine::new(embedder, config)?))
    }
}
