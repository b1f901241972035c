//! LLM result caching service

use std::sync::Arc;

use crate::domain::{
    CacheStats, CacheValue, DomainError, Embedder, Engine, EngineConfig, RequestContext,
};
use crate::infrastructure::cache::EngineFactory;

/// Front door to a cache engine
///
/// Callers look a query up before calling the model, and store the model's
/// answer on a miss. All behaviour lives in the engine; this type only
/// forwards. Clones share the same engine.
#[derive(Debug)]
pub struct LlmCache<T: CacheValue> {
    engine: Arc<dyn Engine<T>>,
}

impl<T: CacheValue> Clone for LlmCache<T> {
    fn clone(&self) -> Self {
        Self {
            engine: Arc::clone(&self.engine),
        }
    }
}

impl<T: CacheValue> LlmCache<T> {
    pub fn new(engine: Arc<dyn Engine<T>>) -> Self {
        Self { engine }
    }

    /// Build the configured engine and wrap it
    pub fn from_config(
        config: &EngineConfig,
        embedder: Option<Arc<dyn Embedder>>,
    ) -> Result<Self, DomainError> {
        Ok(Self::new(EngineFactory::create(config, embedder)?))
    }

    pub async fn lookup(&self, ctx: &RequestContext, query: &str) -> Option<T> {
        self.engine.lookup(ctx, query).await
    }

    pub async fn update(
        &self,
        ctx: &RequestContext,
        query: &str,
        result: T,
    ) -> Result<(), DomainError> {
        self.engine.update(ctx, query, result).await
    }

    pub async fn clear(&self, ctx: &RequestContext) -> Result<(), DomainError> {
        self.engine.clear(ctx).await
    }

    pub fn stats(&self) -> CacheStats {
        self.engine.stats()
    }

    pub fn len(&self) -> usize {
        self.engine.len()
    }

    pub fn is_empty(&self) -> bool {
        self.engine.is_empty()
    }

    pub fn engine_name(&self) -> &'static str {
        self.engine.engine_name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::cache::MapEngine;
    use crate::domain::embedding::StaticEmbedder;
    use crate::infrastructure::embedding::HashingEmbedder;

    const EINSTEIN: &str = "What year was Einstein born? Return only the year!";
    const ALBERT: &str = "What year was Albert Einstein born? Return only the year!";
    const ALBERT_LOWER: &str = "In what year was albert einstein born? Return only the year!";
    const TURING: &str = "What year was Alan Turing born? Return only the year!";

    fn ctx() -> RequestContext {
        RequestContext::background()
    }

    fn fake_model(prompt: &str) -> String {
        if prompt.contains("Turing") {
            "1912".to_string()
        } else {
            "1879".to_string()
        }
    }

    /// Look up each prompt, fall back to the model on a miss, record the outcome
    async fn run_prompts(cache: &LlmCache<String>, prompts: &[&str]) -> Vec<String> {
        let mut outputs = Vec::new();

        for prompt in prompts {
            if let Some(result) = cache.lookup(&ctx(), prompt).await {
                outputs.push(format!("HIT {}", result));
                continue;
            }

            let result = fake_model(prompt);
            cache.update(&ctx(), prompt, result.clone()).await.unwrap();
            outputs.push(result);
        }

        outputs
    }

    #[tokio::test]
    async fn test_similar_prompts_hit() {
        let embedder = Arc::new(
            StaticEmbedder::new()
                .with_embedding(EINSTEIN, vec![0.90, 0.10, 0.00, 0.10])
                .with_embedding(ALBERT, vec![0.88, 0.12, 0.02, 0.10])
                .with_embedding(ALBERT_LOWER, vec![0.87, 0.10, 0.05, 0.12])
                .with_embedding(TURING, vec![0.20, 0.10, 0.90, 0.10]),
        );
        let shared: Arc<dyn Embedder> = embedder.clone();
        let cache = LlmCache::from_config(&EngineConfig::similarity(), Some(shared)).unwrap();

        let outputs = run_prompts(&cache, &[EINSTEIN, ALBERT, ALBERT_LOWER, TURING]).await;

        assert_eq!(outputs, vec!["1879", "HIT 1879", "HIT 1879", "1912"]);
        assert_eq!(embedder.calls(), 4);

        let stats = cache.stats();
        assert_eq!(stats.similarity_hits, 2);
        assert_eq!(stats.misses, 2);
        assert_eq!(stats.entries, 2);
        assert_eq!(stats.pending_entries, 0);
    }

    #[tokio::test]
    async fn test_exact_engine_only_hits_identical_prompts() {
        let cache = LlmCache::from_config(&EngineConfig::exact(), None).unwrap();

        let outputs = run_prompts(&cache, &[EINSTEIN, ALBERT, EINSTEIN]).await;

        assert_eq!(outputs, vec!["1879", "1879", "HIT 1879"]);
        assert_eq!(cache.engine_name(), "exact");
        assert_eq!(cache.len(), 2);
    }

    #[tokio::test]
    async fn test_hashing_embedder_end_to_end() {
        let embedder: Arc<dyn Embedder> = Arc::new(HashingEmbedder::default());
        let config = EngineConfig::similarity().with_threshold(0.8);
        let cache = LlmCache::from_config(&config, Some(embedder)).unwrap();

        cache
            .update(&ctx(), "what is the capital of france", "Paris".to_string())
            .await
            .unwrap();

        assert_eq!(
            cache.lookup(&ctx(), "What is the capital of France?").await.as_deref(),
            Some("Paris")
        );
        assert!(cache.lookup(&ctx(), "how do I bake bread").await.is_none());
    }

    #[tokio::test]
    async fn test_clones_share_engine() {
        let cache = LlmCache::new(Arc::new(MapEngine::<u32>::new()));
        let other = cache.clone();

        cache.update(&ctx(), "q", 7u32).await.unwrap();

        assert_eq!(other.lookup(&ctx(), "q").await, Some(7));
        assert_eq!(other.len(), 1);

        other.clear(&ctx()).await.unwrap();

        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_forwards_to_engine() {
        let cache = LlmCache::new(Arc::new(MapEngine::<i32>::new().with_entry("known", 0)));

        assert_eq!(cache.lookup(&ctx(), "known").await, Some(0));
        assert_eq!(cache.lookup(&ctx(), "unknown").await, None);
    }

    #[tokio::test]
    async fn test_update_error_is_propagated() {
        let embedder: Arc<dyn Embedder> = Arc::new(StaticEmbedder::new().with_error("down"));
        let cache: LlmCache<String> =
            LlmCache::from_config(&EngineConfig::similarity(), Some(embedder)).unwrap();

        assert!(cache.lookup(&ctx(), EINSTEIN).await.is_none());

        let result = cache.update(&ctx(), EINSTEIN, "1879".to_string()).await;

        assert!(matches!(result, Err(DomainError::Provider { .. })));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_from_config_requires_embedder_for_similarity() {
        let result = LlmCache::<String>::from_config(&EngineConfig::similarity(), None);

        assert!(result.is_err());
    }
}
