//! Similarity engine
//!
//! Maps raw query text to a [`CacheEntry`] holding the query embedding and,
//! once known, its result. A lookup that misses the exact key embeds the query
//! and scans every resolved entry with the configured metric. On a miss the
//! embedding is kept as a pending entry so the following `update` for the same
//! text never calls the embedder again.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use super::counters::EngineCounters;
use super::lru::LruStore;
use crate::domain::{
    CacheEntry, CacheStats, CacheValue, DomainError, Embedder, Engine, EngineConfig, MatchPolicy,
    Metric, RequestContext,
};
use crate::infrastructure::observability::LookupOutcome;

const ENGINE_NAME: &str = "similarity";

type Store<T> = LruStore<String, CacheEntry<T>>;

/// State of a key found by the exact probe
enum Probe<T> {
    Resolved(T),
    Pending(Vec<f32>),
    Absent,
}

/// Result of the scan performed under the lock
enum Resolution<T> {
    Exact(T),
    Similar { key: String, result: T, score: f32 },
    Remembered { evicted: Option<String> },
}

/// Engine that answers for semantically similar queries
#[derive(Debug)]
pub struct SimilarityEngine<T> {
    embedder: Arc<dyn Embedder>,
    store: Mutex<Store<T>>,
    metric: Metric,
    threshold: f32,
    match_policy: MatchPolicy,
    embed_timeout: Option<Duration>,
    counters: EngineCounters,
}

impl<T: CacheValue> SimilarityEngine<T> {
    /// Create a new engine
    pub fn new(embedder: Arc<dyn Embedder>, config: &EngineConfig) -> Result<Self, DomainError> {
        config.validate()?;

        Ok(Self {
            embedder,
            store: Mutex::new(LruStore::new(config.max_entries)?),
            metric: config.metric.metric(),
            threshold: config.threshold(),
            match_policy: config.match_policy,
            embed_timeout: config.embed_timeout(),
            counters: EngineCounters::new(ENGINE_NAME),
        })
    }

    /// Replace the configured metric with a custom one and its threshold
    pub fn with_metric(mut self, metric: Metric, threshold: f32) -> Result<Self, DomainError> {
        if !threshold.is_finite() {
            return Err(DomainError::configuration("threshold must be a finite number"));
        }

        self.metric = metric;
        self.threshold = threshold;
        Ok(self)
    }

    pub fn metric(&self) -> Metric {
        self.metric
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    fn lock(&self) -> Result<MutexGuard<'_, Store<T>>, DomainError> {
        self.store
            .lock()
            .map_err(|e| DomainError::internal(format!("Failed to acquire cache lock: {}", e)))
    }

    async fn embed(&self, ctx: &RequestContext, query: &str) -> Result<Vec<f32>, DomainError> {
        let ctx = match self.embed_timeout {
            Some(timeout) => ctx.clone().with_timeout(timeout),
            None => ctx.clone(),
        };

        ctx.run(self.embedder.embed_text(query)).await
    }

    fn probe(&self, query: &str) -> Result<Probe<T>, DomainError> {
        let mut store = self.lock()?;

        Ok(match store.get(query) {
            Some(entry) => match entry.result() {
                Some(result) => Probe::Resolved(result.clone()),
                None => Probe::Pending(entry.embedding().to_vec()),
            },
            None => Probe::Absent,
        })
    }

    /// Scan resolved entries for the closest qualifying candidate
    fn select<'a>(
        &self,
        store: &'a Store<T>,
        embedding: &[f32],
    ) -> Option<(&'a String, &'a T, f32)> {
        let mut best: Option<(&String, &T, f32)> = None;

        for (key, entry) in store.iter() {
            let Some(result) = entry.result() else {
                continue;
            };

            let score = self.metric.score(embedding, entry.embedding());
            if !self.metric.qualifies(score, self.threshold) {
                continue;
            }

            if self.match_policy == MatchPolicy::First {
                return Some((key, result, score));
            }

            match best {
                Some((_, _, current)) if !self.metric.is_closer(score, current) => {}
                _ => best = Some((key, result, score)),
            }
        }

        best
    }

    fn resolve(&self, query: &str, embedding: Vec<f32>) -> Result<Resolution<T>, DomainError> {
        let mut store = self.lock()?;

        if let Some(result) = store.get(query).and_then(|entry| entry.result()) {
            return Ok(Resolution::Exact(result.clone()));
        }

        let matched = self
            .select(&store, &embedding)
            .map(|(key, result, score)| (key.clone(), result.clone(), score));

        if let Some((key, result, score)) = matched {
            store.get(&key);
            return Ok(Resolution::Similar { key, result, score });
        }

        if store.get(query).is_some() {
            return Ok(Resolution::Remembered { evicted: None });
        }

        let evicted = store
            .put(query.to_string(), CacheEntry::pending(embedding))
            .map(|(key, _)| key);

        Ok(Resolution::Remembered { evicted })
    }

    fn note_eviction(&self, key: &str) {
        debug!(engine = ENGINE_NAME, "Evicted least recently used entry '{}'", key);
        self.counters.eviction();
    }
}

#[async_trait]
impl<T: CacheValue> Engine<T> for SimilarityEngine<T> {
    async fn lookup(&self, ctx: &RequestContext, query: &str) -> Option<T> {
        let probe = match self.probe(query) {
            Ok(probe) => probe,
            Err(e) => {
                warn!("Similarity cache lookup degraded to miss: {}", e);
                self.counters.lookup(LookupOutcome::Miss);
                return None;
            }
        };

        let embedding = match probe {
            Probe::Resolved(result) => {
                debug!(engine = ENGINE_NAME, "Exact cache hit");
                self.counters.lookup(LookupOutcome::ExactHit);
                return Some(result);
            }
            Probe::Pending(embedding) => embedding,
            Probe::Absent => match self.embed(ctx, query).await {
                Ok(embedding) => embedding,
                Err(e) => {
                    warn!(
                        provider = self.embedder.provider_name(),
                        "Failed to embed query for cache lookup: {}", e
                    );
                    self.counters.embedding_failure("lookup");
                    self.counters.lookup(LookupOutcome::Miss);
                    return None;
                }
            },
        };

        match self.resolve(query, embedding) {
            Ok(Resolution::Exact(result)) => {
                debug!(engine = ENGINE_NAME, "Exact cache hit after embedding");
                self.counters.lookup(LookupOutcome::ExactHit);
                Some(result)
            }
            Ok(Resolution::Similar { key, result, score }) => {
                debug!(
                    engine = ENGINE_NAME,
                    score = score,
                    "Similarity cache hit on '{}'", key
                );
                self.counters.lookup(LookupOutcome::SimilarityHit);
                Some(result)
            }
            Ok(Resolution::Remembered { evicted }) => {
                if let Some(key) = evicted {
                    self.note_eviction(&key);
                }
                debug!(engine = ENGINE_NAME, "Cache miss");
                self.counters.lookup(LookupOutcome::Miss);
                None
            }
            Err(e) => {
                warn!("Similarity cache lookup degraded to miss: {}", e);
                self.counters.lookup(LookupOutcome::Miss);
                None
            }
        }
    }

    async fn update(
        &self,
        ctx: &RequestContext,
        query: &str,
        result: T,
    ) -> Result<(), DomainError> {
        {
            let mut store = self.lock().inspect_err(|_| self.counters.update(false))?;

            if let Some(entry) = store.get_mut(query) {
                if entry.result() != Some(&result) {
                    entry.set_result(result);
                }
                self.counters.update(true);
                return Ok(());
            }
        }

        let embedding = match self.embed(ctx, query).await {
            Ok(embedding) => embedding,
            Err(e) => {
                debug!(
                    provider = self.embedder.provider_name(),
                    "Failed to embed query for cache update: {}", e
                );
                self.counters.embedding_failure("update");
                self.counters.update(false);
                return Err(e);
            }
        };

        let evicted = {
            let mut store = self.lock().inspect_err(|_| self.counters.update(false))?;

            match store.get_mut(query) {
                Some(entry) => {
                    if entry.result() != Some(&result) {
                        entry.set_result(result);
                    }
                    None
                }
                None => store.put(query.to_string(), CacheEntry::resolved(embedding, result)),
            }
        };

        if let Some((key, _)) = evicted {
            self.note_eviction(&key);
        }

        self.counters.update(true);
        Ok(())
    }

    async fn clear(&self, _ctx: &RequestContext) -> Result<(), DomainError> {
        self.store
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();

        debug!(engine = ENGINE_NAME, "Cache cleared");
        Ok(())
    }

    fn stats(&self) -> CacheStats {
        let store = self.store.lock().unwrap_or_else(PoisonError::into_inner);

        CacheStats {
            entries: store.len(),
            pending_entries: store.iter().filter(|(_, entry)| !entry.has_result()).count(),
            capacity: store.capacity(),
            ..self.counters.snapshot()
        }
    }

    fn len(&self) -> usize {
        self.store
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn engine_name(&self) -> &'static str {
        ENGINE_NAME
    }
}
