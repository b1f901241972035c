//! Per-engine counters mirrored to the metrics recorder

use std::sync::atomic::{AtomicU64, Ordering};

use crate::domain::CacheStats;
use crate::infrastructure::observability::{self, LookupOutcome};

#[derive(Debug)]
pub(crate) struct EngineCounters {
    engine: &'static str,
    exact_hits: AtomicU64,
    similarity_hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
    embedding_failures: AtomicU64,
}

impl EngineCounters {
    pub(crate) fn new(engine: &'static str) -> Self {
        Self {
            engine,
            exact_hits: AtomicU64::new(0),
            similarity_hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
            embedding_failures: AtomicU64::new(0),
        }
    }

    pub(crate) fn lookup(&self, outcome: LookupOutcome) {
        let counter = match outcome {
            LookupOutcome::ExactHit => &self.exact_hits,
            LookupOutcome::SimilarityHit => &self.similarity_hits,
            LookupOutcome::Miss => &self.misses,
        };
        counter.fetch_add(1, Ordering::Relaxed);

        observability::record_lookup(self.engine, outcome);
    }

    pub(crate) fn update(&self, success: bool) {
        observability::record_update(self.engine, success);
    }

    pub(crate) fn eviction(&self) {
        self.evictions.fetch_add(1, Ordering::Relaxed);
        observability::record_eviction(self.engine);
    }

    pub(crate) fn embedding_failure(&self, operation: &'static str) {
        self.embedding_failures.fetch_add(1, Ordering::Relaxed);
        observability::record_embedding_failure(self.engine, operation);
    }

    /// Counter values; entry counts are filled in by the engine
    pub(crate) fn snapshot(&self) -> CacheStats {
        let exact_hits = self.exact_hits.load(Ordering::Relaxed);
        let similarity_hits = self.similarity_hits.load(Ordering::Relaxed);

        CacheStats {
            hits: exact_hits + similarity_hits,
            exact_hits,
            similarity_hits,
            misses: self.misses.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            embedding_failures: self.embedding_failures.load(Ordering::Relaxed),
            ..Default::default()
        }
    }
}
