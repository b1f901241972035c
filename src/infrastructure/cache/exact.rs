//! Exact-match engine over an LRU store

use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use tracing::{debug, warn};

use super::counters::EngineCounters;
use super::lru::LruStore;
use crate::domain::{CacheStats, CacheValue, DomainError, Engine, EngineConfig, RequestContext};
use crate::infrastructure::observability::LookupOutcome;

const ENGINE_NAME: &str = "exact";

/// Engine that only answers for byte-identical query text
///
/// No embeddings are involved; this is the zero-tolerance case of the
/// similarity engine.
#[derive(Debug)]
pub struct ExactEngine<T> {
    store: Mutex<LruStore<String, T>>,
    counters: EngineCounters,
}

impl<T: CacheValue> ExactEngine<T> {
    /// Create an engine holding at most `max_entries` results
    pub fn new(max_entries: usize) -> Result<Self, DomainError> {
        Ok(Self {
            store: Mutex::new(LruStore::new(max_entries)?),
            counters: EngineCounters::new(ENGINE_NAME),
        })
    }

    /// Create an engine from configuration; similarity settings are ignored
    pub fn with_config(config: &EngineConfig) -> Result<Self, DomainError> {
        config.validate()?;
        Self::new(config.max_entries)
    }

    fn lock(&self) -> Result<MutexGuard<'_, LruStore<String, T>>, DomainError> {
        self.store
            .lock()
            .map_err(|e| DomainError::internal(format!("Failed to acquire cache lock: {}", e)))
    }
}

#[async_trait]
impl<T: CacheValue> Engine<T> for ExactEngine<T> {
    async fn lookup(&self, _ctx: &RequestContext, query: &str) -> Option<T> {
        let hit = match self.lock() {
            Ok(mut store) => store.get(query).cloned(),
            Err(e) => {
                warn!("Exact cache lookup degraded to miss: {}", e);
                None
            }
        };

        match hit {
            Some(_) => self.counters.lookup(LookupOutcome::ExactHit),
            None => self.counters.lookup(LookupOutcome::Miss),
        }

        hit
    }

    async fn update(
        &self,
        _ctx: &RequestContext,
        query: &str,
        result: T,
    ) -> Result<(), DomainError> {
        let evicted = {
            let mut store = self.lock().inspect_err(|_| self.counters.update(false))?;
            store.put(query.to_string(), result)
        };

        if let Some((key, _)) = evicted {
            debug!(engine = ENGINE_NAME, "Evicted least recently used entry '{}'", key);
            self.counters.eviction();
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
