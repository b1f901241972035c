//! Engine trait definition

use std::fmt::Debug;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::{DomainError, RequestContext};

/// Values that can be stored in a cache engine
pub trait CacheValue: Clone + PartialEq + Debug + Send + Sync + 'static {}

impl<T> CacheValue for T where T: Clone + PartialEq + Debug + Send + Sync + 'static {}

/// Statistics for a cache engine
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CacheStats {
    /// Number of stored entries
    pub entries: usize,
    /// Entries holding an embedding but no result yet
    pub pending_entries: usize,
    /// Configured capacity
    pub capacity: usize,
    /// Total cache hits
    pub hits: u64,
    /// Hits answered by the exact key
    pub exact_hits: u64,
    /// Hits answered by a similar entry
    pub similarity_hits: u64,
    /// Total cache misses
    pub misses: u64,
    /// Total entries evicted
    pub evictions: u64,
    /// Embedding calls that failed, were cancelled or timed out
    pub embedding_failures: u64,
}

impl CacheStats {
    /// Calculate hit rate
    pub fn hit_rate(&self) -> f32 {
        let total = self.hits + self.misses;

        if total == 0 {
            return 0.0;
        }

        self.hits as f32 / total as f32
    }
}

/// Lookup/update contract shared by every cache strategy
///
/// `lookup` never fails: any internal problem degrades to a miss. `update`
/// and `clear` surface failures to the caller.
#[async_trait]
pub trait Engine<T: CacheValue>: Send + Sync + Debug {
    /// Find a cached result for the query
    async fn lookup(&self, ctx: &RequestContext, query: &str) -> Option<T>;

    /// Store the result for the query
    async fn update(&self, ctx: &RequestContext, query: &str, result: T) -> Result<(), DomainError>;

    /// Remove all entries
    async fn clear(&self, ctx: &RequestContext) -> Result<(), DomainError>;

    /// Get engine statistics
    fn stats(&self) -> CacheStats;

    /// Get the number of stored entries
    fn len(&self) -> usize;

    /// Whether the engine holds no entries
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get the engine name
    fn engine_name(&self) -> &'static str;
}
