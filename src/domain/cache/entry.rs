//! Similarity cache entry

/// An embedded query and, once known, its result
///
/// `result` is `None` while the embedding has been computed but no result has
/// been stored yet. That state is distinct from any real value of `T`, so a
/// legitimately cached empty string or zero is still a hit.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry<T> {
    embedding: Vec<f32>,
    result: Option<T>,
}

impl<T> CacheEntry<T> {
    /// Create an entry whose result is not known yet
    pub fn pending(embedding: Vec<f32>) -> Self {
        Self {
            embedding,
            result: None,
        }
    }

    /// Create an entry with a known result
    pub fn resolved(embedding: Vec<f32>, result: T) -> Self {
        Self {
            embedding,
            result: Some(result),
        }
    }

    /// Get the embedding vector
    pub fn embedding(&self) -> &[f32] {
        &self.embedding
    }

    /// Get the result, if known
    pub fn result(&self) -> Option<&T> {
        self.result.as_ref()
    }

    /// Whether the entry can answer a lookup
    pub fn has_result(&self) -> bool {
        self.result.is_some()
    }

    /// Store or replace the result, keeping the embedding
    pub fn set_result(&mut self, result: T) {
        self.result = Some(result);
    }
}
