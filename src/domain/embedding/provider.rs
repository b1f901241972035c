//! Embedder trait definition

use std::fmt::Debug;

use async_trait::async_trait;

use crate::domain::DomainError;

#[cfg(test)]
use mockall::automock;

/// Converts query text into a fixed-length embedding vector
///
/// Implementations must be safe to call concurrently. Any error is treated by
/// the cache as a provider failure.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait Embedder: Send + Sync + Debug {
    /// Embed a single text
    async fn embed_text(&self, text: &str) -> Result<Vec<f32>, DomainError>;

    /// Get the provider name
    fn provider_name(&self) -> &'static str;
}
