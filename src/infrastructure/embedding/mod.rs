//! Embedder implementations

mod factory;
mod hashing;
mod http_client;
mod openai;

pub use factory::{EmbedderConfig, EmbedderFactory, EmbedderType};
pub use hashing::{HashingEmbedder, DEFAULT_DIMENSIONS};
pub use http_client::{HttpClient, HttpClientTrait};
pub use openai::OpenAiEmbedder;

#[cfg(test)]
pub use http_client::mock::MockHttpClient;
