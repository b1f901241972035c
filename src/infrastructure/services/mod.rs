//! Infrastructure services

mod llm_cache_service;

pub use llm_cache_service::LlmCache;
