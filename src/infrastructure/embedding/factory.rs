use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::{HashingEmbedder, HttpClient, OpenAiEmbedder, DEFAULT_DIMENSIONS};
use crate::domain::{DomainError, Embedder};

/// Supported embedder types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmbedderType {
    /// Local feature hashing, no network access
    #[default]
    Hashing,
    /// OpenAI-compatible HTTP API
    #[serde(rename = "openai", alias = "open_ai")]
    OpenAi,
}

impl std::fmt::Display for EmbedderType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EmbedderType::Hashing => write!(f, "hashing"),
            EmbedderType::OpenAi => write!(f, "openai"),
        }
    }
}

impl std::str::FromStr for EmbedderType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "hashing" | "local" => Ok(EmbedderType::Hashing),
            "openai" | "open_ai" => Ok(EmbedderType::OpenAi),
            _ => Err(DomainError::configuration(format!(
                "Unknown embedder type: {}. Valid types: hashing, openai",
                s
            ))),
        }
    }
}

/// Embedder configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbedderConfig {
    #[serde(default)]
    pub provider: EmbedderType,

    /// Model name (openai only)
    #[serde(default)]
    pub model: Option<String>,

    /// Base URL of an OpenAI-compatible server
    #[serde(default)]
    pub base_url: Option<String>,

    /// Name of the environment variable holding the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Vector length (hashing) or requested shortened dimensions (openai)
    #[serde(default)]
    pub dimensions: Option<usize>,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

impl Default for EmbedderConfig {
    fn default() -> Self {
        Self {
            provider: EmbedderType::default(),
            model: None,
            base_url: None,
            api_key_env: default_api_key_env(),
            dimensions: None,
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl EmbedderConfig {
    pub fn hashing(dimensions: usize) -> Self {
        Self {
            provider: EmbedderType::Hashing,
            dimensions: Some(dimensions),
            ..Default::default()
        }
    }

    pub fn openai() -> Self {
        Self {
            provider: EmbedderType::OpenAi,
            ..Default::default()
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_api_key_env(mut self, name: impl Into<String>) -> Self {
        self.api_key_env = name.into();
        self
    }
}

/// Factory for creating embedders
#[derive(Debug)]
pub struct EmbedderFactory;

impl EmbedderFactory {
    /// Create an embedder from configuration
    ///
    /// The OpenAI embedder reads its API key from the configured environment
    /// variable and fails when it is unset.
    pub fn create(config: &EmbedderConfig) -> Result<Arc<dyn Embedder>, DomainError> {
        match config.provider {
            EmbedderType::Hashing => {
                let embedder =
                    HashingEmbedder::new(config.dimensions.unwrap_or(DEFAULT_DIMENSIONS))?;
                Ok(Arc::new(embedder))
            }

            EmbedderType::OpenAi => {
                let api_key = std::env::var(&config.api_key_env).map_err(|_| {
                    DomainError::configuration(format!(
                        "Environment variable {} is required for the openai embedder",
                        config.api_key_env
                    ))
                })?;

                let client =
                    HttpClient::with_timeout(Duration::from_secs(config.request_timeout_secs))?;

                let mut embedder = match &config.base_url {
                    Some(url) => OpenAiEmbedder::with_base_url(client, api_key, url),
                    None => OpenAiEmbedder::new(client, api_key),
                };

                if let Some(model) = &config.model {
                    embedder = embedder.with_model(model);
                }

                if let Some(dimensions) = config.dimensions {
                    embedder = embedder.with_dimensions(dimensions);
                }

                Ok(Arc::new(embedder))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedder_type_from_str() {
        assert_eq!("hashing".parse::<EmbedderType>().unwrap(), EmbedderType::Hashing);
        assert_eq!("OpenAI".parse::<EmbedderType>().unwrap(), EmbedderType::OpenAi);
        assert!("bedrock".parse::<EmbedderType>().is_err());
    }

    #[test]
    fn test_default_config() {
        let config = EmbedderConfig::default();

        assert_eq!(config.provider, EmbedderType::Hashing);
        assert_eq!(config.api_key_env, "OPENAI_API_KEY");
        assert_eq!(config.request_timeout_secs, 30);
    }

    #[tokio::test]
    async fn test_create_hashing() {
        let embedder = EmbedderFactory::create(&EmbedderConfig::hashing(32)).unwrap();

        assert_eq!(embedder.provider_name(), "hashing");
        assert_eq!(embedder.embed_text("hello").await.unwrap().len(), 32);
    }

    #[test]
    fn test_create_hashing_zero_dimensions() {
        assert!(EmbedderFactory::create(&EmbedderConfig::hashing(0)).is_err());
    }

    #[test]
    fn test_create_openai_requires_key() {
        let config = EmbedderConfig::openai().with_api_key_env("LLM_CACHE_TEST_MISSING_KEY");

        let result = EmbedderFactory::create(&config);

        assert!(matches!(result, Err(DomainError::Configuration { .. })));
    }

    #[test]
    fn test_deserialize() {
        let json = r#"{"provider": "openai", "model": "text-embedding-3-large"}"#;

        let config: EmbedderConfig = serde_json::from_str(json).unwrap();

        assert_eq!(config.provider, EmbedderType::OpenAi);
        assert_eq!(config.model.as_deref(), Some("text-embedding-3-large"));
        assert_eq!(config.api_key_env, "OPENAI_API_KEY");
    }
}
