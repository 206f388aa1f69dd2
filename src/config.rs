use serde::Deserialize;
use std::env;
use thiserror::Error;

/// Default character budget per chunk, roughly a page of text.
pub const DEFAULT_CHUNK_SIZE: usize = 1500;
/// Default character overlap between consecutive chunks.
pub const DEFAULT_CHUNK_OVERLAP: usize = 150;
/// Default number of chunks retrieved per question.
pub const DEFAULT_TOP_K: usize = 6;
/// Default OpenAI embedding model.
pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-ada-002";
/// Default OpenAI chat model used for grounded answers.
pub const DEFAULT_CHAT_MODEL: &str = "gpt-3.5-turbo-16k";
/// Default OpenAI API base URL.
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com";

/// Errors encountered while loading configuration from environment variables.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Required environment variable was not provided.
    #[error("Missing environment variable: {0}")]
    MissingVariable(String),
    /// Environment variable contained a value that could not be parsed.
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
}

/// Runtime configuration for one processing session.
///
/// The credential travels inside the config and is handed to each external
/// service client at construction time; there is no process-global credential
/// store, so independent sessions can carry independent keys.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// API key passed to the embedding and chat-completion services.
    pub openai_api_key: String,
    /// Base URL of the OpenAI-compatible API endpoint.
    pub openai_base_url: String,
    /// Embedding model identifier.
    pub embedding_model: String,
    /// Chat model identifier used for answer generation.
    pub chat_model: String,
    /// Maximum chunk length in characters.
    pub chunk_size: usize,
    /// Character overlap between consecutive chunks.
    pub chunk_overlap: usize,
    /// Number of nearest chunks retrieved per question.
    pub retrieval_top_k: usize,
}

impl Config {
    /// Build a configuration with default models and chunking parameters.
    pub fn new(openai_api_key: impl Into<String>) -> Self {
        Self {
            openai_api_key: openai_api_key.into(),
            openai_base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            embedding_model: DEFAULT_EMBEDDING_MODEL.to_string(),
            chat_model: DEFAULT_CHAT_MODEL.to_string(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_overlap: DEFAULT_CHUNK_OVERLAP,
            retrieval_top_k: DEFAULT_TOP_K,
        }
    }

    /// Load configuration from environment variables, applying defaults for
    /// everything except the API key.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        let mut config = Self::new(load_env("OPENAI_API_KEY")?);
        if let Some(base_url) = load_env_optional("OPENAI_BASE_URL") {
            config.openai_base_url = base_url;
        }
        if let Some(model) = load_env_optional("REPORTQA_EMBEDDING_MODEL") {
            config.embedding_model = model;
        }
        if let Some(model) = load_env_optional("REPORTQA_CHAT_MODEL") {
            config.chat_model = model;
        }
        config.chunk_size = load_env_parsed("REPORTQA_CHUNK_SIZE")?.unwrap_or(config.chunk_size);
        config.chunk_overlap =
            load_env_parsed("REPORTQA_CHUNK_OVERLAP")?.unwrap_or(config.chunk_overlap);
        config.retrieval_top_k = load_env_parsed("REPORTQA_TOP_K")?.unwrap_or(config.retrieval_top_k);
        tracing::debug!(
            base_url = %config.openai_base_url,
            embedding_model = %config.embedding_model,
            chat_model = %config.chat_model,
            chunk_size = config.chunk_size,
            chunk_overlap = config.chunk_overlap,
            top_k = config.retrieval_top_k,
            "Loaded configuration"
        );
        Ok(config)
    }
}

fn load_env(key: &str) -> Result<String, ConfigError> {
    env::var(key).map_err(|_| ConfigError::MissingVariable(key.to_string()))
}

fn load_env_optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn load_env_parsed(key: &str) -> Result<Option<usize>, ConfigError> {
    load_env_optional(key)
        .map(|value| {
            value
                .parse()
                .map_err(|_| ConfigError::InvalidValue(key.to_string()))
        })
        .transpose()
}
