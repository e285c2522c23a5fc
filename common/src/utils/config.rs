use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::utils::embedding::EmbeddingBackend;

#[derive(Clone, Deserialize, Debug)]
pub struct AppConfig {
    pub llm_api_key: String,
    pub embedding_api_key: String,
    #[serde(default = "default_llm_base_url")]
    pub llm_base_url: String,
    #[serde(default = "default_llm_model")]
    pub llm_model: String,
    #[serde(default = "default_embedding_base_url")]
    pub embedding_base_url: String,
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,
    #[serde(default = "default_embedding_dimensions")]
    pub embedding_dimensions: u32,
    #[serde(default)]
    pub embedding_backend: EmbeddingBackend,
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    #[serde(default = "default_http_port")]
    pub http_port: u16,
    #[serde(default = "default_retrieval_top_k")]
    pub retrieval_top_k: usize,
    #[serde(default = "default_chunk_min_chars")]
    pub chunk_min_chars: usize,
    #[serde(default = "default_chunk_max_chars")]
    pub chunk_max_chars: usize,
    #[serde(default = "default_upload_max_body_bytes")]
    pub upload_max_body_bytes: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            llm_api_key: String::new(),
            embedding_api_key: String::new(),
            llm_base_url: default_llm_base_url(),
            llm_model: default_llm_model(),
            embedding_base_url: default_embedding_base_url(),
            embedding_model: default_embedding_model(),
            embedding_dimensions: default_embedding_dimensions(),
            embedding_backend: EmbeddingBackend::default(),
            data_dir: default_data_dir(),
            http_port: default_http_port(),
            retrieval_top_k: default_retrieval_top_k(),
            chunk_min_chars: default_chunk_min_chars(),
            chunk_max_chars: default_chunk_max_chars(),
            upload_max_body_bytes: default_upload_max_body_bytes(),
        }
    }
}

fn default_llm_base_url() -> String {
    "https://api.groq.com/openai/v1".to_string()
}

fn default_llm_model() -> String {
    "gemma2-9b-it".to_string()
}

fn default_embedding_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_embedding_model() -> String {
    "text-embedding-3-small".to_string()
}

fn default_embedding_dimensions() -> u32 {
    1536
}

fn default_data_dir() -> String {
    "./data".to_string()
}

fn default_http_port() -> u16 {
    5000
}

fn default_retrieval_top_k() -> usize {
    4
}

fn default_chunk_min_chars() -> usize {
    500
}

fn default_chunk_max_chars() -> usize {
    2000
}

fn default_upload_max_body_bytes() -> usize {
    50_000_000
}

/// Loads configuration from an optional `config` file plus the environment.
/// The two API keys have no defaults, so a missing credential fails here.
pub fn get_config() -> Result<AppConfig, ConfigError> {
    let config = Config::builder()
        .add_source(File::with_name("config").required(false))
        .add_source(Environment::default())
        .build()?;

    config.try_deserialize()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_upstream_services() {
        let config = AppConfig::default();
        assert_eq!(config.llm_model, "gemma2-9b-it");
        assert_eq!(config.embedding_model, "text-embedding-3-small");
        assert_eq!(config.retrieval_top_k, 4);
        assert_eq!(config.http_port, 5000);
        assert!(config.chunk_min_chars < config.chunk_max_chars);
    }

    #[test]
    fn test_deserializes_with_only_credentials() {
        let json = serde_json::json!({
            "llm_api_key": "key-a",
            "embedding_api_key": "key-b",
        });
        let config: AppConfig =
            serde_json::from_value(json).expect("credentials alone should satisfy the config");
        assert_eq!(config.llm_api_key, "key-a");
        assert_eq!(config.embedding_backend, EmbeddingBackend::OpenAI);
    }

    #[test]
    fn test_missing_credentials_is_an_error() {
        let json = serde_json::json!({ "llm_api_key": "key-a" });
        assert!(serde_json::from_value::<AppConfig>(json).is_err());
    }

    #[test]
    fn test_backend_override() {
        let json = serde_json::json!({
            "llm_api_key": "key-a",
            "embedding_api_key": "key-b",
            "embedding_backend": "hashed",
        });
        let config: AppConfig = serde_json::from_value(json).expect("valid config");
        assert_eq!(config.embedding_backend, EmbeddingBackend::Hashed);
    }
}
