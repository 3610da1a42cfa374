//! Self-hosted Ollama embeddings, no auth. Embedding generation is slow on
//! modest hardware, so the request stretches the connector's timeout.

use crate::connector::core::{Connector, ConnectorConfig, HttpOverrides};
use crate::connector::request::ApiRequest;
use crate::error::AppError;
use reqwest::Method;
use serde_json::{json, Value};
use std::time::Duration;

pub struct OllamaConnector {
    config: ConnectorConfig,
}

impl OllamaConnector {
    pub const SERVICE: &'static str = "ollama";

    pub fn new(base_url: &str) -> Self {
        OllamaConnector {
            config: ConnectorConfig::new(base_url).timeout(Duration::from_secs(90)),
        }
    }
}

impl Connector for OllamaConnector {
    fn service(&self) -> &'static str {
        Self::SERVICE
    }
    fn config(&self) -> &ConnectorConfig {
        &self.config
    }
}

/// Embedding vector for one prompt.
pub struct GenerateEmbeddingRequest {
    pub model: String,
    pub prompt: String,
}

impl GenerateEmbeddingRequest {
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        GenerateEmbeddingRequest {
            model: model.into(),
            prompt: prompt.into(),
        }
    }
}

impl ApiRequest for GenerateEmbeddingRequest {
    fn service(&self) -> &'static str {
        OllamaConnector::SERVICE
    }
    fn method(&self) -> Method {
        Method::POST
    }
    fn endpoint(&self) -> Result<String, AppError> {
        Ok("/api/embeddings".to_string())
    }
    fn body(&self) -> Option<Value> {
        Some(json!({
            "model": self.model,
            "prompt": self.prompt,
        }))
    }
    fn http_overrides(&self) -> HttpOverrides {
        HttpOverrides {
            timeout: Some(Duration::from_secs(120)),
            ..HttpOverrides::default()
        }
    }
}
