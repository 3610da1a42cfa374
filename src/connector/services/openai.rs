//! OpenAI embeddings API, bearer auth.

use crate::connector::core::{Auth, Connector, ConnectorConfig};
use crate::connector::request::ApiRequest;
use crate::error::AppError;
use reqwest::Method;
use serde_json::{json, Value};

pub struct OpenAiConnector {
    config: ConnectorConfig,
}

impl OpenAiConnector {
    pub const SERVICE: &'static str = "openai";

    pub fn new(base_url: &str, api_key: Option<String>) -> Self {
        OpenAiConnector {
            config: ConnectorConfig::new(base_url)
                .header("Content-Type", "application/json")
                .maybe_auth(api_key.map(Auth::Bearer)),
        }
    }
}

impl Connector for OpenAiConnector {
    fn service(&self) -> &'static str {
        Self::SERVICE
    }
    fn config(&self) -> &ConnectorConfig {
        &self.config
    }
}

/// Embedding vector for one input text.
pub struct GenerateEmbeddingRequest {
    pub model: String,
    pub input: String,
}

impl GenerateEmbeddingRequest {
    pub fn new(model: impl Into<String>, input: impl Into<String>) -> Self {
        GenerateEmbeddingRequest {
            model: model.into(),
            input: input.into(),
        }
    }
}

impl ApiRequest for GenerateEmbeddingRequest {
    fn service(&self) -> &'static str {
        OpenAiConnector::SERVICE
    }
    fn method(&self) -> Method {
        Method::POST
    }
    fn endpoint(&self) -> Result<String, AppError> {
        Ok("/embeddings".to_string())
    }
    fn body(&self) -> Option<Value> {
        Some(json!({
            "model": self.model,
            "input": self.input,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connector::request::resolve_call;

    #[test]
    fn embedding_request_posts_model_and_input() {
        let connector = OpenAiConnector::new("https://openai.test/v1", Some("sk-test".into()));
        let call = resolve_call(
            &connector,
            &GenerateEmbeddingRequest::new("text-embedding-3-small", "catalyst"),
        )
        .unwrap();
        assert_eq!(call.method, Method::POST);
        assert_eq!(call.url.as_str(), "https://openai.test/v1/embeddings");
        assert_eq!(
            call.body,
            Some(json!({"model": "text-embedding-3-small", "input": "catalyst"}))
        );
        assert_eq!(call.auth, Some(Auth::Bearer("sk-test".into())));
    }
}
