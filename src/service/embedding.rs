//! Embedding generation across providers: self-hosted Ollama by default,
//! OpenAI when configured.

use crate::connector::services::{ollama, openai};
use crate::connector::{ConnectorRegistry, HttpTransport};
use crate::error::AppError;
use serde_json::Value;
use std::sync::Arc;

pub const DEFAULT_PROVIDER: &str = "ollama";

pub struct EmbeddingService {
    registry: Arc<ConnectorRegistry>,
    transport: HttpTransport,
}

impl EmbeddingService {
    pub fn new(registry: Arc<ConnectorRegistry>, transport: HttpTransport) -> Self {
        EmbeddingService { registry, transport }
    }

    /// Generate an embedding for `text`. Provider defaults to ollama; the
    /// model defaults per provider.
    pub async fn generate(
        &self,
        provider: Option<&str>,
        model: Option<&str>,
        text: &str,
    ) -> Result<Vec<f32>, AppError> {
        let provider = provider.unwrap_or(DEFAULT_PROVIDER);
        let result = match provider {
            "ollama" => {
                self.ollama(model.unwrap_or("nomic-embed-text"), text).await
            }
            "openai" => {
                self.openai(model.unwrap_or("text-embedding-3-small"), text).await
            }
            other => Err(AppError::BadRequest(format!(
                "unsupported embedding provider: {}",
                other
            ))),
        };
        match &result {
            Ok(embedding) => {
                tracing::info!(provider, dimensions = embedding.len(), "generated embedding");
            }
            Err(e) => {
                tracing::error!(provider, error = %e, text_length = text.len(), "failed to generate embedding");
            }
        }
        result
    }

    async fn ollama(&self, model: &str, text: &str) -> Result<Vec<f32>, AppError> {
        let request = ollama::GenerateEmbeddingRequest::new(model, text);
        let call = self.registry.resolve(&request)?;
        let response = self.transport.send(call).await?;
        let data = response.json()?;
        vector_at(&data, &["embedding"]).ok_or(AppError::ExternalService {
            service: "ollama",
            status: None,
            message: "response missing embedding data".into(),
        })
    }

    async fn openai(&self, model: &str, text: &str) -> Result<Vec<f32>, AppError> {
        let request = openai::GenerateEmbeddingRequest::new(model, text);
        let call = self.registry.resolve(&request)?;
        let response = self.transport.send(call).await?;
        let data = response.json()?;
        vector_at(&data, &["data", "0", "embedding"]).ok_or(AppError::ExternalService {
            service: "openai",
            status: None,
            message: "response missing embedding data".into(),
        })
    }
}

/// Walk a JSON path ("0" steps into arrays) and read an f32 vector.
fn vector_at(data: &Value, path: &[&str]) -> Option<Vec<f32>> {
    let mut cursor = data;
    for step in path {
        cursor = match step.parse::<usize>() {
            Ok(index) => cursor.get(index)?,
            Err(_) => cursor.get(step)?,
        };
    }
    let items = cursor.as_array()?;
    let mut out = Vec::with_capacity(items.len());
    for item in items {
        out.push(item.as_f64()? as f32);
    }
    Some(out)
}
