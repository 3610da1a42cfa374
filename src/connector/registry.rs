//! Process-wide registry of service name -> connector.
//!
//! Built once at startup and passed by handle wherever requests are
//! dispatched; there is exactly one connector per external service and every
//! request for that service resolves to it. Resolution is a map lookup:
//! deterministic and side-effect-free.

use crate::connector::core::Connector;
use crate::connector::request::{resolve_call, ApiRequest, ResolvedCall};
use crate::connector::services::{
    BlockfrostConnector, CatalystGatewayConnector, CatalystReviewsConnector, OllamaConnector,
    OpenAiConnector, VimeoConnector, YouTubeConnector,
};
use crate::error::AppError;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Clone, Default)]
pub struct ConnectorRegistry {
    by_service: HashMap<&'static str, Arc<dyn Connector>>,
}

impl ConnectorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a connector under its own service name. The last
    /// registration for a name wins.
    pub fn register(&mut self, connector: Arc<dyn Connector>) {
        self.by_service.insert(connector.service(), connector);
    }

    pub fn get(&self, service: &str) -> Result<&Arc<dyn Connector>, AppError> {
        self.by_service
            .get(service)
            .ok_or_else(|| AppError::Construction(format!("no connector registered for '{}'", service)))
    }

    /// Resolve a request through its declared service. A missing
    /// registration is a configuration error, not a runtime data error.
    pub fn resolve(&self, request: &dyn ApiRequest) -> Result<ResolvedCall, AppError> {
        let connector = self.get(request.service())?;
        resolve_call(connector.as_ref(), request)
    }

    /// The full set of integrations, configured from the environment.
    pub fn from_config(cfg: &IntegrationsConfig) -> Self {
        let mut registry = ConnectorRegistry::new();
        registry.register(Arc::new(CatalystGatewayConnector::new(&cfg.gateway_url)));
        registry.register(Arc::new(CatalystReviewsConnector::new(&cfg.reviews_url)));
        registry.register(Arc::new(BlockfrostConnector::new(
            &cfg.blockfrost_url,
            cfg.blockfrost_project_id.clone(),
        )));
        registry.register(Arc::new(OpenAiConnector::new(
            &cfg.openai_url,
            cfg.openai_api_key.clone(),
        )));
        registry.register(Arc::new(OllamaConnector::new(&cfg.ollama_url)));
        registry.register(Arc::new(YouTubeConnector::new(
            &cfg.youtube_url,
            cfg.youtube_api_key.clone(),
        )));
        registry.register(Arc::new(VimeoConnector::new(
            &cfg.vimeo_url,
            cfg.vimeo_token.clone(),
        )));
        registry
    }
}

/// Base URLs and credentials for every integration, read from the
/// environment with the hosted defaults.
#[derive(Clone, Debug)]
pub struct IntegrationsConfig {
    pub gateway_url: String,
    pub reviews_url: String,
    pub blockfrost_url: String,
    pub blockfrost_project_id: Option<String>,
    pub openai_url: String,
    pub openai_api_key: Option<String>,
    pub ollama_url: String,
    pub youtube_url: String,
    pub youtube_api_key: Option<String>,
    pub vimeo_url: String,
    pub vimeo_token: Option<String>,
}

impl IntegrationsConfig {
    pub fn from_env() -> Self {
        IntegrationsConfig {
            gateway_url: env_or("CATALYST_GATEWAY_URL", "https://gateway.projectcatalyst.io/api/v1"),
            reviews_url: env_or("CATALYST_REVIEWS_URL", "https://reviews.projectcatalyst.io/api"),
            blockfrost_url: env_or("BLOCKFROST_URL", "https://cardano-mainnet.blockfrost.io/api/v0"),
            blockfrost_project_id: env_opt("BLOCKFROST_PROJECT_ID"),
            openai_url: env_or("OPENAI_URL", "https://api.openai.com/v1"),
            openai_api_key: env_opt("OPENAI_API_KEY"),
            ollama_url: env_or("OLLAMA_URL", "http://localhost:11434"),
            youtube_url: env_or("YOUTUBE_API_URL", "https://www.googleapis.com/youtube/v3"),
            youtube_api_key: env_opt("YOUTUBE_API_KEY"),
            vimeo_url: env_or("VIMEO_API_URL", "https://api.vimeo.com"),
            vimeo_token: env_opt("VIMEO_ACCESS_TOKEN"),
        }
    }
}

fn env_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

fn env_opt(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|s| !s.is_empty())
}
