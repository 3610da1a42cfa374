//! YouTube Data API video metadata. The API key travels as the `key` query
//! parameter.

use crate::connector::core::{Auth, Connector, ConnectorConfig};
use crate::connector::request::ApiRequest;
use crate::error::AppError;
use reqwest::Method;

pub struct YouTubeConnector {
    config: ConnectorConfig,
}

impl YouTubeConnector {
    pub const SERVICE: &'static str = "youtube";

    pub fn new(base_url: &str, api_key: Option<String>) -> Self {
        YouTubeConnector {
            config: ConnectorConfig::new(base_url).maybe_auth(api_key.map(|key| Auth::Query {
                name: "key".to_string(),
                value: key,
            })),
        }
    }
}

impl Connector for YouTubeConnector {
    fn service(&self) -> &'static str {
        Self::SERVICE
    }
    fn config(&self) -> &ConnectorConfig {
        &self.config
    }
}

/// Snippet and duration details for one video.
pub struct GetVideoDetailsRequest {
    pub video_id: String,
}

impl GetVideoDetailsRequest {
    pub fn new(video_id: impl Into<String>) -> Self {
        GetVideoDetailsRequest {
            video_id: video_id.into(),
        }
    }
}

impl ApiRequest for GetVideoDetailsRequest {
    fn service(&self) -> &'static str {
        YouTubeConnector::SERVICE
    }
    fn method(&self) -> Method {
        Method::GET
    }
    fn endpoint(&self) -> Result<String, AppError> {
        if self.video_id.is_empty() {
            return Err(AppError::Construction("video id required for details request".into()));
        }
        Ok("/videos".to_string())
    }
    fn query(&self) -> Vec<(String, String)> {
        vec![
            ("part".to_string(), "snippet,contentDetails".to_string()),
            ("id".to_string(), self.video_id.clone()),
        ]
    }
}
