//! Vimeo API video metadata, bearer auth.

use crate::connector::core::{Auth, Connector, ConnectorConfig};
use crate::connector::request::ApiRequest;
use crate::error::AppError;
use reqwest::Method;

pub struct VimeoConnector {
    config: ConnectorConfig,
}

impl VimeoConnector {
    pub const SERVICE: &'static str = "vimeo";

    pub fn new(base_url: &str, access_token: Option<String>) -> Self {
        VimeoConnector {
            config: ConnectorConfig::new(base_url).maybe_auth(access_token.map(Auth::Bearer)),
        }
    }
}

impl Connector for VimeoConnector {
    fn service(&self) -> &'static str {
        Self::SERVICE
    }
    fn config(&self) -> &ConnectorConfig {
        &self.config
    }
}

/// Name and duration of one video. The field list keeps the response small.
pub struct GetVideoDetailsRequest {
    pub video_id: String,
    pub fields: String,
}

impl GetVideoDetailsRequest {
    pub fn new(video_id: impl Into<String>) -> Self {
        GetVideoDetailsRequest {
            video_id: video_id.into(),
            fields: "duration,name".to_string(),
        }
    }
}

impl ApiRequest for GetVideoDetailsRequest {
    fn service(&self) -> &'static str {
        VimeoConnector::SERVICE
    }
    fn method(&self) -> Method {
        Method::GET
    }
    fn endpoint(&self) -> Result<String, AppError> {
        if self.video_id.is_empty() {
            return Err(AppError::Construction("video id required for details request".into()));
        }
        Ok(format!("/videos/{}", self.video_id))
    }
    fn query(&self) -> Vec<(String, String)> {
        vec![("fields".to_string(), self.fields.clone())]
    }
}
