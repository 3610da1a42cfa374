//! reqwest-backed execution of resolved calls.
//!
//! The transport is the only component that touches the network. It applies
//! the call's headers, timeout, body, and credential, and reports non-success
//! statuses and connection failures as ExternalService errors, unmodified.
//! Retry policy belongs to callers that want one.

use crate::connector::core::Auth;
use crate::connector::request::ResolvedCall;
use crate::error::AppError;
use serde_json::Value;

#[derive(Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Build the shared client. The connect timeout is a client-level knob
    /// in reqwest, so the default from HttpOptions is fixed here; per-call
    /// total timeouts are applied per request.
    pub fn new() -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .connect_timeout(crate::connector::HttpOptions::default().connect_timeout)
            .build()
            .map_err(|e| AppError::Construction(format!("http client: {}", e)))?;
        Ok(HttpTransport { client })
    }

    pub async fn send(&self, call: ResolvedCall) -> Result<ApiResponse, AppError> {
        let service = call.service;
        tracing::debug!(service, method = %call.method, url = %call.url, "dispatch");

        let mut req = self
            .client
            .request(call.method, call.url)
            .timeout(call.http.timeout);
        for (name, value) in &call.headers {
            req = req.header(name, value);
        }
        match &call.auth {
            Some(Auth::Bearer(token)) => req = req.bearer_auth(token),
            Some(Auth::Header { name, value }) => req = req.header(name, value),
            Some(Auth::Query { name, value }) => req = req.query(&[(name, value)]),
            None => {}
        }
        if let Some(body) = &call.body {
            req = req.json(body);
        }

        let response = req.send().await.map_err(|e| AppError::ExternalService {
            service,
            status: None,
            message: e.to_string(),
        })?;

        let status = response.status();
        let body = response.bytes().await.map_err(|e| AppError::ExternalService {
            service,
            status: Some(status.as_u16()),
            message: e.to_string(),
        })?;

        if !status.is_success() {
            return Err(AppError::ExternalService {
                service,
                status: Some(status.as_u16()),
                message: String::from_utf8_lossy(&body).chars().take(500).collect(),
            });
        }

        Ok(ApiResponse {
            service,
            status: status.as_u16(),
            body: body.to_vec(),
        })
    }
}

/// Successful response: status and raw body, with JSON decoding on demand.
#[derive(Clone, Debug)]
pub struct ApiResponse {
    service: &'static str,
    pub status: u16,
    body: Vec<u8>,
}

impl ApiResponse {
    pub fn bytes(&self) -> &[u8] {
        &self.body
    }

    pub fn json(&self) -> Result<Value, AppError> {
        serde_json::from_slice(&self.body).map_err(|e| AppError::ExternalService {
            service: self.service,
            status: Some(self.status),
            message: format!("invalid JSON response: {}", e),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connector::core::{Connector, ConnectorConfig};
    use crate::connector::request::resolve_call;
    use crate::connector::services::ollama::GenerateEmbeddingRequest;
    use crate::connector::services::OllamaConnector;
    use crate::connector::services::{vimeo, VimeoConnector};
    use httpmock::prelude::*;
    use serde_json::json;

    #[tokio::test]
    async fn success_response_decodes_json() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/videos/42")
                .query_param("fields", "duration,name");
            then.status(200).json_body(json!({"name": "Fund 12 pitch", "duration": 93}));
        });

        let connector = VimeoConnector::new(&server.base_url(), None);
        let call = resolve_call(&connector, &vimeo::GetVideoDetailsRequest::new("42")).unwrap();
        let response = HttpTransport::new().unwrap().send(call).await.unwrap();

        mock.assert();
        let body = response.json().unwrap();
        assert_eq!(body["duration"], json!(93));
    }

    #[tokio::test]
    async fn non_success_status_surfaces_external_service_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/videos/42");
            then.status(404).body("video not found");
        });

        let connector = VimeoConnector::new(&server.base_url(), None);
        let call = resolve_call(&connector, &vimeo::GetVideoDetailsRequest::new("42")).unwrap();
        match HttpTransport::new().unwrap().send(call).await {
            Err(AppError::ExternalService { service, status, message }) => {
                assert_eq!(service, "vimeo");
                assert_eq!(status, Some(404));
                assert_eq!(message, "video not found");
            }
            other => panic!("expected external service error, got {:?}", other.map(|r| r.status)),
        }
    }

    #[tokio::test]
    async fn body_and_bearer_auth_are_forwarded() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/api/embeddings")
                .header("authorization", "Bearer secret")
                .json_body(json!({"model": "nomic-embed-text", "prompt": "hello"}));
            then.status(200).json_body(json!({"embedding": [0.1, 0.2]}));
        });

        let connector = OllamaConnector::new(&server.base_url());
        let request = GenerateEmbeddingRequest::new("nomic-embed-text", "hello");
        let mut call = resolve_call(&connector, &request).unwrap();
        call.auth = Some(Auth::Bearer("secret".into()));
        HttpTransport::new().unwrap().send(call).await.unwrap();
        mock.assert();
    }

    #[tokio::test]
    async fn query_auth_is_appended_to_the_url() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/things").query_param("key", "k-123");
            then.status(200).json_body(json!({}));
        });

        struct Plain {
            config: ConnectorConfig,
        }
        impl Connector for Plain {
            fn service(&self) -> &'static str {
                "plain"
            }
            fn config(&self) -> &ConnectorConfig {
                &self.config
            }
        }
        struct Get;
        impl crate::connector::ApiRequest for Get {
            fn service(&self) -> &'static str {
                "plain"
            }
            fn method(&self) -> reqwest::Method {
                reqwest::Method::GET
            }
            fn endpoint(&self) -> Result<String, AppError> {
                Ok("/things".into())
            }
        }

        let connector = Plain {
            config: ConnectorConfig::new(server.base_url()).auth(Auth::Query {
                name: "key".into(),
                value: "k-123".into(),
            }),
        };
        let call = resolve_call(&connector, &Get).unwrap();
        HttpTransport::new().unwrap().send(call).await.unwrap();
        mock.assert();
    }
}
