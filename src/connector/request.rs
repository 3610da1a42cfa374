//! One operation against a connector, and the deterministic merge of the
//! two into a transport-ready call description.

use crate::connector::core::{Auth, Connector, HttpOptions, HttpOverrides};
use crate::error::AppError;
use reqwest::Method;
use serde_json::Value;
use url::Url;

/// One parameterized operation against an external service. Everything here
/// is an override of the connector's defaults; the common case (stateless
/// GET) only supplies a method and an endpoint.
pub trait ApiRequest: Send + Sync {
    /// Service whose connector this request resolves to when the caller does
    /// not hand one over explicitly.
    fn service(&self) -> &'static str;

    fn method(&self) -> Method;

    /// Path relative to the connector base URL. Interpolation failures
    /// (e.g. an empty id) are construction errors, raised before any
    /// network activity.
    fn endpoint(&self) -> Result<String, AppError>;

    fn query(&self) -> Vec<(String, String)> {
        Vec::new()
    }

    /// Only requests that declare a body return Some.
    fn body(&self) -> Option<Value> {
        None
    }

    fn headers(&self) -> Vec<(String, String)> {
        Vec::new()
    }

    fn http_overrides(&self) -> HttpOverrides {
        HttpOverrides::default()
    }

    fn auth(&self) -> Option<Auth> {
        None
    }
}

/// Fully merged call description consumed by the transport: method, absolute
/// URL, headers, timeouts, optional body, optional credential.
#[derive(Clone, Debug)]
pub struct ResolvedCall {
    pub service: &'static str,
    pub method: Method,
    pub url: Url,
    pub headers: Vec<(String, String)>,
    pub http: HttpOptions,
    pub body: Option<Value>,
    pub auth: Option<Auth>,
}

/// Merge a connector's defaults with one request's overrides. Request wins
/// on conflict; no side effects, no network.
pub fn resolve_call(
    connector: &dyn Connector,
    request: &dyn ApiRequest,
) -> Result<ResolvedCall, AppError> {
    let endpoint = request.endpoint()?;
    let base = connector.base_url().trim_end_matches('/');
    let raw = if endpoint.starts_with('/') {
        format!("{}{}", base, endpoint)
    } else {
        format!("{}/{}", base, endpoint)
    };
    let mut url = Url::parse(&raw)
        .map_err(|e| AppError::Construction(format!("invalid url '{}': {}", raw, e)))?;

    let query = merge_pairs(connector.default_query(), &request.query());
    append_query(&mut url, &query);

    let headers = merge_pairs(connector.default_headers(), &request.headers());
    let http = connector.default_http().merged_with(request.http_overrides());
    let auth = request.auth().or_else(|| connector.default_auth().cloned());

    Ok(ResolvedCall {
        service: request.service(),
        method: request.method(),
        url,
        headers,
        http,
        body: request.body(),
        auth,
    })
}

/// Serialize merged pairs onto the URL. Values are percent-encoded only
/// where the query grammar demands it, so field lists like "duration,name"
/// stay readable.
fn append_query(url: &mut Url, pairs: &[(String, String)]) {
    if pairs.is_empty() {
        return;
    }
    let qs = pairs
        .iter()
        .map(|(k, v)| format!("{}={}", encode_component(k), encode_component(v)))
        .collect::<Vec<_>>()
        .join("&");
    match url.query() {
        Some(existing) if !existing.is_empty() => {
            let merged = format!("{}&{}", existing, qs);
            url.set_query(Some(&merged));
        }
        _ => url.set_query(Some(&qs)),
    }
}

fn encode_component(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for b in s.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' | b',' | b':'
            | b'/' => out.push(b as char),
            _ => {
                out.push_str(&format!("%{:02X}", b));
            }
        }
    }
    out
}

/// Connector defaults first, then request pairs; a request pair replaces a
/// default with the same (case-insensitive) name instead of duplicating it.
fn merge_pairs(defaults: &[(String, String)], overrides: &[(String, String)]) -> Vec<(String, String)> {
    let mut out: Vec<(String, String)> = defaults.to_vec();
    for (name, value) in overrides {
        match out.iter_mut().find(|(n, _)| n.eq_ignore_ascii_case(name)) {
            Some(existing) => existing.1 = value.clone(),
            None => out.push((name.clone(), value.clone())),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connector::core::ConnectorConfig;
    use std::time::Duration;

    struct TestConnector {
        config: ConnectorConfig,
    }

    impl Connector for TestConnector {
        fn service(&self) -> &'static str {
            "test"
        }
        fn config(&self) -> &ConnectorConfig {
            &self.config
        }
    }

    struct TestRequest {
        endpoint: Result<String, String>,
        query: Vec<(String, String)>,
        headers: Vec<(String, String)>,
        overrides: HttpOverrides,
    }

    impl Default for TestRequest {
        fn default() -> Self {
            TestRequest {
                endpoint: Ok("/things".into()),
                query: Vec::new(),
                headers: Vec::new(),
                overrides: HttpOverrides::default(),
            }
        }
    }

    impl ApiRequest for TestRequest {
        fn service(&self) -> &'static str {
            "test"
        }
        fn method(&self) -> Method {
            Method::GET
        }
        fn endpoint(&self) -> Result<String, AppError> {
            self.endpoint.clone().map_err(AppError::Construction)
        }
        fn query(&self) -> Vec<(String, String)> {
            self.query.clone()
        }
        fn headers(&self) -> Vec<(String, String)> {
            self.headers.clone()
        }
        fn http_overrides(&self) -> HttpOverrides {
            self.overrides
        }
    }

    fn connector() -> TestConnector {
        TestConnector {
            config: ConnectorConfig::new("https://api.example.com")
                .header("Accept", "application/json")
                .query("page_size", "50")
                .timeout(Duration::from_secs(90)),
        }
    }

    #[test]
    fn request_query_extends_and_overrides_connector_query() {
        let request = TestRequest {
            query: vec![
                ("page_size".to_string(), "10".to_string()),
                ("page".to_string(), "2".to_string()),
            ],
            ..TestRequest::default()
        };
        let call = resolve_call(&connector(), &request).unwrap();
        assert_eq!(
            call.url.as_str(),
            "https://api.example.com/things?page_size=10&page=2"
        );
    }

    #[test]
    fn request_headers_win_on_conflict() {
        let request = TestRequest {
            headers: vec![("accept".to_string(), "application/cbor".to_string())],
            ..TestRequest::default()
        };
        let call = resolve_call(&connector(), &request).unwrap();
        assert_eq!(
            call.headers,
            vec![("Accept".to_string(), "application/cbor".to_string())]
        );
    }

    #[test]
    fn request_timeout_override_wins() {
        let request = TestRequest {
            overrides: HttpOverrides {
                timeout: Some(Duration::from_secs(120)),
                ..HttpOverrides::default()
            },
            ..TestRequest::default()
        };
        let call = resolve_call(&connector(), &request).unwrap();
        assert_eq!(call.http.timeout, Duration::from_secs(120));
        // connect timeout untouched
        assert_eq!(call.http.connect_timeout, Duration::from_secs(10));
    }

    #[test]
    fn endpoint_failure_is_a_construction_error() {
        let request = TestRequest {
            endpoint: Err("video id required".into()),
            ..TestRequest::default()
        };
        assert!(matches!(
            resolve_call(&connector(), &request),
            Err(AppError::Construction(_))
        ));
    }

    #[test]
    fn base_url_trailing_slash_is_normalized() {
        let c = TestConnector {
            config: ConnectorConfig::new("https://api.example.com/v2/"),
        };
        let call = resolve_call(&c, &TestRequest::default()).unwrap();
        assert_eq!(call.url.as_str(), "https://api.example.com/v2/things");
    }
}
