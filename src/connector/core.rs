//! Connector identity and defaults for one external HTTP service.

use std::time::Duration;

/// Authentication schemes used across the integrations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Auth {
    /// `Authorization: Bearer <token>`.
    Bearer(String),
    /// Static header credential (e.g. Blockfrost's `project_id`).
    Header { name: String, value: String },
    /// API key passed as a query parameter (e.g. YouTube's `key`).
    Query { name: String, value: String },
}

/// Timeouts handed to the transport.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HttpOptions {
    pub connect_timeout: Duration,
    pub timeout: Duration,
}

impl Default for HttpOptions {
    fn default() -> Self {
        HttpOptions {
            connect_timeout: Duration::from_secs(10),
            timeout: Duration::from_secs(30),
        }
    }
}

/// Per-request partial override; unset fields fall back to the connector.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HttpOverrides {
    pub connect_timeout: Option<Duration>,
    pub timeout: Option<Duration>,
}

impl HttpOptions {
    pub fn merged_with(self, overrides: HttpOverrides) -> HttpOptions {
        HttpOptions {
            connect_timeout: overrides.connect_timeout.unwrap_or(self.connect_timeout),
            timeout: overrides.timeout.unwrap_or(self.timeout),
        }
    }
}

/// Explicit configuration value object for one connector: every recognized
/// option has a named field, nothing hides in constructor defaults.
#[derive(Clone, Debug)]
pub struct ConnectorConfig {
    pub base_url: String,
    pub headers: Vec<(String, String)>,
    pub query: Vec<(String, String)>,
    pub http: HttpOptions,
    pub auth: Option<Auth>,
}

impl ConnectorConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        ConnectorConfig {
            base_url: base_url.into(),
            headers: Vec::new(),
            query: Vec::new(),
            http: HttpOptions::default(),
            auth: None,
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.http.timeout = timeout;
        self
    }

    pub fn auth(mut self, auth: Auth) -> Self {
        self.auth = Some(auth);
        self
    }

    pub fn maybe_auth(mut self, auth: Option<Auth>) -> Self {
        self.auth = auth;
        self
    }
}

/// One external service identity. Immutable and long-lived: a connector is
/// built once and shared across concurrent requests without synchronization.
pub trait Connector: Send + Sync {
    /// Stable service name the registry resolves by.
    fn service(&self) -> &'static str;

    fn config(&self) -> &ConnectorConfig;

    fn base_url(&self) -> &str {
        &self.config().base_url
    }

    fn default_headers(&self) -> &[(String, String)] {
        &self.config().headers
    }

    fn default_query(&self) -> &[(String, String)] {
        &self.config().query
    }

    fn default_http(&self) -> HttpOptions {
        self.config().http
    }

    fn default_auth(&self) -> Option<&Auth> {
        self.config().auth.as_ref()
    }
}
