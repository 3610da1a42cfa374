//! External service connectors: a Connector describes one service's
//! identity and defaults, an ApiRequest describes one operation against it,
//! and the transport executes the merged call.

mod core;
mod registry;
mod request;
mod transport;

pub mod services;

pub use core::{Auth, Connector, ConnectorConfig, HttpOptions, HttpOverrides};
pub use registry::{ConnectorRegistry, IntegrationsConfig};
pub use request::{resolve_call, ApiRequest, ResolvedCall};
pub use transport::{ApiResponse, HttpTransport};
