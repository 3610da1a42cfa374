//! Shared application state for all routes.

use crate::config::ResolvedModel;
use crate::connector::ConnectorRegistry;
use sqlx::PgPool;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    /// Resolved once at startup; immutable afterwards.
    pub model: Arc<ResolvedModel>,
    /// One connector per external service, shared by the services layer.
    pub connectors: Arc<ConnectorRegistry>,
}
