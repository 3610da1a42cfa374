//! Catalyst Explorer SDK: entity repositories over a config-declared model,
//! named query includes, and connectors for the external services the
//! explorer syncs from.

pub mod case;
pub mod config;
pub mod connector;
pub mod error;
pub mod migration;
pub mod query;
pub mod repository;
pub mod response;
pub mod sql;
pub mod state;
pub mod store;
pub mod service;
pub mod handlers;
pub mod routes;

pub use config::{load_from_dir, resolve, FullConfig, ResolvedEntity, ResolvedModel};
pub use connector::{
    Auth, Connector, ConnectorConfig, ConnectorRegistry, HttpTransport, IntegrationsConfig,
};
pub use error::{AppError, ConfigError};
pub use migration::apply_migrations;
pub use query::{IncludeRegistry, ListQuery};
pub use repository::{EntityId, PgRepository, Repository};
pub use response::{error_body, success_many, success_one};
pub use service::{EmbeddingService, VideoService};
pub use state::AppState;
pub use store::ensure_database_exists;
pub use routes::{common_routes, common_routes_with_ready, entity_routes};
