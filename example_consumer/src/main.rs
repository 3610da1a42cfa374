//! Example consumer: serves the Catalyst entity set (funds, proposals,
//! groups, communities, reviews) from the JSON config in ./config.
//!
//! Run from repo root: `cargo run -p example-consumer`

use catalyst_explorer_sdk::{
    apply_migrations, common_routes_with_ready, ensure_database_exists, entity_routes,
    load_from_dir, resolve, AppState, ConnectorRegistry, IntegrationsConfig,
};
use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("catalyst_explorer_sdk=info")),
        )
        .init();

    let database_url = std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| "postgres://localhost/catalyst_explorer".into());
    ensure_database_exists(&database_url).await?;
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await?;

    let config_dir = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "example_consumer/config".into());
    let config = load_from_dir(&config_dir).await?;
    apply_migrations(&pool, &config).await?;
    let model = Arc::new(resolve(&config)?);

    let connectors = Arc::new(ConnectorRegistry::from_config(&IntegrationsConfig::from_env()));
    let state = AppState {
        pool,
        model,
        connectors,
    };

    let app = Router::new()
        .merge(common_routes_with_ready(state.clone()))
        .nest("/api/v1", entity_routes(state));

    let listener = TcpListener::bind("127.0.0.1:3000").await?;
    tracing::info!("listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}
