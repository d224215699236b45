//! Form builder server: loads config from env, connects and migrates PostgreSQL, mounts health and admin routes.

use formkit::{app_router, AppConfig, AppState, PgStore};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::from_env()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&config.log_filter)?)
        .init();

    let store = PgStore::connect(&config).await?;
    let state = AppState::new(Arc::new(store));
    let app = app_router(state, &config);

    let listener = TcpListener::bind(config.bind_addr).await?;
    tracing::info!(schema = %config.schema, "listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}
