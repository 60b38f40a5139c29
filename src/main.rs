use anyhow::Context;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use subtitles_api::config::Config;
use subtitles_api::services::session::JwtSessions;
use subtitles_api::services::store::{MemoryStore, PgStore, Store};
use subtitles_api::{AppState, build_app};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env().context("Invalid configuration")?;

    let store: Arc<dyn Store> = match &config.database_url {
        Some(database_url) => {
            let tables = config.table_names();
            tracing::info!(
                subtitles = %tables.subtitles,
                api_keys = %tables.api_keys,
                "Connecting to database"
            );
            Arc::new(
                PgStore::connect(database_url, config.max_connections, tables)
                    .await
                    .context("Failed to connect to database")?,
            )
        }
        None => {
            tracing::warn!(
                api_keys = config.memory_api_keys.len(),
                "DATABASE_URL not set, using in-memory store"
            );
            Arc::new(MemoryStore::with_api_keys(config.memory_api_keys.clone()))
        }
    };

    let state = AppState {
        store,
        sessions: Arc::new(JwtSessions::new(config.jwt_secret.clone())),
    };

    let app = build_app(state);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    tracing::info!("Listening on http://{}", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server failed")?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
