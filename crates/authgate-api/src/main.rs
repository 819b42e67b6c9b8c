//! authgate API Server
//!
//! HTTP access-control gateway in front of the app menu.
//!
//! Author: hephaex@gmail.com

use anyhow::Context;
use authgate_api::{create_router, state::AppState};
use authgate_core::{AppConfig, LoggingConfig, PgCredentialStore};
use std::sync::Arc;

fn init_tracing(logging: &LoggingConfig) {
    let level = &logging.level;
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("authgate_api={level},authgate_core={level},audit=info,tower_http=debug").into()
    });

    if logging.json_format {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = AppConfig::load().context("Invalid configuration")?;

    init_tracing(&config.logging);

    // Connect to the credential store
    let store = PgCredentialStore::connect(&config.database)
        .await
        .context("Failed to connect to the credential store")?;
    store
        .ping()
        .await
        .context("Credential store is not reachable")?;
    tracing::info!(pool_size = config.database.pool_size, "Credential store connected");

    let addr = format!("{}:{}", config.server.host, config.server.port);
    tracing::info!(
        origins = ?config.server.allowed_origins,
        token_ttl_secs = config.auth.token_ttl_secs,
        "Origin allow-list loaded"
    );

    // Create application state
    let state = Arc::new(AppState::new(config, Arc::new(store)));

    // Create router
    let app = create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("authgate starting on http://{}", addr);
    tracing::info!("OpenAPI spec at http://{}/api-docs/openapi.json", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("Gracefully shutdown");
            }
        })
        .await?;

    Ok(())
}
