/// Kadro API server binary
///
/// Bootstraps configuration, the database (with migrations), the outbound
/// collaborators, and the HTTP listener.

use anyhow::Context;
use kadro_api::{
    app::{build_router, AppState},
    config::Config,
    mailer::LogMailer,
    media::HttpMediaStore,
};
use kadro_shared::db::{migrations, pool};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().context("Failed to load configuration")?;

    tracing::info!("Starting Kadro API server");

    migrations::ensure_database_exists(&config.database.url)
        .await
        .context("Failed to ensure database exists")?;

    let db = pool::create_pool(pool::DatabaseConfig {
        url: config.database.url.clone(),
        max_connections: config.database.max_connections,
        ..Default::default()
    })
    .await
    .context("Failed to create database pool")?;

    migrations::run_migrations(&db)
        .await
        .context("Failed to run migrations")?;

    let mailer = Arc::new(LogMailer);
    let media = Arc::new(HttpMediaStore::new(config.media.upload_url.clone()));

    let bind_address = config.bind_address();
    let state = AppState::new(db, config, mailer, media);
    let router = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind to {}", bind_address))?;

    tracing::info!("Listening on {}", bind_address);

    axum::serve(listener, router)
        .await
        .context("Server error")?;

    Ok(())
}
