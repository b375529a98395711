use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use journal_api::auth::TokenCodec;
use journal_api::routes;
use journal_api::services::media::HttpMediaHost;
use journal_api::state::AppState;
use journal_api::store::postgres::PgStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, SECRET_API_KEY, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "journal_api=debug,tower_http=info".into()),
        )
        .init();

    let config = journal_api::config::config();
    tracing::info!("Starting Journal API in {:?} mode", config.environment);

    let codec = TokenCodec::from_secret(&config.security.jwt_secret, config.security.jwt_expiry_hours)
        .context("SECRET_API_KEY must be set to a non-empty signing secret")?;

    let store = Arc::new(
        PgStore::connect(&config.database)
            .await
            .context("failed to connect to the database")?,
    );
    store.migrate().await.context("failed to run bootstrap DDL")?;

    let media = HttpMediaHost::from_config(&config.media).context("failed to build media client")?;

    let state = AppState {
        codec: Arc::new(codec),
        identities: store.clone(),
        journals: store,
        media: Arc::new(media),
    };

    let app = routes::app(state);

    let bind_addr = format!("0.0.0.0:{}", config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Journal API listening on http://{}", bind_addr);
    axum::serve(listener, app).await.context("server")?;

    Ok(())
}
