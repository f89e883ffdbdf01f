use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use vidtube_api::config::{AppConfig, StoreBackend};
use vidtube_api::database::DatabaseManager;
use vidtube_api::media::{CloudinaryClient, DisabledMediaHost, MediaError, MediaHost};
use vidtube_api::{app, AppState};

/// VidTube API server
#[derive(Debug, Parser)]
#[command(name = "vidtube-api", version, about)]
struct Args {
    /// Port to listen on (overrides VIDTUBE_API_PORT / PORT)
    #[arg(long)]
    port: Option<u16>,

    /// Store backend: postgres or memory (overrides STORE_BACKEND)
    #[arg(long)]
    store: Option<StoreBackend>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, CLOUDINARY_*, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("vidtube_api=info,tower_http=info")),
        )
        .init();

    let args = Args::parse();
    let mut config = AppConfig::from_env();
    if let Some(port) = args.port {
        config.api.port = port;
    }
    if let Some(store) = args.store {
        config.database.backend = store;
    }
    tracing::info!("Starting VidTube API in {:?} mode", config.environment);

    let store = DatabaseManager::open(&config.database)
        .await
        .context("failed to open store")?;

    let media: Arc<dyn MediaHost> = match CloudinaryClient::new(&config.media) {
        Ok(client) => Arc::new(client),
        Err(MediaError::NotConfigured(missing)) => {
            tracing::warn!("{} is not set; video uploads will fail until it is configured", missing);
            Arc::new(DisabledMediaHost::new(missing))
        }
        Err(e) => return Err(e).context("failed to build media host client"),
    };

    let bind_addr = format!("0.0.0.0:{}", config.api.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    let state = AppState::new(config, store, media);
    tracing::info!("VidTube API listening on http://{}", bind_addr);

    axum::serve(listener, app(state)).await.context("server error")?;
    Ok(())
}
