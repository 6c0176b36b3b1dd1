use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod config;
mod error;
mod handlers;
mod models;
mod payload;
mod service;
mod store;
mod system_info;
mod youtube;
mod youtube_url;

use config::Config;
use models::AppState;
use service::VideoService;
use store::SqliteVideoStore;
use youtube::YoutubeClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = Config::from_env();

    // Initialize tracing; RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_directive()));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    system_info::print_startup_info(&config);

    // Open the database and bring the schema up to date before serving
    let pool = store::connect(&config.database).await?;
    store::migrate(&pool).await?;
    info!("🗄️  Database ready at {}", config.database.url);

    if config.youtube.api_key.is_none() {
        warn!("YOUTUBE_API_KEY is not set; youtube_url lookups will fall back to submitted fields");
    }

    let service = VideoService::new(
        Arc::new(SqliteVideoStore::new(pool.clone())),
        Arc::new(YoutubeClient::new(&config.youtube)),
    );

    let app_state = Arc::new(AppState {
        service,
        config: config.clone(),
    });

    let app = handlers::router(app_state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("✅ Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    pool.close().await;
    info!("👋 Server stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl+C: {}", e);
    }
}
