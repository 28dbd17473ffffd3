use dotenv::dotenv;
use geo_scraper::{
    api::{self, AppState},
    config::AppConfig,
};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env()?;
    info!(
        base_url = %config.retailer_base_url,
        enforce_https = config.fetch.enforce_https,
        timeout = ?config.fetch.timeout,
        "configuration loaded"
    );

    let state = Arc::new(AppState::from_config(&config));
    let app = api::create_app(state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr()).await?;
    info!("App started on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
