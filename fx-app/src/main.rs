//! # Exchange Rate Application
//!
//! Binary that wires together all the components:
//! - Load configuration from environment
//! - Build the CNB source and the cached provider
//! - Start the background refresher
//! - Start the HTTP server, then stop the refresher on shutdown

mod config;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use exchange_rates::{CachedRateProvider, CnbRateSource};
use fx_hex::{RateService, inbound::HttpServer};

use config::{Config, LogFormat};

fn init_tracing(format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        "info,fx_app=debug,fx_hex=debug,exchange_rates=debug".into()
    });

    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Text => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let config = Config::from_env()?;
    init_tracing(config.log_format);

    tracing::info!("Starting exchange rate server on port {}", config.port);
    tracing::info!(
        feed = %config.feed_url,
        refresh_secs = config.provider.refresh_interval.as_secs(),
        stale_secs = config.provider.stale_after.as_secs(),
        "Using CNB daily feed"
    );

    let source = CnbRateSource::new(&config.feed_url, config.provider.fetch_timeout)?;
    let provider = CachedRateProvider::new(source, config.provider);

    // Warms the cache and keeps it fresh until shutdown
    let refresher = provider.start();

    let server = HttpServer::new(RateService::new(provider));
    let addr = format!("0.0.0.0:{}", config.port);
    let served = server.run(&addr).await;

    refresher.shutdown().await;
    tracing::info!("Refresher stopped");

    served
}
