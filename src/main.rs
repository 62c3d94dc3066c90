mod aggregator;
mod api;
mod config;
mod error;
mod feed;
mod regions;
mod scheduler;
mod stats;
mod types;

use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::api::routes::{router, ApiState};
use crate::config::{Config, FEED_PAGE_SIZE};
use crate::error::Result;
use crate::feed::{FeedClient, HttpTransport};

#[tokio::main]
async fn main() {
    let cfg = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {e}");
            std::process::exit(1);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&cfg.log_level))
        .init();

    if let Err(e) = run(cfg).await {
        error!("Fatal error: {e}");
        std::process::exit(1);
    }
}

async fn run(cfg: Config) -> Result<()> {
    if cfg.api_key.is_none() {
        warn!("MOLIT_API_KEY not set: every feed request will return no data.");
    }
    info!(
        "Feed: {} (page size {}, concurrency {}, timeout {}s)",
        cfg.feed_url, FEED_PAGE_SIZE, cfg.feed_concurrency, cfg.feed_timeout_secs,
    );

    let transport = HttpTransport::new(Duration::from_secs(cfg.feed_timeout_secs))?;
    let feed = FeedClient::new(&cfg, Arc::new(transport));

    let bind_addr = format!("0.0.0.0:{}", cfg.api_port);
    let api_state = ApiState {
        feed: Arc::new(feed),
        cfg: Arc::new(cfg),
    };
    let app = router(api_state);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("HTTP API listening on {bind_addr}");

    axum::serve(listener, app).await?;

    Ok(())
}
