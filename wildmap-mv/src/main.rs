//! wildmap-mv - recording map viewer service
//!
//! **Module Identity:**
//! - Name: wildmap-mv (Map Viewer)
//! - Port: 5781
//!
//! Serves the map page, the static feeds, and the load/event API the page
//! uses to keep its single recordings layer in sync.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use wildmap_common::config::{load_toml_config, resolve_config_path};
use wildmap_common::logging::init_tracing;
use wildmap_mv::{
    build_router, AppState, DirFeedSource, FeedLoader, FeedSource, HttpFeedSource, ViewRegistry,
};

/// Command-line arguments for wildmap-mv
#[derive(Parser, Debug)]
#[command(name = "wildmap-mv")]
#[command(about = "Wildlife recording map viewer")]
#[command(version)]
struct Args {
    /// Config file (TOML)
    #[arg(short, long, env = "WILDMAP_CONFIG")]
    config: Option<PathBuf>,

    /// Port to listen on (overrides config)
    #[arg(short, long, env = "WILDMAP_MV_PORT")]
    port: Option<u16>,

    /// Directory holding the feed files (overrides config)
    #[arg(long, env = "WILDMAP_FEED_DIR")]
    feed_dir: Option<PathBuf>,

    /// Fetch feeds over HTTP from this base URL (overrides config)
    #[arg(long, env = "WILDMAP_FEED_URL")]
    feed_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config_path = resolve_config_path(args.config.as_deref());
    let config = load_toml_config(config_path.as_deref()).context("Failed to load config")?;

    init_tracing(&config.logging.level);

    info!(
        "Starting WildMap viewer (wildmap-mv) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let catalog = config.catalog().context("Invalid dataset catalog")?;
    let viewer = config.viewer;
    let port = args.port.unwrap_or(viewer.port);
    let feed_dir = args.feed_dir.unwrap_or(viewer.feed_dir);

    let feed_url = args.feed_url.or(viewer.feed_url);

    if !feed_dir.is_dir() {
        warn!("Feed directory {} does not exist", feed_dir.display());
    }

    let source: Arc<dyn FeedSource> = match feed_url {
        Some(url) => Arc::new(
            HttpFeedSource::new(url).context("Failed to build feed HTTP client")?,
        ),
        None => Arc::new(DirFeedSource::new(feed_dir.clone())),
    };
    info!("Feed source: {}", source.describe());
    info!(
        "Datasets: {} (default '{}', ordering {:?})",
        catalog.len(),
        viewer.default_dataset,
        viewer.load_ordering
    );

    let loader = FeedLoader::new(
        source,
        Arc::new(catalog),
        viewer.load_ordering,
    );
    let views = ViewRegistry::new(viewer.max_clients);
    let app = build_router(AppState::new(
        loader,
        views,
        viewer.default_dataset,
        feed_dir,
    ));

    let bind_addr = format!("{}:{}", viewer.host, port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", bind_addr))?;
    info!("wildmap-mv listening on http://{}", bind_addr);
    info!("Health check: http://{}/health", bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
