//! wildmap-xp - xeno-canto proxy service
//!
//! **Module Identity:**
//! - Name: wildmap-xp (Xeno-canto Proxy)
//! - Port: 5782
//!
//! Browsers call `GET /api/xeno?query=...`; the service attaches the API key
//! from its own environment and relays the upstream JSON.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use wildmap_common::config::{load_toml_config, resolve_config_path};
use wildmap_common::logging::init_tracing;
use wildmap_xp::{build_router, AppState, Credential, XenoCantoClient};

/// Command-line arguments for wildmap-xp
#[derive(Parser, Debug)]
#[command(name = "wildmap-xp")]
#[command(about = "xeno-canto proxy for the WildMap viewer")]
#[command(version)]
struct Args {
    /// Config file (TOML)
    #[arg(short, long, env = "WILDMAP_CONFIG")]
    config: Option<PathBuf>,

    /// Port to listen on (overrides config)
    #[arg(short, long, env = "WILDMAP_XP_PORT")]
    port: Option<u16>,

    /// Upstream recordings endpoint (overrides config)
    #[arg(long)]
    upstream_url: Option<String>,

    /// Environment variable holding the API key (overrides config)
    #[arg(long)]
    credential_env: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config_path = resolve_config_path(args.config.as_deref());
    // Loaded before tracing init so the configured level applies
    let config = load_toml_config(config_path.as_deref()).context("Failed to load config")?;

    init_tracing(&config.logging.level);

    info!(
        "Starting WildMap proxy (wildmap-xp) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let proxy = config.proxy;
    let port = args.port.unwrap_or(proxy.port);
    let upstream_url = args.upstream_url.unwrap_or(proxy.upstream_url);
    let credential_env = args.credential_env.unwrap_or(proxy.credential_env);

    let credential = Credential::Env(credential_env);
    if credential.read().is_none() {
        tracing::warn!(
            "{} is not set; upstream requests will carry an empty key",
            credential.source()
        );
    }

    let upstream = XenoCantoClient::new(upstream_url.clone())
        .context("Failed to build upstream HTTP client")?;
    info!("Upstream: {}", upstream_url);

    let app = build_router(AppState::new(upstream, credential));

    let bind_addr = format!("{}:{}", proxy.host, port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", bind_addr))?;
    info!("wildmap-xp listening on http://{}", bind_addr);
    info!("Health check: http://{}/health", bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
