//! Configuration loading
//!
//! Both services read the same optional TOML file. Its location is resolved
//! in priority order:
//! 1. Command-line argument (highest priority)
//! 2. `WILDMAP_CONFIG` environment variable
//! 3. `~/.config/wildmap/config.toml`
//!
//! A missing file is not an error: the services start with built-in
//! defaults. A file that exists but does not parse is.

use crate::dataset::{DatasetCatalog, DatasetEntry};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable naming the config file
pub const CONFIG_ENV_VAR: &str = "WILDMAP_CONFIG";

/// Default upstream recordings endpoint
pub const DEFAULT_UPSTREAM_URL: &str = "https://xeno-canto.org/api/3/recordings";

/// Default environment variable holding the upstream API key
pub const DEFAULT_CREDENTIAL_ENV: &str = "XENO_KEY";

/// Root of the TOML configuration file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub proxy: ProxyConfig,

    #[serde(default)]
    pub viewer: ViewerConfig,

    /// Dataset overrides, keyed by dataset id
    #[serde(default)]
    pub datasets: BTreeMap<String, DatasetEntry>,
}

impl TomlConfig {
    /// Dataset catalog with this config's overrides applied
    pub fn catalog(&self) -> Result<DatasetCatalog> {
        DatasetCatalog::with_overrides(&self.datasets)
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// xeno-canto proxy (wildmap-xp) settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProxyConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_proxy_port")]
    pub port: u16,

    /// Upstream recordings endpoint the query is forwarded to
    #[serde(default = "default_upstream_url")]
    pub upstream_url: String,

    /// Name of the environment variable holding the API key
    #[serde(default = "default_credential_env")]
    pub credential_env: String,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_proxy_port(),
            upstream_url: default_upstream_url(),
            credential_env: default_credential_env(),
        }
    }
}

/// Map viewer (wildmap-mv) settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_viewer_port")]
    pub port: u16,

    /// Directory holding the static feed files
    #[serde(default = "default_feed_dir")]
    pub feed_dir: PathBuf,

    /// Fetch feeds from this base URL instead of `feed_dir`
    #[serde(default)]
    pub feed_url: Option<String>,

    /// Dataset loaded when the map first becomes ready
    #[serde(default = "default_dataset")]
    pub default_dataset: String,

    #[serde(default)]
    pub load_ordering: LoadOrdering,

    /// Browser clients whose map state is kept at once
    #[serde(default = "default_max_clients")]
    pub max_clients: usize,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_viewer_port(),
            feed_dir: default_feed_dir(),
            feed_url: None,
            default_dataset: default_dataset(),
            load_ordering: LoadOrdering::default(),
            max_clients: default_max_clients(),
        }
    }
}

/// Which response wins when dataset loads overlap
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadOrdering {
    /// A response older than the last applied one is discarded
    #[default]
    LatestRequest,
    /// Whichever response resolves last is shown
    LastResponse,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_proxy_port() -> u16 {
    5782
}

fn default_viewer_port() -> u16 {
    5781
}

fn default_upstream_url() -> String {
    DEFAULT_UPSTREAM_URL.to_string()
}

fn default_credential_env() -> String {
    DEFAULT_CREDENTIAL_ENV.to_string()
}

fn default_feed_dir() -> PathBuf {
    PathBuf::from("feeds")
}

fn default_dataset() -> String {
    "frogs".to_string()
}

fn default_max_clients() -> usize {
    256
}

/// Resolve the config file location.
///
/// Returns `None` when no candidate applies; the caller then runs on
/// built-in defaults.
pub fn resolve_config_path(cli_arg: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = cli_arg {
        return Some(path.to_path_buf());
    }

    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    dirs::config_dir()
        .map(|d| d.join("wildmap").join("config.toml"))
        .filter(|p| p.exists())
}

/// Load configuration from an optional path.
///
/// Missing file → warning + defaults. Unreadable or malformed file → error.
pub fn load_toml_config(path: Option<&Path>) -> Result<TomlConfig> {
    let Some(path) = path else {
        info!("No config file found, using built-in defaults");
        return Ok(TomlConfig::default());
    };

    if !path.exists() {
        warn!(
            "Config file {} not found, using built-in defaults",
            path.display()
        );
        return Ok(TomlConfig::default());
    }

    let content = std::fs::read_to_string(path)?;
    let config: TomlConfig = toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))?;

    // Surface bad dataset overrides at startup rather than on first load
    config.catalog()?;

    info!("Loaded config from {}", path.display());
    Ok(config)
}
