//! # WildMap Common Library
//!
//! Shared code for the WildMap services:
//! - Error type used by configuration and catalog loading
//! - TOML/environment configuration
//! - Dataset catalog (dataset id → feed file + circle color)
//! - Tracing subscriber initialization

pub mod config;
pub mod dataset;
pub mod error;
pub mod logging;

pub use dataset::{DatasetCatalog, DatasetEntry, ResolvedDataset, DEFAULT_COLOR};
pub use error::{Error, Result};
