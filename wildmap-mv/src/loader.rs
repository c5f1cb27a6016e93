//! Feed loading
//!
//! A load resolves the dataset name, fetches the feed, transforms it and
//! hands the result to [`MapViewState::create_or_update`]. Every failure
//! happens before the view is touched, so a failed load never leaves a
//! half-updated map.
//!
//! Loads are not queued. Each one takes a generation number when it starts;
//! under [`LoadOrdering::LatestRequest`] a response that arrives after a
//! newer load has been applied is dropped, under
//! [`LoadOrdering::LastResponse`] it is shown anyway.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error, info};
use wildmap_common::config::LoadOrdering;
use wildmap_common::{DatasetCatalog, ResolvedDataset};

use crate::error::LoadError;
use crate::feature::FeatureCollection;
use crate::surface::MapSurface;
use crate::view::MapViewState;

/// Where feed documents come from
#[async_trait]
pub trait FeedSource: Send + Sync {
    /// Raw bytes of the named feed file
    async fn fetch(&self, file: &str) -> Result<Vec<u8>, LoadError>;

    /// Location description for logs
    fn describe(&self) -> String;
}

/// Reject names that are empty or could leave the feed root
fn validate_feed_name(file: &str) -> Result<(), LoadError> {
    let bad = file.is_empty()
        || file.starts_with('.')
        || file.contains('/')
        || file.contains('\\')
        || file.contains("..");
    if bad {
        return Err(LoadError::InvalidName(file.to_string()));
    }
    Ok(())
}

/// Feeds read from a local directory
#[derive(Debug, Clone)]
pub struct DirFeedSource {
    root: PathBuf,
}

impl DirFeedSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl FeedSource for DirFeedSource {
    async fn fetch(&self, file: &str) -> Result<Vec<u8>, LoadError> {
        validate_feed_name(file)?;
        Ok(tokio::fs::read(self.root.join(file)).await?)
    }

    fn describe(&self) -> String {
        self.root.display().to_string()
    }
}

/// Feeds fetched relative to a base URL
#[derive(Debug, Clone)]
pub struct HttpFeedSource {
    http_client: reqwest::Client,
    base_url: String,
}

impl HttpFeedSource {
    pub fn new(base_url: impl Into<String>) -> Result<Self, LoadError> {
        let http_client = reqwest::Client::builder()
            .build()
            .map_err(|e| LoadError::Fetch(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: base_url.into(),
        })
    }
}

#[async_trait]
impl FeedSource for HttpFeedSource {
    async fn fetch(&self, file: &str) -> Result<Vec<u8>, LoadError> {
        validate_feed_name(file)?;
        let url = format!("{}/{}", self.base_url.trim_end_matches('/'), file);

        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(|e| LoadError::Fetch(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LoadError::Status {
                file: file.to_string(),
                status: status.as_u16(),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| LoadError::Fetch(e.to_string()))?;
        Ok(bytes.to_vec())
    }

    fn describe(&self) -> String {
        self.base_url.clone()
    }
}

/// A started load: its generation and resolved dataset
#[derive(Debug, Clone)]
pub struct LoadTicket {
    pub generation: u64,
    pub dataset: ResolvedDataset,
}

/// Loads datasets into a shared [`MapViewState`]
pub struct FeedLoader {
    source: Arc<dyn FeedSource>,
    catalog: Arc<DatasetCatalog>,
    ordering: LoadOrdering,
    next_generation: AtomicU64,
}

impl FeedLoader {
    pub fn new(
        source: Arc<dyn FeedSource>,
        catalog: Arc<DatasetCatalog>,
        ordering: LoadOrdering,
    ) -> Self {
        Self {
            source,
            catalog,
            ordering,
            next_generation: AtomicU64::new(0),
        }
    }

    pub fn catalog(&self) -> &DatasetCatalog {
        &self.catalog
    }

    pub fn ordering(&self) -> LoadOrdering {
        self.ordering
    }

    /// Start a load: resolve the name and take the next generation
    pub fn begin(&self, name: &str) -> LoadTicket {
        let generation = self.next_generation.fetch_add(1, Ordering::SeqCst) + 1;
        LoadTicket {
            generation,
            dataset: self.catalog.resolve(name),
        }
    }

    /// Fetch and transform the ticket's feed without touching any view
    pub async fn fetch(&self, ticket: &LoadTicket) -> Result<FeatureCollection, LoadError> {
        debug!(
            file = %ticket.dataset.file,
            generation = ticket.generation,
            source = %self.source.describe(),
            "Fetching feed"
        );

        let bytes = self.source.fetch(&ticket.dataset.file).await?;
        Ok(FeatureCollection::from_feed_slice(&bytes)?)
    }

    /// Apply a fetched collection, unless the ordering rule says it is stale
    pub fn apply<S: MapSurface>(
        &self,
        ticket: &LoadTicket,
        view: &mut MapViewState<S>,
        collection: &FeatureCollection,
    ) -> Result<(), LoadError> {
        let applied = view.applied_generation();
        if self.ordering == LoadOrdering::LatestRequest && ticket.generation < applied {
            return Err(LoadError::Superseded {
                generation: ticket.generation,
                applied,
            });
        }

        view.create_or_update(&ticket.dataset, collection);
        view.mark_applied(ticket.generation.max(applied));

        info!(
            file = %ticket.dataset.file,
            color = %ticket.dataset.color,
            features = collection.len(),
            generation = ticket.generation,
            "Dataset displayed"
        );
        Ok(())
    }

    /// Fetch the ticket's feed, then apply it to the shared view
    pub async fn complete<S>(
        &self,
        ticket: LoadTicket,
        view: &Mutex<MapViewState<S>>,
    ) -> Result<FeatureCollection, LoadError>
    where
        S: MapSurface + Send,
    {
        let collection = self.fetch(&ticket).await?;
        self.apply(&ticket, &mut *view.lock().await, &collection)?;
        Ok(collection)
    }

    /// Load a dataset by id or feed file name
    pub async fn load_feed<S>(
        &self,
        view: &Mutex<MapViewState<S>>,
        name: &str,
    ) -> Result<FeatureCollection, LoadError>
    where
        S: MapSurface + Send,
    {
        let ticket = self.begin(name);
        self.complete(ticket, view).await
    }

    /// [`load_feed`](Self::load_feed), logging and swallowing any failure
    pub async fn load_feed_logged<S>(
        &self,
        view: &Mutex<MapViewState<S>>,
        name: &str,
    ) -> Option<FeatureCollection>
    where
        S: MapSurface + Send,
    {
        match self.load_feed(view, name).await {
            Ok(collection) => Some(collection),
            Err(e) => {
                log_load_failure(name, &e);
                None
            }
        }
    }
}

/// Stale loads log at debug, other failures at error
pub fn log_load_failure(name: &str, e: &LoadError) {
    match e {
        LoadError::Superseded { .. } => debug!("Discarded stale load of {}: {}", name, e),
        _ => error!("Failed to load {}: {}", name, e),
    }
}
