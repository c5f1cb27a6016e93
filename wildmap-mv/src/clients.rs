//! Per-client map views
//!
//! Every browser tab builds its own map widget, so each one gets its own
//! [`MapViewState`], keyed by an id the page generates at startup. The
//! registry is bounded; past capacity the least recently used view is
//! dropped and that client simply starts over on its next request.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::ApiError;
use crate::surface::CommandBuffer;
use crate::view::MapViewState;

/// Client id used when a request names none
pub const DEFAULT_CLIENT: &str = "default";

/// Longest accepted client id
pub const MAX_CLIENT_ID_LEN: usize = 64;

pub type SharedView = Arc<Mutex<MapViewState<CommandBuffer>>>;

/// Check a client id: 1 to 64 ASCII letters, digits, `-` or `_`
pub fn validate_client_id(id: &str) -> Result<(), ApiError> {
    let ok = !id.is_empty()
        && id.len() <= MAX_CLIENT_ID_LEN
        && id
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_');
    if ok {
        Ok(())
    } else {
        Err(ApiError::BadRequest(format!("Invalid client id: {:?}", id)))
    }
}

struct Entry {
    view: SharedView,
    last_used: u64,
}

#[derive(Default)]
struct Inner {
    views: HashMap<String, Entry>,
    tick: u64,
}

/// Client id → map view
pub struct ViewRegistry {
    inner: Mutex<Inner>,
    capacity: usize,
}

impl ViewRegistry {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
            capacity: capacity.max(1),
        }
    }

    /// The client's view, created empty on first use
    pub async fn get_or_create(&self, client: &str) -> SharedView {
        let mut inner = self.inner.lock().await;
        inner.tick += 1;
        let tick = inner.tick;

        if let Some(entry) = inner.views.get_mut(client) {
            entry.last_used = tick;
            return entry.view.clone();
        }

        if inner.views.len() >= self.capacity {
            let oldest = inner
                .views
                .iter()
                .min_by_key(|(_, e)| e.last_used)
                .map(|(id, _)| id.clone());
            if let Some(id) = oldest {
                inner.views.remove(&id);
                debug!(client = %id, "Evicted least recently used map view");
            }
        }

        let view: SharedView = Arc::new(Mutex::new(MapViewState::new(CommandBuffer::new())));
        inner.views.insert(
            client.to_string(),
            Entry {
                view: view.clone(),
                last_used: tick,
            },
        );
        debug!(client = %client, "Created map view");
        view
    }

    /// The client's view, if it has one
    pub async fn get(&self, client: &str) -> Option<SharedView> {
        let mut inner = self.inner.lock().await;
        inner.tick += 1;
        let tick = inner.tick;
        inner.views.get_mut(client).map(|entry| {
            entry.last_used = tick;
            entry.view.clone()
        })
    }

    /// Forget the client's widget state; other clients are untouched
    pub async fn reset(&self, client: &str) {
        let view = self.get_or_create(client).await;
        view.lock().await.reset();
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.views.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
