// SPDX-License-Identifier: PMPL-1.0-or-later
//
// In-memory metric store.
//
// Uses a `BTreeMap` wrapped in a tokio `RwLock` for the entries and a tokio
// broadcast channel to fan change events out to every watcher. Events are
// published while the entry lock is held, so watchers observe changes in the
// order they were applied. Intended for tests, simulation and single-process
// deployments where the ingestion pipeline writes into the same process.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::sync::RwLock;
use tracing::{debug, trace, warn};

use pci_types::{CellEntry, CellIdentity, Pci};

use crate::backend::{EntryStream, EventStream, EventType, MetricStore, StoreEvent};
use crate::error::StoreError;

/// Events buffered per watcher before a slow watcher starts losing them.
pub const DEFAULT_EVENT_CAPACITY: usize = 256;

/// An in-memory metric store with broadcast change events.
///
/// Cloning is cheap and every clone shares the same entries and event feed.
///
/// # Example
///
/// ```rust
/// use pci_store::{InMemoryMetricStore, MetricStore};
/// use pci_types::{CellEntry, CellIdentity};
///
/// # tokio_test::block_on(async {
/// let store = InMemoryMetricStore::new();
/// let id = CellIdentity::nr(0x1, 0x10);
/// store.put(CellEntry::new(id.clone(), 5, 100)).await.unwrap();
/// store.update_pci(&id, 7).await.unwrap();
/// assert_eq!(store.get(&id).await.unwrap().unwrap().metric.pci, 7);
/// # });
/// ```
#[derive(Debug, Clone)]
pub struct InMemoryMetricStore {
    data: Arc<RwLock<BTreeMap<CellIdentity, CellEntry>>>,
    /// `None` once the feed has been closed.
    events: Arc<RwLock<Option<broadcast::Sender<StoreEvent>>>>,
}

impl InMemoryMetricStore {
    /// Create an empty store with the default event buffer.
    pub fn new() -> Self {
        Self::with_event_capacity(DEFAULT_EVENT_CAPACITY)
    }

    /// Create an empty store buffering up to `capacity` events per watcher.
    pub fn with_event_capacity(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self {
            data: Arc::new(RwLock::new(BTreeMap::new())),
            events: Arc::new(RwLock::new(Some(tx))),
        }
    }

    /// Number of entries currently stored.
    pub async fn len(&self) -> usize {
        self.data.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.data.read().await.is_empty()
    }

    /// Shut down the event feed.
    ///
    /// Open watch streams end after draining buffered events; further
    /// `watch` calls fail with [`StoreError::Closed`]. Writes still succeed.
    pub async fn close(&self) {
        if self.events.write().await.take().is_some() {
            debug!("metric store event feed closed");
        }
    }

    async fn publish(&self, key: CellIdentity, value: CellEntry, event_type: EventType) {
        let events = self.events.read().await;
        if let Some(tx) = events.as_ref() {
            if tx.send(StoreEvent { key, value, event_type }).is_err() {
                trace!("no watchers for metric store event");
            }
        }
    }
}

impl Default for InMemoryMetricStore {
    fn default() -> Self {
        Self::new()
    }
}

fn event_stream(rx: broadcast::Receiver<StoreEvent>) -> EventStream {
    stream::unfold(rx, |mut rx| async move {
        loop {
            match rx.recv().await {
                Ok(event) => return Some((event, rx)),
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "metric store watcher lagged, events dropped");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    })
    .boxed()
}

#[async_trait]
impl MetricStore for InMemoryMetricStore {
    async fn put(&self, entry: CellEntry) -> Result<(), StoreError> {
        let mut map = self.data.write().await;
        let key = entry.identity.clone();
        let event_type = match map.insert(key.clone(), entry.clone()) {
            Some(_) => EventType::Updated,
            None => EventType::Created,
        };
        self.publish(key, entry, event_type).await;
        Ok(())
    }

    async fn get(&self, key: &CellIdentity) -> Result<Option<CellEntry>, StoreError> {
        let map = self.data.read().await;
        Ok(map.get(key).cloned())
    }

    async fn delete(&self, key: &CellIdentity) -> Result<bool, StoreError> {
        let mut map = self.data.write().await;
        match map.remove(key) {
            Some(entry) => {
                self.publish(key.clone(), entry, EventType::Deleted).await;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn entries(&self) -> Result<EntryStream, StoreError> {
        let snapshot: Vec<CellEntry> = self.data.read().await.values().cloned().collect();
        Ok(stream::iter(snapshot).boxed())
    }

    async fn watch(&self) -> Result<EventStream, StoreError> {
        let events = self.events.read().await;
        match events.as_ref() {
            Some(tx) => Ok(event_stream(tx.subscribe())),
            None => Err(StoreError::Closed),
        }
    }

    async fn update_pci(&self, key: &CellIdentity, pci: Pci) -> Result<(), StoreError> {
        let mut map = self.data.write().await;
        let entry = map
            .get_mut(key)
            .ok_or_else(|| StoreError::NotFound(key.to_string()))?;
        entry.metric.pci = pci;
        let value = entry.clone();
        self.publish(key.clone(), value, EventType::Updated).await;
        Ok(())
    }

    fn name(&self) -> &str {
        "in-memory"
    }
}
