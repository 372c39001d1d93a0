// SPDX-License-Identifier: PMPL-1.0-or-later
//
// Core metric store trait.
//
// The store holds one `CellEntry` per cell, keyed structurally by the entry's
// `CellIdentity`. It offers two independent capabilities that consumers
// compose: a change-event subscription (`watch`) and a finite snapshot
// iteration over all entries (`entries`). Neither offers lookup by decoded
// canonical identity; callers that need that scan `entries`.

use async_trait::async_trait;
use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};

use pci_types::{CellEntry, CellIdentity, Pci};

use crate::error::StoreError;

/// Kind of change carried by a [`StoreEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    Created,
    Updated,
    Deleted,
}

/// A change to one entry of the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreEvent {
    pub key: CellIdentity,
    /// Entry after the change; for `Deleted`, the entry that was removed.
    pub value: CellEntry,
    pub event_type: EventType,
}

/// Finite stream over a snapshot of the store's entries.
pub type EntryStream = BoxStream<'static, CellEntry>;

/// Stream of store changes; ends when the store's event feed closes.
pub type EventStream = BoxStream<'static, StoreEvent>;

/// A watchable store of per-cell metric entries.
///
/// Implementations must be safe to share across threads and tokio tasks.
#[async_trait]
pub trait MetricStore: Send + Sync {
    /// Insert or replace the entry under `entry.identity`.
    ///
    /// Emits `Created` for a new key and `Updated` otherwise.
    async fn put(&self, entry: CellEntry) -> Result<(), StoreError>;

    /// Fetch the entry stored under `key`.
    ///
    /// Returns `Ok(None)` if the key does not exist, rather than an error.
    async fn get(&self, key: &CellIdentity) -> Result<Option<CellEntry>, StoreError>;

    /// Remove the entry under `key`, emitting `Deleted` if it existed.
    ///
    /// Returns `Ok(true)` if an entry was removed.
    async fn delete(&self, key: &CellIdentity) -> Result<bool, StoreError>;

    /// Open an iteration over a snapshot of all current entries.
    ///
    /// Every call opens its own independent iteration. Entries written after
    /// the snapshot was taken may or may not appear.
    async fn entries(&self) -> Result<EntryStream, StoreError>;

    /// Subscribe to change events from this point on.
    async fn watch(&self) -> Result<EventStream, StoreError>;

    /// Set the PCI of the entry under `key`, emitting `Updated`.
    ///
    /// Idempotent. Fails with [`StoreError::NotFound`] if no entry exists.
    async fn update_pci(&self, key: &CellIdentity, pci: Pci) -> Result<(), StoreError>;

    /// A human-readable name for this store, used in logging and metrics.
    fn name(&self) -> &str;
}
