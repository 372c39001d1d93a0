// SPDX-License-Identifier: PMPL-1.0-or-later
//
// Metrics-collecting wrapper for metric stores.
//
// Wraps any `MetricStore` and transparently counts operations. Neighbour
// lookups during conflict resolution open one snapshot iteration each, so the
// `entries_count` counter is the main signal for how much scanning the
// controller performs per event.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use tokio::sync::RwLock;

use pci_types::{CellEntry, CellIdentity, Pci};

use crate::backend::{EntryStream, EventStream, MetricStore};
use crate::error::StoreError;

/// Accumulated statistics for a metric store.
///
/// All counters are monotonically increasing for the lifetime of the
/// [`MeteredStore`] that owns them, until [`MeteredStore::reset_stats`].
#[derive(Debug, Clone, Default)]
pub struct StoreStats {
    /// Number of `put` operations performed.
    pub put_count: u64,
    /// Number of `get` operations performed.
    pub get_count: u64,
    /// Number of `delete` operations performed.
    pub delete_count: u64,
    /// Number of snapshot iterations opened with `entries`.
    pub entries_count: u64,
    /// Number of `watch` subscriptions opened.
    pub watch_count: u64,
    /// Number of `update_pci` operations performed.
    pub update_pci_count: u64,
    /// Number of `update_pci` calls that failed.
    pub update_pci_failures: u64,
    /// Cumulative wall-clock latency of all `update_pci` calls, in milliseconds.
    pub update_latency_sum_ms: f64,
}

/// A metric store wrapper that collects operation counts.
///
/// # Example
///
/// ```rust
/// use pci_store::{InMemoryMetricStore, MeteredStore, MetricStore};
/// use pci_types::{CellEntry, CellIdentity};
///
/// # tokio_test::block_on(async {
/// let metered = MeteredStore::new(InMemoryMetricStore::new());
/// let id = CellIdentity::eutra(0x1, 0x2);
/// metered.put(CellEntry::new(id.clone(), 1, 100)).await.unwrap();
/// metered.get(&id).await.unwrap();
///
/// let stats = metered.stats().await;
/// assert_eq!(stats.put_count, 1);
/// assert_eq!(stats.get_count, 1);
/// # });
/// ```
pub struct MeteredStore<S: MetricStore> {
    inner: S,
    stats: Arc<RwLock<StoreStats>>,
}

impl<S: MetricStore> MeteredStore<S> {
    /// Wrap `inner` with operation counting.
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            stats: Arc::new(RwLock::new(StoreStats::default())),
        }
    }

    /// Return a snapshot of the current statistics.
    pub async fn stats(&self) -> StoreStats {
        self.stats.read().await.clone()
    }

    /// Reset all statistics to zero.
    pub async fn reset_stats(&self) {
        *self.stats.write().await = StoreStats::default();
    }

    /// Return a reference to the inner store.
    pub fn inner(&self) -> &S {
        &self.inner
    }
}

#[async_trait]
impl<S: MetricStore> MetricStore for MeteredStore<S> {
    async fn put(&self, entry: CellEntry) -> Result<(), StoreError> {
        self.stats.write().await.put_count += 1;
        self.inner.put(entry).await
    }

    async fn get(&self, key: &CellIdentity) -> Result<Option<CellEntry>, StoreError> {
        self.stats.write().await.get_count += 1;
        self.inner.get(key).await
    }

    async fn delete(&self, key: &CellIdentity) -> Result<bool, StoreError> {
        self.stats.write().await.delete_count += 1;
        self.inner.delete(key).await
    }

    async fn entries(&self) -> Result<EntryStream, StoreError> {
        self.stats.write().await.entries_count += 1;
        self.inner.entries().await
    }

    async fn watch(&self) -> Result<EventStream, StoreError> {
        self.stats.write().await.watch_count += 1;
        self.inner.watch().await
    }

    async fn update_pci(&self, key: &CellIdentity, pci: Pci) -> Result<(), StoreError> {
        let start = Instant::now();
        let result = self.inner.update_pci(key, pci).await;
        let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;

        let mut s = self.stats.write().await;
        s.update_pci_count += 1;
        s.update_latency_sum_ms += elapsed_ms;
        if result.is_err() {
            s.update_pci_failures += 1;
        }

        result
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}
