// SPDX-License-Identifier: PMPL-1.0-or-later
//! End-to-end tests for the controller event loop
//!
//! The controller runs on its own task against an in-memory store; tests
//! write entries as the ingestion pipeline would and observe the results
//! through the report channel and the store itself.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use pci_controller::{ControllerConfig, PciController, Resolution, ResolutionReport};
use pci_store::{EntryStream, EventStream, InMemoryMetricStore, MetricStore, StoreError};
use pci_topo::{E2Cell, InMemoryTopology, TopologyClient};
use pci_types::{CellEntry, CellIdentity, Pci, PciRange};
use tokio::sync::mpsc;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;

fn nr(n: u64) -> CellIdentity {
    CellIdentity::nr(0x00f110, n)
}

async fn start(
    store: &InMemoryMetricStore,
    config: ControllerConfig,
) -> (
    Arc<PciController>,
    mpsc::Receiver<ResolutionReport>,
    CancellationToken,
    tokio::task::JoinHandle<()>,
) {
    let (tx, rx) = mpsc::channel(64);
    let controller = Arc::new(
        PciController::new(config, Arc::new(store.clone())).with_result_channel(tx),
    );
    let cancel = CancellationToken::new();
    let handle = controller.clone().spawn(cancel.clone());
    wait_running(&controller).await;
    (controller, rx, cancel, handle)
}

async fn wait_running(controller: &PciController) {
    for _ in 0..200 {
        if controller.status().await.running {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("controller did not start");
}

async fn next_report(rx: &mut mpsc::Receiver<ResolutionReport>) -> ResolutionReport {
    timeout(Duration::from_secs(2), rx.recv())
        .await
        .expect("timed out waiting for report")
        .expect("report channel closed")
}

/// Drain reports until none arrive for a short while.
async fn settle(rx: &mut mpsc::Receiver<ResolutionReport>) -> Vec<ResolutionReport> {
    let mut reports = Vec::new();
    while let Ok(Some(report)) = timeout(Duration::from_millis(200), rx.recv()).await {
        reports.push(report);
    }
    reports
}

async fn pci_of(store: &InMemoryMetricStore, id: &CellIdentity) -> Pci {
    store.get(id).await.unwrap().unwrap().metric.pci
}

/// Test that a conflicting cell is repaired and the write-back re-checks clean
#[tokio::test]
async fn test_conflict_written_back() {
    let store = InMemoryMetricStore::new();
    let (_controller, mut rx, cancel, handle) = start(&store, ControllerConfig::default()).await;

    let b = CellEntry::new(nr(2), 5, 100);
    store.put(b.clone()).await.unwrap();
    let report = next_report(&mut rx).await;
    assert_eq!(report.cell, b.identity);
    assert_eq!(report.resolution, Resolution::Unchanged);

    let a = CellEntry::new(nr(1), 5, 100)
        .with_pool(PciRange::new(0, 6))
        .with_neighbor(b.as_neighbor());
    store.put(a.clone()).await.unwrap();

    let report = next_report(&mut rx).await;
    assert_eq!(report.cell, a.identity);
    assert_eq!(report.resolution, Resolution::Reassign { from: 5, to: 0 });
    assert_eq!(pci_of(&store, &a.identity).await, 0);

    // The write-back is itself an update event, which now resolves clean.
    let report = next_report(&mut rx).await;
    assert_eq!(report.cell, a.identity);
    assert_eq!(report.resolution, Resolution::Unchanged);

    cancel.cancel();
    handle.await.unwrap();
}

/// Test that a fully meshed cluster converges to distinct PCIs
#[tokio::test]
async fn test_mesh_converges_to_distinct_pcis() {
    let store = InMemoryMetricStore::new();
    let (controller, mut rx, cancel, handle) = start(&store, ControllerConfig::default()).await;

    let ids = [nr(1), nr(2), nr(3)];
    for id in &ids {
        let mut cell = CellEntry::new(id.clone(), 7, 100).with_pool(PciRange::new(0, 10));
        for other in ids.iter().filter(|o| *o != id) {
            cell = cell.with_neighbor(CellEntry::new(other.clone(), 7, 100).as_neighbor());
        }
        store.put(cell).await.unwrap();
    }

    let reports = settle(&mut rx).await;
    assert!(reports.len() >= 3);

    let mut pcis = Vec::new();
    for id in &ids {
        pcis.push(pci_of(&store, id).await);
    }
    pcis.sort_unstable();
    pcis.dedup();
    assert_eq!(pcis.len(), 3, "PCIs still collide: {pcis:?}");
    assert!(pcis.iter().all(|p| *p <= 10));

    let status = controller.status().await;
    assert_eq!(status.events_processed as usize, reports.len());
    assert_eq!(status.failure_count, 0);

    cancel.cancel();
    handle.await.unwrap();
}

/// Test that a failing event is skipped and the loop keeps going
#[tokio::test]
async fn test_bad_pool_does_not_stop_loop() {
    let store = InMemoryMetricStore::new();
    let (controller, mut rx, cancel, handle) = start(&store, ControllerConfig::default()).await;

    store
        .put(CellEntry::new(nr(1), 5, 100).with_pool(PciRange::new(9, 1)))
        .await
        .unwrap();
    store
        .put(CellEntry::new(nr(2), 5, 100).with_pool(PciRange::new(0, 9)))
        .await
        .unwrap();

    // Only the second event produces a report.
    let report = next_report(&mut rx).await;
    assert_eq!(report.cell, nr(2));

    let status = controller.status().await;
    assert_eq!(status.events_processed, 2);
    assert_eq!(status.failure_count, 1);

    cancel.cancel();
    handle.await.unwrap();
}

/// Test that deletions are not resolved
#[tokio::test]
async fn test_deleted_events_ignored() {
    let store = InMemoryMetricStore::new();
    let (controller, mut rx, cancel, handle) = start(&store, ControllerConfig::default()).await;

    store.put(CellEntry::new(nr(1), 5, 100)).await.unwrap();
    next_report(&mut rx).await;
    store.delete(&nr(1)).await.unwrap();
    store.put(CellEntry::new(nr(2), 5, 100)).await.unwrap();
    let report = next_report(&mut rx).await;
    assert_eq!(report.cell, nr(2));

    assert_eq!(controller.status().await.events_processed, 2);

    cancel.cancel();
    handle.await.unwrap();
}

/// Test that closing the store's event feed ends the loop
#[tokio::test]
async fn test_stream_close_ends_loop() {
    let store = InMemoryMetricStore::new();
    let (controller, _rx, _cancel, handle) = start(&store, ControllerConfig::default()).await;

    store.close().await;
    timeout(Duration::from_secs(2), handle)
        .await
        .expect("loop did not stop")
        .unwrap();
    assert!(!controller.status().await.running);
}

/// Test that resolved state reaches the topology
#[tokio::test]
async fn test_topology_published() {
    let store = InMemoryMetricStore::new();
    let topology = Arc::new(InMemoryTopology::new());
    topology.register_cell(E2Cell::new(nr(1))).await;

    let (tx, mut rx) = mpsc::channel(16);
    let controller = Arc::new(
        PciController::with_defaults(Arc::new(store.clone()))
            .with_topology(topology.clone())
            .with_result_channel(tx),
    );
    let cancel = CancellationToken::new();
    let handle = controller.clone().spawn(cancel.clone());
    wait_running(&controller).await;

    let b = CellEntry::new(nr(2), 3, 100);
    store
        .put(
            CellEntry::new(nr(1), 3, 100)
                .with_pool(PciRange::new(0, 5))
                .with_neighbor(b.as_neighbor()),
        )
        .await
        .unwrap();
    settle(&mut rx).await;

    let cell = topology.get_cell(&nr(1)).await.unwrap();
    assert_eq!(cell.pci, 0);
    assert_eq!(cell.arfcn, 100);
    assert_eq!(cell.neighbor_cell_ids.len(), 1);

    cancel.cancel();
    handle.await.unwrap();
}

/// Store that refuses subscriptions.
struct DeafStore;

#[async_trait]
impl MetricStore for DeafStore {
    async fn put(&self, _entry: CellEntry) -> Result<(), StoreError> {
        Ok(())
    }

    async fn get(&self, _key: &CellIdentity) -> Result<Option<CellEntry>, StoreError> {
        Ok(None)
    }

    async fn delete(&self, _key: &CellIdentity) -> Result<bool, StoreError> {
        Ok(false)
    }

    async fn entries(&self) -> Result<EntryStream, StoreError> {
        Err(StoreError::Unavailable("down".to_string()))
    }

    async fn watch(&self) -> Result<EventStream, StoreError> {
        Err(StoreError::Unavailable("down".to_string()))
    }

    async fn update_pci(&self, key: &CellIdentity, _pci: Pci) -> Result<(), StoreError> {
        Err(StoreError::NotFound(key.to_string()))
    }

    fn name(&self) -> &str {
        "deaf"
    }
}

/// Test that a failed subscription returns instead of hanging or panicking
#[tokio::test]
async fn test_watch_failure_returns() {
    let controller = Arc::new(PciController::with_defaults(Arc::new(DeafStore)));
    let handle = controller.clone().spawn(CancellationToken::new());

    timeout(Duration::from_secs(2), handle)
        .await
        .expect("loop did not return")
        .unwrap();
    assert!(!controller.status().await.running);
}

/// Test that the topology trait object is usable from the test side too
#[tokio::test]
async fn test_topology_lists_registered_cells() {
    let topology: Arc<dyn TopologyClient> = {
        let t = InMemoryTopology::new();
        t.register_cell(E2Cell::new(nr(1))).await;
        t.register_cell(E2Cell::new(nr(2))).await;
        Arc::new(t)
    };
    assert_eq!(topology.cells().await.unwrap().len(), 2);
}
