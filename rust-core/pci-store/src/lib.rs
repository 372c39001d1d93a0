// SPDX-License-Identifier: PMPL-1.0-or-later
//
// PCI Metric Store
//
// This crate defines the contract of the per-cell metric store that the PCI
// controller watches and writes back to, plus an in-memory implementation.
// The store is fed by an upstream ingestion pipeline; the controller only
// needs to watch changes, iterate snapshots and update a cell's PCI.
//
// # Modules
//
// - [`backend`] -- The `MetricStore` trait and its event types.
// - [`error`] -- The `StoreError` enum.
// - [`memory`] -- A `BTreeMap` + broadcast channel store for tests and
//   single-process deployments.
// - [`metrics`] -- A transparent wrapper that counts store operations.
//
// # Example
//
// ```rust
// use futures::StreamExt;
// use pci_store::{EventType, InMemoryMetricStore, MetricStore};
// use pci_types::{CellEntry, CellIdentity};
//
// # tokio_test::block_on(async {
// let store = InMemoryMetricStore::new();
// let mut events = store.watch().await.unwrap();
//
// store.put(CellEntry::new(CellIdentity::nr(0x1, 0x2), 5, 100)).await.unwrap();
//
// let event = events.next().await.unwrap();
// assert_eq!(event.event_type, EventType::Created);
// # });
// ```

pub mod backend;
pub mod error;
pub mod memory;
pub mod metrics;

pub use backend::{EntryStream, EventStream, EventType, MetricStore, StoreEvent};
pub use error::StoreError;
pub use memory::{InMemoryMetricStore, DEFAULT_EVENT_CAPACITY};
pub use metrics::{MeteredStore, StoreStats};
