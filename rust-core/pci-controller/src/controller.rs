// SPDX-License-Identifier: PMPL-1.0-or-later
//! PCI controller event loop.
//!
//! One long-lived task consumes the metric store's change events in delivery
//! order and resolves each created or updated cell before taking the next
//! event, so two resolutions never interleave. A resolved change is written
//! back with a single unconditional `update_pci`; failures are logged and the
//! event is skipped. The loop ends when its cancellation token fires or the
//! event stream closes.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, RwLock};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use pci_store::{EventType, MetricStore, StoreEvent};
use pci_topo::TopologyClient;
use pci_types::{CellEntry, CellIdentity, Pci};

use crate::config::ControllerConfig;
use crate::error::ControllerError;
use crate::metrics::ControllerMetrics;
use crate::selection::{PciResolver, Resolution};

/// Status of the controller
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ControllerStatus {
    /// Whether the event loop is running
    pub running: bool,
    /// Events run through resolution, failed or not
    pub events_processed: u64,
    /// Conflicts resolved and written back
    pub conflicts_resolved: u64,
    /// Events skipped on error
    pub failure_count: u64,
    /// Last successful write-back
    pub last_resolution: Option<DateTime<Utc>>,
}

/// Outcome of one processed event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolutionReport {
    pub cell: CellIdentity,
    pub resolution: Resolution,
    pub completed_at: DateTime<Utc>,
}

/// The PCI conflict resolution loop
pub struct PciController {
    config: ControllerConfig,
    store: Arc<dyn MetricStore>,
    resolver: PciResolver,
    topology: Option<Arc<dyn TopologyClient>>,
    metrics: Option<ControllerMetrics>,
    status: Arc<RwLock<ControllerStatus>>,
    result_sender: Option<mpsc::Sender<ResolutionReport>>,
}

impl PciController {
    /// Create a controller over `store`
    pub fn new(config: ControllerConfig, store: Arc<dyn MetricStore>) -> Self {
        let resolver = PciResolver::new(store.clone(), &config);
        Self {
            config,
            store,
            resolver,
            topology: None,
            metrics: None,
            status: Arc::new(RwLock::new(ControllerStatus::default())),
            result_sender: None,
        }
    }

    /// Create with default config
    pub fn with_defaults(store: Arc<dyn MetricStore>) -> Self {
        Self::new(ControllerConfig::default(), store)
    }

    /// Publish resolved cell state to `topology`
    pub fn with_topology(mut self, topology: Arc<dyn TopologyClient>) -> Self {
        self.topology = Some(topology);
        self
    }

    /// Count events and outcomes in Prometheus
    pub fn with_metrics(mut self, metrics: ControllerMetrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Set result notification channel
    pub fn with_result_channel(mut self, sender: mpsc::Sender<ResolutionReport>) -> Self {
        self.result_sender = Some(sender);
        self
    }

    /// Get current status
    pub async fn status(&self) -> ControllerStatus {
        self.status.read().await.clone()
    }

    /// Run the loop on its own task
    pub fn spawn(self: Arc<Self>, cancel: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(async move { self.run(cancel).await })
    }

    /// Consume store events until cancelled or the stream ends.
    ///
    /// A failed subscription is logged and returns immediately; restarting
    /// is left to the owner.
    pub async fn run(&self, cancel: CancellationToken) {
        let mut events = match self.store.watch().await {
            Ok(events) => events,
            Err(err) => {
                error!(store = self.store.name(), error = %err, "Could not watch metric store");
                return;
            }
        };

        self.status.write().await.running = true;
        info!(store = self.store.name(), depth = self.config.search_depth, "PCI controller started");

        loop {
            let event = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    info!("PCI controller cancelled");
                    break;
                }
                next = events.next() => match next {
                    Some(event) => event,
                    None => {
                        info!("Metric store event stream closed");
                        break;
                    }
                },
            };

            if event.event_type == EventType::Deleted {
                continue;
            }

            debug!(cell = %event.key, event_type = ?event.event_type, pci = event.value.metric.pci, "Metric event");
            if let Err(err) = self.handle_event(&event).await {
                error!(cell = %event.key, error = %err, "Skipping PCI resolution for event");
            }
        }

        self.status.write().await.running = false;
    }

    /// Resolve one event and write back any change.
    pub async fn handle_event(&self, event: &StoreEvent) -> Result<Resolution, ControllerError> {
        let entry = &event.value;
        let outcome = self.resolve_and_apply(&event.key, entry).await;

        {
            let mut status = self.status.write().await;
            status.events_processed += 1;
            match &outcome {
                Ok(Resolution::Reassign { .. }) => {
                    status.conflicts_resolved += 1;
                    status.last_resolution = Some(Utc::now());
                }
                Ok(Resolution::Unchanged) => {}
                Err(_) => status.failure_count += 1,
            }
        }

        if let Some(ref metrics) = self.metrics {
            metrics.events_processed.inc();
            match &outcome {
                Ok(Resolution::Reassign { .. }) => metrics.conflicts_resolved.inc(),
                Ok(Resolution::Unchanged) => {}
                Err(ControllerError::PoolExhausted { .. }) => {
                    metrics.pool_exhausted.inc();
                    metrics.resolution_failures.inc();
                }
                Err(_) => metrics.resolution_failures.inc(),
            }
        }

        let resolution = outcome?;
        let pci = resolution.new_pci().unwrap_or(entry.metric.pci);
        self.publish_topology(entry, pci).await;
        self.notify(&event.key, resolution).await;
        Ok(resolution)
    }

    async fn resolve_and_apply(
        &self,
        key: &CellIdentity,
        entry: &CellEntry,
    ) -> Result<Resolution, ControllerError> {
        let resolution = self.resolver.resolve(entry).await?;
        if let Resolution::Reassign { from, to } = resolution {
            info!(cell = %key, from, to, "Resolved PCI conflict");
            self.store.update_pci(key, to).await?;
        }
        Ok(resolution)
    }

    async fn publish_topology(&self, entry: &CellEntry, pci: Pci) {
        if !self.config.publish_topology {
            return;
        }
        let Some(ref topology) = self.topology else {
            return;
        };
        if let Err(err) = topology
            .update_cell_aspects(&entry.identity, pci, &entry.neighbors, entry.metric.arfcn)
            .await
        {
            error!(cell = %entry.identity, error = %err, "Could not store cell aspects in topology");
        }
    }

    async fn notify(&self, cell: &CellIdentity, resolution: Resolution) {
        let Some(ref sender) = self.result_sender else {
            return;
        };
        let report = ResolutionReport {
            cell: cell.clone(),
            resolution,
            completed_at: Utc::now(),
        };
        if let Err(err) = sender.send(report).await {
            warn!(error = %err, "Resolution report receiver dropped");
        }
    }
}
