// SPDX-License-Identifier: PMPL-1.0-or-later
//! PCI resolver service binary
//!
//! Seeds an in-memory metric store, resolves every seeded cell once, then
//! runs the conflict resolution loop until Ctrl-C.

mod config;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use prometheus::{Encoder, Registry, TextEncoder};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

use pci_controller::{ControllerMetrics, PciController, SelectionPolicy};
use pci_store::{EventType, InMemoryMetricStore, MeteredStore, MetricStore, StoreEvent};
use pci_topo::{E2Cell, InMemoryTopology};

use config::{load_seed, ServiceConfig};

/// Reactive PCI conflict resolver.
#[derive(Parser, Debug)]
#[command(name = "pci-resolver", version, about = "Reactive PCI conflict resolver")]
struct Cli {
    /// JSON configuration file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// JSON array of cell entries to seed the store with.
    #[arg(long)]
    seed: Option<PathBuf>,

    /// Log filter used when RUST_LOG is unset.
    #[arg(long)]
    log_level: Option<String>,

    /// Emit JSON log lines.
    #[arg(long)]
    json_logs: bool,

    /// Neighbour search depth.
    #[arg(long)]
    search_depth: Option<usize>,

    /// Pick the first free PCI in pool order instead of the lowest.
    #[arg(long)]
    first_found: bool,
}

impl Cli {
    fn apply(self, config: &mut ServiceConfig) {
        if let Some(seed) = self.seed {
            config.seed_path = Some(seed);
        }
        if let Some(level) = self.log_level {
            config.log_level = level;
        }
        if self.json_logs {
            config.json_logs = true;
        }
        if let Some(depth) = self.search_depth {
            config.controller.search_depth = depth;
        }
        if self.first_found {
            config.controller.selection = SelectionPolicy::FirstFound;
        }
    }
}

fn init_tracing(config: &ServiceConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if config.json_logs {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = ServiceConfig::load(cli.config.as_deref())?;
    cli.apply(&mut config);
    init_tracing(&config);

    let metered = Arc::new(MeteredStore::new(InMemoryMetricStore::with_event_capacity(
        config.event_buffer,
    )));
    let store: Arc<dyn MetricStore> = metered.clone();
    let topology = Arc::new(InMemoryTopology::new());

    let seeded = match config.seed_path {
        Some(ref path) => load_seed(path)?,
        None => Vec::new(),
    };
    for entry in &seeded {
        topology.register_cell(E2Cell::new(entry.identity.clone())).await;
        store
            .put(entry.clone())
            .await
            .with_context(|| format!("seeding {}", entry.identity))?;
    }
    info!(cells = seeded.len(), "Seeded metric store");

    let registry = Registry::new();
    let metrics = ControllerMetrics::register(&registry)?;
    let controller = Arc::new(
        PciController::new(config.controller.clone(), store.clone())
            .with_topology(topology)
            .with_metrics(metrics),
    );

    // Seeded entries predate the subscription, so resolve them once up front.
    for entry in &seeded {
        let Some(current) = store.get(&entry.identity).await? else {
            continue;
        };
        let event = StoreEvent {
            key: current.identity.clone(),
            value: current,
            event_type: EventType::Created,
        };
        if let Err(err) = controller.handle_event(&event).await {
            error!(cell = %event.key, error = %err, "Initial PCI resolution failed");
        }
    }

    let cancel = CancellationToken::new();
    let handle = controller.clone().spawn(cancel.clone());

    tokio::signal::ctrl_c()
        .await
        .context("waiting for Ctrl-C")?;
    info!("Shutting down");
    cancel.cancel();
    handle.await.context("controller task panicked")?;

    let status = controller.status().await;
    let stats = metered.stats().await;
    info!(
        events = status.events_processed,
        resolved = status.conflicts_resolved,
        failures = status.failure_count,
        lookups = stats.entries_count,
        write_backs = stats.update_pci_count,
        "PCI controller stopped"
    );

    let mut buffer = Vec::new();
    TextEncoder::new().encode(&registry.gather(), &mut buffer)?;
    debug!(metrics = %String::from_utf8_lossy(&buffer), "Final metrics");

    Ok(())
}
