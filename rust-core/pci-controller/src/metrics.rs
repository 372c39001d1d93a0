// SPDX-License-Identifier: PMPL-1.0-or-later
//! Prometheus counters for the controller loop.

use prometheus::{IntCounter, Registry};

use crate::error::ControllerError;

/// Counters registered on a caller-provided registry
#[derive(Clone, Debug)]
pub struct ControllerMetrics {
    pub events_processed: IntCounter,
    pub conflicts_resolved: IntCounter,
    pub pool_exhausted: IntCounter,
    pub resolution_failures: IntCounter,
}

impl ControllerMetrics {
    /// Create the counters and register them on `registry`
    pub fn register(registry: &Registry) -> Result<Self, ControllerError> {
        Ok(Self {
            events_processed: counter(
                registry,
                "pci_controller_events_processed_total",
                "Store events run through conflict resolution",
            )?,
            conflicts_resolved: counter(
                registry,
                "pci_controller_conflicts_resolved_total",
                "PCI conflicts resolved and written back",
            )?,
            pool_exhausted: counter(
                registry,
                "pci_controller_pool_exhausted_total",
                "Conflicts left unresolved because no pool PCI was free",
            )?,
            resolution_failures: counter(
                registry,
                "pci_controller_resolution_failures_total",
                "Events skipped because resolution or write-back failed",
            )?,
        })
    }
}

fn counter(registry: &Registry, name: &str, help: &str) -> Result<IntCounter, ControllerError> {
    let counter =
        IntCounter::new(name, help).map_err(|e| ControllerError::Metrics(e.to_string()))?;
    registry
        .register(Box::new(counter.clone()))
        .map_err(|e| ControllerError::Metrics(e.to_string()))?;
    Ok(counter)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_exposes_counters() {
        let registry = Registry::new();
        let metrics = ControllerMetrics::register(&registry).unwrap();
        metrics.events_processed.inc();

        assert_eq!(registry.gather().len(), 4);
        assert_eq!(metrics.events_processed.get(), 1);
        assert_eq!(metrics.pool_exhausted.get(), 0);
    }

    #[test]
    fn test_double_registration_fails() {
        let registry = Registry::new();
        ControllerMetrics::register(&registry).unwrap();
        let err = ControllerMetrics::register(&registry).unwrap_err();
        assert!(matches!(err, ControllerError::Metrics(_)));
    }
}
