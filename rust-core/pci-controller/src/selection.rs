// SPDX-License-Identifier: PMPL-1.0-or-later
//! PCI selection policy.
//!
//! Decides whether a cell must change its PCI and, if so, which free value it
//! adopts. A cell keeps its PCI whenever no same-carrier cell within the
//! search radius uses it, even if a lower value is free: no proactive
//! reassignment of already consistent cells.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use pci_store::MetricStore;
use pci_types::{CellEntry, Pci};

use crate::config::{ControllerConfig, SelectionPolicy};
use crate::error::ControllerError;
use crate::occupancy::OccupancyMap;
use crate::traversal::NeighborTraversal;

/// Outcome of resolving one cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Resolution {
    /// The current PCI is free within the search radius.
    Unchanged,
    /// The current PCI collides; `to` is free within the search radius.
    Reassign { from: Pci, to: Pci },
}

impl Resolution {
    pub fn changed(&self) -> bool {
        matches!(self, Resolution::Reassign { .. })
    }

    /// Replacement PCI, if one was selected.
    pub fn new_pci(&self) -> Option<Pci> {
        match self {
            Resolution::Unchanged => None,
            Resolution::Reassign { to, .. } => Some(*to),
        }
    }
}

/// Resolves a single cell entry against the live store.
pub struct PciResolver {
    store: Arc<dyn MetricStore>,
    search_depth: usize,
    policy: SelectionPolicy,
}

impl PciResolver {
    pub fn new(store: Arc<dyn MetricStore>, config: &ControllerConfig) -> Self {
        Self {
            store,
            search_depth: config.search_depth,
            policy: config.selection,
        }
    }

    /// Decide the PCI for `entry`.
    ///
    /// Fails with [`ControllerError::InvalidRange`] on a malformed pool and
    /// with [`ControllerError::PoolExhausted`] when the current PCI collides
    /// and no pool value is free. Never writes to the store.
    pub async fn resolve(&self, entry: &CellEntry) -> Result<Resolution, ControllerError> {
        let mut occupancy = OccupancyMap::build(&entry.pci_pool)?;

        let stats = NeighborTraversal::new(self.store.as_ref(), self.search_depth)
            .run(entry, &mut occupancy)
            .await;
        debug!(
            cell = %entry.identity,
            visited = stats.visited,
            resolved = stats.resolved,
            unresolved = stats.unresolved,
            marked = stats.marked,
            "Neighbour traversal complete"
        );

        let current = entry.metric.pci;
        if !occupancy.is_occupied(current) {
            return Ok(Resolution::Unchanged);
        }

        match occupancy.select(self.policy) {
            Some(pci) => Ok(Resolution::Reassign {
                from: current,
                to: pci,
            }),
            None => Err(ControllerError::PoolExhausted {
                cell: entry.identity.to_string(),
                pci: current,
            }),
        }
    }
}
