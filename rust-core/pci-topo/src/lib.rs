// SPDX-License-Identifier: PMPL-1.0-or-later
//! PCI Topology Adapter
//!
//! Persists resolved cell state (PCI, carrier and neighbour list) into the
//! network topology, which keeps its own representation of cells: neighbour
//! references are flattened to hex-rendered PLMN and cell ids.
//!
//! The controller publishes here after a successful write-back. Failures are
//! reported to the caller, which logs them; nothing in this crate retries.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use pci_types::{Arfcn, CellIdentity, DecodeError, NeighborCell, Pci};

/// Topology errors
#[derive(Error, Debug, Clone)]
pub enum TopoError {
    #[error("Cell not found in topology: {0}")]
    NotFound(String),

    #[error("Could not decode neighbour identity: {0}")]
    Decode(#[from] DecodeError),
}

/// Neighbour reference as the topology stores it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NeighborCellId {
    /// PLMN id, lowercase hex.
    pub plmn_id: String,
    /// Cell id, lowercase hex.
    pub cell_global_id: String,
}

/// Cell aspect held by the topology
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct E2Cell {
    pub identity: CellIdentity,
    pub pci: Pci,
    pub arfcn: Arfcn,
    pub neighbor_cell_ids: Vec<NeighborCellId>,
}

impl E2Cell {
    /// A cell with no PCI, carrier or neighbours recorded yet
    pub fn new(identity: CellIdentity) -> Self {
        Self {
            identity,
            pci: 0,
            arfcn: 0,
            neighbor_cell_ids: Vec::new(),
        }
    }
}

/// Flatten neighbour relations into topology references.
///
/// Relations without a technology choice are skipped. A relation whose
/// identity cannot be decoded fails the whole conversion.
pub fn neighbor_cell_ids(neighbors: &[NeighborCell]) -> Result<Vec<NeighborCellId>, TopoError> {
    let mut ids = Vec::with_capacity(neighbors.len());
    for neighbor in neighbors {
        let Some(view) = neighbor.view() else {
            warn!("Skipping neighbour without NR or EUTRA choice");
            continue;
        };
        let cgi = view.identity.canonical()?;
        ids.push(NeighborCellId {
            plmn_id: format!("{:x}", cgi.plmn_id),
            cell_global_id: format!("{:x}", cgi.cell_id),
        });
    }
    Ok(ids)
}

/// Write contract of the topology
#[async_trait]
pub trait TopologyClient: Send + Sync {
    /// Record the resolved PCI, neighbour list and carrier of `cell`
    async fn update_cell_aspects(
        &self,
        cell: &CellIdentity,
        pci: Pci,
        neighbors: &[NeighborCell],
        arfcn: Arfcn,
    ) -> Result<(), TopoError>;

    /// Get one cell
    async fn get_cell(&self, cell: &CellIdentity) -> Result<E2Cell, TopoError>;

    /// List all cells
    async fn cells(&self) -> Result<Vec<E2Cell>, TopoError>;
}

/// In-memory topology, keyed by cell identity
#[derive(Debug, Clone, Default)]
pub struct InMemoryTopology {
    cells: Arc<RwLock<BTreeMap<CellIdentity, E2Cell>>>,
}

impl InMemoryTopology {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make a cell known to the topology. Only known cells can be updated.
    pub async fn register_cell(&self, cell: E2Cell) {
        self.cells.write().await.insert(cell.identity.clone(), cell);
    }
}

#[async_trait]
impl TopologyClient for InMemoryTopology {
    async fn update_cell_aspects(
        &self,
        cell: &CellIdentity,
        pci: Pci,
        neighbors: &[NeighborCell],
        arfcn: Arfcn,
    ) -> Result<(), TopoError> {
        let neighbor_ids = neighbor_cell_ids(neighbors)?;

        let mut cells = self.cells.write().await;
        let object = cells
            .get_mut(cell)
            .ok_or_else(|| TopoError::NotFound(cell.to_string()))?;
        object.pci = pci;
        object.arfcn = arfcn;
        object.neighbor_cell_ids = neighbor_ids;

        debug!(cell = %cell, pci, arfcn, "Stored cell aspects in topology");
        Ok(())
    }

    async fn get_cell(&self, cell: &CellIdentity) -> Result<E2Cell, TopoError> {
        self.cells
            .read()
            .await
            .get(cell)
            .cloned()
            .ok_or_else(|| TopoError::NotFound(cell.to_string()))
    }

    async fn cells(&self) -> Result<Vec<E2Cell>, TopoError> {
        Ok(self.cells.read().await.values().cloned().collect())
    }
}
