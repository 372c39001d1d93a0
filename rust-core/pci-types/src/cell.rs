// SPDX-License-Identifier: PMPL-1.0-or-later
//
// Per-cell radio metric records as held by the metric store.
//
// A `CellEntry` is the unit of record: the cell's identity, its live metric
// (PCI and carrier), the pool of PCIs it may adopt, and the neighbour
// relations it last reported. Neighbour relations are point-in-time snapshots
// and may be stale relative to the neighbour's own entry.

use serde::{Deserialize, Serialize};

use crate::identity::{CellIdentity, EutraCgi, NrCgi, Rat};
use crate::pool::{Arfcn, Pci, PciRange};

/// Live radio state of one cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metric {
    /// PCI currently in use.
    pub pci: Pci,
    /// Carrier frequency. Cells only conflict when this is equal.
    pub arfcn: Arfcn,
}

/// NR neighbour relation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NrNeighbor {
    pub cgi: NrCgi,
    pub pci: Pci,
    pub arfcn: Arfcn,
}

/// EUTRA neighbour relation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EutraNeighbor {
    pub cgi: EutraCgi,
    pub pci: Pci,
    pub arfcn: Arfcn,
}

/// Technology-specific payload of a neighbour relation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NeighborRanType {
    Nr(NrNeighbor),
    Eutra(EutraNeighbor),
}

/// A neighbour relation carried inside a cell's entry.
///
/// `ran_type` is `None` when the reporting node sent a relation with no
/// recognised technology choice; consumers skip such relations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NeighborCell {
    #[serde(default)]
    pub ran_type: Option<NeighborRanType>,
}

/// Technology-neutral view of a neighbour relation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NeighborView {
    pub identity: CellIdentity,
    pub pci: Pci,
    pub arfcn: Arfcn,
}

impl NeighborCell {
    /// Relation to `identity`, encoded in the identity's own technology.
    pub fn new(identity: CellIdentity, pci: Pci, arfcn: Arfcn) -> Self {
        let ran_type = match identity {
            CellIdentity::Nr(cgi) => NeighborRanType::Nr(NrNeighbor { cgi, pci, arfcn }),
            CellIdentity::Eutra(cgi) => {
                NeighborRanType::Eutra(EutraNeighbor { cgi, pci, arfcn })
            }
        };
        Self {
            ran_type: Some(ran_type),
        }
    }

    /// A relation with no technology choice set.
    pub fn unspecified() -> Self {
        Self { ran_type: None }
    }

    pub fn rat(&self) -> Option<Rat> {
        match self.ran_type {
            Some(NeighborRanType::Nr(_)) => Some(Rat::Nr),
            Some(NeighborRanType::Eutra(_)) => Some(Rat::Eutra),
            None => None,
        }
    }

    /// Identity, PCI and carrier of the neighbour, or `None` when the
    /// technology choice is missing.
    pub fn view(&self) -> Option<NeighborView> {
        match &self.ran_type {
            Some(NeighborRanType::Nr(n)) => Some(NeighborView {
                identity: CellIdentity::Nr(n.cgi.clone()),
                pci: n.pci,
                arfcn: n.arfcn,
            }),
            Some(NeighborRanType::Eutra(n)) => Some(NeighborView {
                identity: CellIdentity::Eutra(n.cgi.clone()),
                pci: n.pci,
                arfcn: n.arfcn,
            }),
            None => None,
        }
    }
}

/// One cell's record in the metric store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellEntry {
    /// Store key.
    pub identity: CellIdentity,
    pub metric: Metric,
    /// PCI ranges this cell is permitted to use.
    #[serde(default)]
    pub pci_pool: Vec<PciRange>,
    #[serde(default)]
    pub neighbors: Vec<NeighborCell>,
}

impl CellEntry {
    pub fn new(identity: CellIdentity, pci: Pci, arfcn: Arfcn) -> Self {
        Self {
            identity,
            metric: Metric { pci, arfcn },
            pci_pool: Vec::new(),
            neighbors: Vec::new(),
        }
    }

    /// Append a permitted PCI range.
    pub fn with_pool(mut self, range: PciRange) -> Self {
        self.pci_pool.push(range);
        self
    }

    /// Append a neighbour relation.
    pub fn with_neighbor(mut self, neighbor: NeighborCell) -> Self {
        self.neighbors.push(neighbor);
        self
    }

    /// Neighbour relation pointing at this cell, carrying its current metric.
    pub fn as_neighbor(&self) -> NeighborCell {
        NeighborCell::new(self.identity.clone(), self.metric.pci, self.metric.arfcn)
    }
}
