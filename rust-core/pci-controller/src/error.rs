// SPDX-License-Identifier: PMPL-1.0-or-later
//! Controller error types.

use thiserror::Error;

use pci_store::StoreError;
use pci_topo::TopoError;
use pci_types::{Pci, RangeError};

/// Errors raised while resolving or writing back a PCI.
///
/// Identity decode failures are not represented here: they are absorbed by
/// the identity comparison and treated as "not the same cell".
#[derive(Error, Debug)]
pub enum ControllerError {
    #[error("Invalid PCI pool: {0}")]
    InvalidRange(#[from] RangeError),

    #[error("All PCIs in the pool of {cell} are occupied within the search radius (current PCI {pci})")]
    PoolExhausted { cell: String, pci: Pci },

    #[error("Metric store error: {0}")]
    Store(#[from] StoreError),

    #[error("Topology error: {0}")]
    Topology(#[from] TopoError),

    #[error("Metrics registration failed: {0}")]
    Metrics(String),
}
