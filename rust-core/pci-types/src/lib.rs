// SPDX-License-Identifier: PMPL-1.0-or-later
//! PCI Types
//!
//! Shared data model for PCI conflict resolution: cell global identities in
//! their NR and EUTRA encodings, PCI pools, and the per-cell metric records
//! kept by the metric store.
//!
//! # Modules
//!
//! - [`identity`] -- `CellIdentity` and its canonical decoding.
//! - [`pool`] -- `PciRange` and the `Pci` / `Arfcn` scalar types.
//! - [`cell`] -- `CellEntry`, `Metric` and neighbour relations.
//! - [`error`] -- decode and range errors.

pub mod cell;
pub mod error;
pub mod identity;
pub mod pool;

pub use cell::{CellEntry, EutraNeighbor, Metric, NeighborCell, NeighborRanType, NeighborView, NrNeighbor};
pub use error::{DecodeError, RangeError};
pub use identity::{
    BitString, CanonicalCgi, CellIdentity, EutraCgi, NrCgi, PlmnIdentity, Rat,
    EUTRA_CELL_ID_BITS, NR_CELL_ID_BITS,
};
pub use pool::{Arfcn, Pci, PciRange};
