// SPDX-License-Identifier: PMPL-1.0-or-later
//! PCI occupancy map.
//!
//! Built fresh for each resolution from the subject cell's PCI pool. The key
//! domain is exactly the union of the pool's ranges; every key starts free and
//! is marked occupied when a same-carrier cell in the search radius uses it.
//!
//! Cells in the radius may use PCIs outside the subject's pool. Those are
//! remembered separately: they still count when checking whether the
//! subject's current PCI collides, but they are never selection candidates.

use std::collections::{BTreeMap, BTreeSet};

use pci_types::{Pci, PciRange};

use crate::config::SelectionPolicy;
use crate::error::ControllerError;

/// Candidate PCI -> occupied flag, scoped to one resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OccupancyMap {
    slots: BTreeMap<Pci, bool>,
    /// Domain in pool-list order, without duplicates.
    pool_order: Vec<Pci>,
    foreign: BTreeSet<Pci>,
}

impl OccupancyMap {
    /// Build an all-free map over the union of `pools`.
    ///
    /// Overlapping ranges are fine. Any range with `lower > upper` fails the
    /// whole build and no map is produced.
    pub fn build(pools: &[PciRange]) -> Result<Self, ControllerError> {
        for range in pools {
            range.validate()?;
        }

        let mut map = Self::default();
        for range in pools {
            for pci in range.values() {
                if map.slots.insert(pci, false).is_none() {
                    map.pool_order.push(pci);
                }
            }
        }
        Ok(map)
    }

    /// Mark `pci` as in use by another cell.
    ///
    /// Returns `true` if `pci` belongs to the candidate domain.
    pub fn mark_occupied(&mut self, pci: Pci) -> bool {
        match self.slots.get_mut(&pci) {
            Some(occupied) => {
                *occupied = true;
                true
            }
            None => {
                self.foreign.insert(pci);
                false
            }
        }
    }

    /// Whether any cell in the radius uses `pci`, inside the domain or not.
    pub fn is_occupied(&self, pci: Pci) -> bool {
        self.slots.get(&pci).copied().unwrap_or(false) || self.foreign.contains(&pci)
    }

    /// Whether `pci` is a candidate value.
    pub fn contains(&self, pci: Pci) -> bool {
        self.slots.contains_key(&pci)
    }

    /// Size of the candidate domain.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Candidate values, ascending.
    pub fn candidates(&self) -> impl Iterator<Item = Pci> + '_ {
        self.slots.keys().copied()
    }

    /// Free candidate values, ascending.
    pub fn free(&self) -> impl Iterator<Item = Pci> + '_ {
        self.slots
            .iter()
            .filter(|(_, occupied)| !**occupied)
            .map(|(pci, _)| *pci)
    }

    /// Occupied candidate values, ascending.
    pub fn occupied(&self) -> impl Iterator<Item = Pci> + '_ {
        self.slots
            .iter()
            .filter(|(_, occupied)| **occupied)
            .map(|(pci, _)| *pci)
    }

    /// Pick a free candidate according to `policy`.
    pub fn select(&self, policy: SelectionPolicy) -> Option<Pci> {
        match policy {
            SelectionPolicy::Lowest => self.free().next(),
            SelectionPolicy::FirstFound => self
                .pool_order
                .iter()
                .copied()
                .find(|pci| self.slots.get(pci) == Some(&false)),
        }
    }
}
