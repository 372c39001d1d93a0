// SPDX-License-Identifier: PMPL-1.0-or-later
//
// PCI pools: the closed ranges of PCI values a cell is permitted to adopt.

use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::error::RangeError;

/// Physical Cell Identifier value.
pub type Pci = u32;

/// Absolute radio-frequency channel number. Opaque; only compared for equality.
pub type Arfcn = u32;

/// Closed interval `[lower, upper]` of permissible PCI values.
///
/// Producers may hand over ranges with `lower > upper`; such a range is an
/// input error surfaced by [`PciRange::validate`], never silently swapped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PciRange {
    pub lower: Pci,
    pub upper: Pci,
}

impl PciRange {
    pub fn new(lower: Pci, upper: Pci) -> Self {
        Self { lower, upper }
    }

    /// A range holding exactly one value.
    pub fn single(pci: Pci) -> Self {
        Self::new(pci, pci)
    }

    /// Check `lower <= upper`.
    pub fn validate(&self) -> Result<(), RangeError> {
        if self.lower > self.upper {
            return Err(RangeError {
                lower: self.lower,
                upper: self.upper,
            });
        }
        Ok(())
    }

    /// Every PCI in the range, ascending. Empty for an invalid range.
    pub fn values(&self) -> RangeInclusive<Pci> {
        self.lower..=self.upper
    }

    pub fn contains(&self, pci: Pci) -> bool {
        self.values().contains(&pci)
    }

    /// Number of values in the range; zero for an invalid range.
    pub fn len(&self) -> usize {
        if self.lower > self.upper {
            0
        } else {
            (self.upper - self.lower) as usize + 1
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
