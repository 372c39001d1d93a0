// SPDX-License-Identifier: PMPL-1.0-or-later
//
// Error types for cell identity decoding and PCI pool validation.

use thiserror::Error;

use crate::identity::Rat;

/// Failure to decode a cell global identity into its canonical form.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// A PLMN identity must be exactly three octets.
    #[error("PLMN identity must be 3 octets, got {0}")]
    PlmnLength(usize),

    /// The cell identity bit string has the wrong bit length for its RAT.
    #[error("{rat} cell identity must be {expected} bits, got {actual}")]
    CellIdWidth {
        /// Technology of the identity being decoded.
        rat: Rat,
        /// Bit length mandated by the technology.
        expected: u32,
        /// Bit length carried by the bit string.
        actual: u32,
    },

    /// The octet count does not match the declared bit length.
    #[error("bit string of {bits} bits needs {expected} octets, got {actual}")]
    OctetCount {
        /// Declared bit length.
        bits: u32,
        /// Octets required to hold `bits`.
        expected: usize,
        /// Octets actually present.
        actual: usize,
    },

    /// Padding bits past the declared length must be zero.
    #[error("bit string has {0} unused trailing bits that are not zero")]
    UnusedBitsSet(u32),
}

/// A PCI range whose lower bound exceeds its upper bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invalid PCI range: lower {lower} is greater than upper {upper}")]
pub struct RangeError {
    /// Offending lower bound.
    pub lower: u32,
    /// Offending upper bound.
    pub upper: u32,
}
