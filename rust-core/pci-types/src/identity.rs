// SPDX-License-Identifier: PMPL-1.0-or-later
//
// Cell global identities for NR and EUTRA cells.
//
// A cell global identity (CGI) pairs a PLMN identity with a technology
// specific cell identity bit string. Two encodings exist: NR carries a 36-bit
// NR cell identity, EUTRA a 28-bit EUTRA cell identity. Both are left-aligned
// in their octets with zero padding at the tail, as they arrive off the wire.
//
// Equality between identities is decided on the decoded canonical form
// (`CanonicalCgi`), never on the raw octets, so callers that need to correlate
// cell references use [`CellIdentity::canonical`].

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::DecodeError;

/// Bit length of an NR cell identity.
pub const NR_CELL_ID_BITS: u32 = 36;

/// Bit length of an EUTRA cell identity.
pub const EUTRA_CELL_ID_BITS: u32 = 28;

/// Radio access technology of a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rat {
    /// 5G New Radio.
    Nr,
    /// 4G LTE (Evolved UTRA).
    Eutra,
}

impl Rat {
    /// Bit length of this technology's cell identity.
    pub fn cell_id_bits(self) -> u32 {
        match self {
            Rat::Nr => NR_CELL_ID_BITS,
            Rat::Eutra => EUTRA_CELL_ID_BITS,
        }
    }
}

impl fmt::Display for Rat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rat::Nr => write!(f, "nr"),
            Rat::Eutra => write!(f, "eutra"),
        }
    }
}

/// Encoded PLMN identity octets.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlmnIdentity(pub Vec<u8>);

impl PlmnIdentity {
    /// Wrap raw PLMN octets without validation.
    pub fn new(octets: impl Into<Vec<u8>>) -> Self {
        Self(octets.into())
    }

    /// Encode a numeric network id into its three octets.
    pub fn from_u32(plmn_id: u32) -> Self {
        Self(vec![
            (plmn_id & 0xff) as u8,
            ((plmn_id >> 8) & 0xff) as u8,
            ((plmn_id >> 16) & 0xff) as u8,
        ])
    }

    /// Decode into the numeric network id.
    ///
    /// Octets are packed least significant first.
    pub fn to_u32(&self) -> Result<u32, DecodeError> {
        match self.0.as_slice() {
            [b0, b1, b2] => Ok(u32::from(*b0) | u32::from(*b1) << 8 | u32::from(*b2) << 16),
            other => Err(DecodeError::PlmnLength(other.len())),
        }
    }
}

/// A left-aligned bit string, as used for cell identities.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BitString {
    /// Octets holding the bits, most significant first.
    pub value: Vec<u8>,
    /// Number of meaningful bits in `value`.
    pub len: u32,
}

impl BitString {
    /// Encode the low `len` bits of `value`. Bits above `len` are discarded.
    pub fn from_u64(value: u64, len: u32) -> Self {
        let len = len.min(64);
        let octets = octets_for(len);
        let unused = (octets * 8) as u32 - len;
        let shifted = (value & low_mask(len)) << unused;
        let bytes = shifted.to_be_bytes();
        Self {
            value: bytes[8 - octets..].to_vec(),
            len,
        }
    }

    /// Decode the bit string into an integer.
    pub fn to_u64(&self) -> Result<u64, DecodeError> {
        let expected = octets_for(self.len);
        if self.value.len() != expected || expected > 8 {
            return Err(DecodeError::OctetCount {
                bits: self.len,
                expected,
                actual: self.value.len(),
            });
        }

        let raw = self
            .value
            .iter()
            .fold(0u64, |acc, b| (acc << 8) | u64::from(*b));
        let unused = (expected * 8) as u32 - self.len;
        if raw & low_mask(unused) != 0 {
            return Err(DecodeError::UnusedBitsSet(unused));
        }
        Ok(raw >> unused)
    }
}

fn octets_for(bits: u32) -> usize {
    bits.div_ceil(8) as usize
}

fn low_mask(bits: u32) -> u64 {
    if bits >= 64 {
        u64::MAX
    } else {
        (1u64 << bits) - 1
    }
}

/// NR cell global identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NrCgi {
    pub plmn: PlmnIdentity,
    pub nr_cell_id: BitString,
}

impl NrCgi {
    pub fn new(plmn_id: u32, nci: u64) -> Self {
        Self {
            plmn: PlmnIdentity::from_u32(plmn_id),
            nr_cell_id: BitString::from_u64(nci, NR_CELL_ID_BITS),
        }
    }
}

/// EUTRA cell global identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EutraCgi {
    pub plmn: PlmnIdentity,
    pub eutra_cell_id: BitString,
}

impl EutraCgi {
    pub fn new(plmn_id: u32, eci: u64) -> Self {
        Self {
            plmn: PlmnIdentity::from_u32(plmn_id),
            eutra_cell_id: BitString::from_u64(eci, EUTRA_CELL_ID_BITS),
        }
    }
}

/// Decoded, comparable form of a cell global identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CanonicalCgi {
    /// Numeric PLMN id.
    pub plmn_id: u32,
    /// Numeric cell id, width depending on `rat`.
    pub cell_id: u64,
    /// Technology the identity belongs to.
    pub rat: Rat,
}

/// A cell global identity in either technology encoding.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CellIdentity {
    Nr(NrCgi),
    Eutra(EutraCgi),
}

impl CellIdentity {
    /// Build an NR identity from numeric PLMN and NR cell ids.
    pub fn nr(plmn_id: u32, nci: u64) -> Self {
        CellIdentity::Nr(NrCgi::new(plmn_id, nci))
    }

    /// Build an EUTRA identity from numeric PLMN and EUTRA cell ids.
    pub fn eutra(plmn_id: u32, eci: u64) -> Self {
        CellIdentity::Eutra(EutraCgi::new(plmn_id, eci))
    }

    pub fn rat(&self) -> Rat {
        match self {
            CellIdentity::Nr(_) => Rat::Nr,
            CellIdentity::Eutra(_) => Rat::Eutra,
        }
    }

    /// Decode into `(plmn id, cell id, rat)`.
    ///
    /// Fails when the PLMN is not three octets or when the cell identity bit
    /// string does not have the exact width of its technology.
    pub fn canonical(&self) -> Result<CanonicalCgi, DecodeError> {
        let (plmn, cell_id, rat) = match self {
            CellIdentity::Nr(cgi) => (&cgi.plmn, &cgi.nr_cell_id, Rat::Nr),
            CellIdentity::Eutra(cgi) => (&cgi.plmn, &cgi.eutra_cell_id, Rat::Eutra),
        };

        if cell_id.len != rat.cell_id_bits() {
            return Err(DecodeError::CellIdWidth {
                rat,
                expected: rat.cell_id_bits(),
                actual: cell_id.len,
            });
        }

        Ok(CanonicalCgi {
            plmn_id: plmn.to_u32()?,
            cell_id: cell_id.to_u64()?,
            rat,
        })
    }
}

impl fmt::Display for CellIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.canonical() {
            Ok(c) => write!(f, "{}:{:06x}:{:x}", c.rat, c.plmn_id, c.cell_id),
            Err(_) => write!(f, "{}:<undecodable>", self.rat()),
        }
    }
}
