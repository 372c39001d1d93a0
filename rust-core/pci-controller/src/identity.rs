// SPDX-License-Identifier: PMPL-1.0-or-later
//! Cell identity comparison.
//!
//! Neighbour relations and store keys carry their own copies of a cell's
//! global identity, so the same cell is matched by decoded value, never by
//! reference or raw octets.

use tracing::warn;

use pci_types::CellIdentity;

/// Whether `a` and `b` name the same physical cell.
///
/// Identities of different technologies are never equal. A side that fails to
/// decode is logged and compared as unequal.
pub fn cgi_equal(a: &CellIdentity, b: &CellIdentity) -> bool {
    if a.rat() != b.rat() {
        return false;
    }

    let lhs = match a.canonical() {
        Ok(cgi) => cgi,
        Err(err) => {
            warn!(error = %err, "Could not decode source CGI");
            return false;
        }
    };
    let rhs = match b.canonical() {
        Ok(cgi) => cgi,
        Err(err) => {
            warn!(error = %err, "Could not decode target CGI");
            return false;
        }
    };

    lhs == rhs
}

#[cfg(test)]
mod tests {
    use super::*;
    use pci_types::{BitString, EutraCgi, NrCgi, PlmnIdentity, NR_CELL_ID_BITS};

    #[test]
    fn test_reflexive() {
        let nr = CellIdentity::nr(0x138426, 0xfeed);
        let lte = CellIdentity::eutra(0x138426, 0xfeed);
        assert!(cgi_equal(&nr, &nr));
        assert!(cgi_equal(&lte, &lte));
    }

    #[test]
    fn test_distinct_cells() {
        assert!(!cgi_equal(&CellIdentity::nr(1, 1), &CellIdentity::nr(1, 2)));
        assert!(!cgi_equal(&CellIdentity::nr(1, 1), &CellIdentity::nr(2, 1)));
    }

    #[test]
    fn test_never_equal_across_rats() {
        let nr = CellIdentity::nr(7, 7);
        let lte = CellIdentity::eutra(7, 7);
        assert!(!cgi_equal(&nr, &lte));
        assert!(!cgi_equal(&lte, &nr));
    }

    #[test]
    fn test_separately_built_copies_are_equal() {
        let a = CellIdentity::Eutra(EutraCgi::new(0x00f110, 0x1234));
        let b = CellIdentity::Eutra(EutraCgi {
            plmn: PlmnIdentity::new(vec![0x10, 0xf1, 0x00]),
            eutra_cell_id: BitString {
                value: vec![0x00, 0x01, 0x23, 0x40],
                len: 28,
            },
        });
        assert!(cgi_equal(&a, &b));
    }

    #[test]
    fn test_undecodable_is_not_equal_even_to_itself() {
        let bad = CellIdentity::Nr(NrCgi {
            plmn: PlmnIdentity::new(vec![0x01, 0x02]),
            nr_cell_id: BitString::from_u64(1, NR_CELL_ID_BITS),
        });
        assert!(!cgi_equal(&bad, &bad));
        assert!(!cgi_equal(&bad, &CellIdentity::nr(0x0201, 1)));
    }
}
