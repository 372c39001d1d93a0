// SPDX-License-Identifier: PMPL-1.0-or-later
//! Property-based tests for identity decoding and PCI ranges

use proptest::prelude::*;
use pci_types::{BitString, CellIdentity, PciRange, Rat, EUTRA_CELL_ID_BITS, NR_CELL_ID_BITS};

proptest! {
    #[test]
    fn test_nr_identity_decodes_to_masked_ids(plmn in 0u32..(1 << 24), nci in any::<u64>()) {
        let canonical = CellIdentity::nr(plmn, nci).canonical().unwrap();
        prop_assert_eq!(canonical.plmn_id, plmn);
        prop_assert_eq!(canonical.cell_id, nci & ((1u64 << NR_CELL_ID_BITS) - 1));
        prop_assert_eq!(canonical.rat, Rat::Nr);
    }

    #[test]
    fn test_nr_and_eutra_never_share_canonical_form(plmn in 0u32..(1 << 24), id in 0u64..(1 << EUTRA_CELL_ID_BITS)) {
        let nr = CellIdentity::nr(plmn, id).canonical().unwrap();
        let eutra = CellIdentity::eutra(plmn, id).canonical().unwrap();
        prop_assert_eq!(nr.cell_id, eutra.cell_id);
        prop_assert_ne!(nr, eutra);
    }

    #[test]
    fn test_nonzero_padding_is_rejected(value in 1u64..(1 << EUTRA_CELL_ID_BITS), pad in 1u8..16) {
        // 28 bits in 4 octets leave the low nibble of the last octet unused.
        let mut bits = BitString::from_u64(value, EUTRA_CELL_ID_BITS);
        let last = bits.value.len() - 1;
        bits.value[last] |= pad;
        prop_assert!(bits.to_u64().is_err());
    }

    #[test]
    fn test_range_len_matches_values(lower in 0u32..1008, span in 0u32..64) {
        let range = PciRange::new(lower, lower + span);
        prop_assert!(range.validate().is_ok());
        prop_assert_eq!(range.len(), range.values().count());
        prop_assert!(range.contains(lower) && range.contains(lower + span));
        prop_assert!(!range.contains(lower + span + 1));
    }
}
