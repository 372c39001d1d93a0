// SPDX-License-Identifier: PMPL-1.0-or-later
// Fuzz target for cell identity decoding

#![no_main]

use libfuzzer_sys::fuzz_target;
use pci_types::{BitString, CellIdentity, EutraCgi, NrCgi, PlmnIdentity};

fuzz_target!(|data: &[u8]| {
    if data.len() < 2 {
        return;
    }

    // First byte picks the declared bit length, second splits PLMN from cell id.
    let len = u32::from(data[0]);
    let split = usize::from(data[1]).min(data.len() - 2);
    let (plmn, cell) = data[2..].split_at(split);

    let bits = BitString {
        value: cell.to_vec(),
        len,
    };
    if let Ok(value) = bits.to_u64() {
        // Whatever decodes must re-encode to the same octets.
        assert_eq!(BitString::from_u64(value, len), bits);
    }

    let plmn = PlmnIdentity::new(plmn);
    let nr = CellIdentity::Nr(NrCgi {
        plmn: plmn.clone(),
        nr_cell_id: bits.clone(),
    });
    let eutra = CellIdentity::Eutra(EutraCgi {
        plmn,
        eutra_cell_id: bits,
    });

    // Decoding and display must never panic on malformed input.
    let _ = nr.canonical();
    let _ = eutra.canonical();
    let _ = nr.to_string();
    let _ = eutra.to_string();
});
