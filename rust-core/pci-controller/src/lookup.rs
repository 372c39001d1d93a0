// SPDX-License-Identifier: PMPL-1.0-or-later
//! Store entry lookup by decoded cell identity.
//!
//! The metric store is keyed structurally, so a neighbour reference cannot be
//! used as a key. Resolving one to its live entry scans a fresh snapshot of
//! the store and stops at the first entry whose identity decodes equal.

use futures::StreamExt;

use pci_store::{MetricStore, StoreError};
use pci_types::{CellEntry, CellIdentity};

use crate::identity::cgi_equal;

/// Find the live entry for `target`.
///
/// Returns `Ok(None)` when the snapshot holds no matching entry.
pub async fn find_entry(
    store: &dyn MetricStore,
    target: &CellIdentity,
) -> Result<Option<CellEntry>, StoreError> {
    let mut entries = store.entries().await?;
    while let Some(entry) = entries.next().await {
        if cgi_equal(target, &entry.identity) {
            return Ok(Some(entry));
        }
    }
    Ok(None)
}
