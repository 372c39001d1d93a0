// SPDX-License-Identifier: PMPL-1.0-or-later
//! Bounded-depth neighbour traversal.
//!
//! Starting at the subject (root) cell, walks the neighbour graph depth-first
//! in neighbour-list order and marks every PCI used by a same-carrier cell
//! within `max_depth` hops. Depth 1 is the root's own neighbour list.
//!
//! Each neighbour is resolved to its live store entry when possible, since the
//! live PCI supersedes the neighbour snapshot (the controller itself may have
//! changed it since the snapshot was taken). Unresolved neighbours contribute
//! their snapshot PCI and end that branch. There is no cycle detection beyond
//! skipping the root; revisits are bounded by the depth limit.

use futures::future::{BoxFuture, FutureExt};
use tracing::{debug, warn};

use pci_store::MetricStore;
use pci_types::{CellEntry, Pci};

use crate::identity::cgi_equal;
use crate::lookup::find_entry;
use crate::occupancy::OccupancyMap;

/// Counters collected during one traversal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TraversalStats {
    /// Neighbour relations inspected, root self-references included.
    pub visited: usize,
    /// Neighbours resolved to a live store entry.
    pub resolved: usize,
    /// Neighbours judged from their snapshot only.
    pub unresolved: usize,
    /// Relations without a recognised technology.
    pub skipped: usize,
    /// Store lookups that failed and fell back to the snapshot.
    pub lookup_failures: usize,
    /// PCIs marked occupied (inside or outside the pool).
    pub marked: usize,
}

/// Depth-bounded walk over the neighbour graph.
pub struct NeighborTraversal<'a> {
    store: &'a dyn MetricStore,
    max_depth: usize,
}

impl<'a> NeighborTraversal<'a> {
    pub fn new(store: &'a dyn MetricStore, max_depth: usize) -> Self {
        Self { store, max_depth }
    }

    /// Mark in `occupancy` every PCI in use around `root`.
    pub async fn run(&self, root: &CellEntry, occupancy: &mut OccupancyMap) -> TraversalStats {
        let mut stats = TraversalStats::default();
        self.visit(root, root, 1, occupancy, &mut stats).await;
        stats
    }

    fn visit<'b>(
        &'b self,
        root: &'b CellEntry,
        current: &'b CellEntry,
        depth: usize,
        occupancy: &'b mut OccupancyMap,
        stats: &'b mut TraversalStats,
    ) -> BoxFuture<'b, ()> {
        async move {
            if depth > self.max_depth {
                return;
            }

            let root_arfcn = root.metric.arfcn;

            for neighbor in &current.neighbors {
                let Some(view) = neighbor.view() else {
                    warn!(cell = %current.identity, "Neighbour type should be NR or EUTRA, skipping");
                    stats.skipped += 1;
                    continue;
                };
                stats.visited += 1;

                // Looped back to the subject cell.
                if cgi_equal(&root.identity, &view.identity) {
                    continue;
                }

                let live = match find_entry(self.store, &view.identity).await {
                    Ok(found) => found,
                    Err(err) => {
                        warn!(
                            neighbor = %view.identity,
                            error = %err,
                            "Neighbour lookup failed, using reported PCI"
                        );
                        stats.lookup_failures += 1;
                        None
                    }
                };

                match live {
                    Some(live) => {
                        stats.resolved += 1;
                        if live.metric.arfcn == root_arfcn {
                            mark(occupancy, stats, live.metric.pci, depth);
                        }
                        self.visit(root, &live, depth + 1, occupancy, stats).await;
                    }
                    None => {
                        stats.unresolved += 1;
                        if view.arfcn == root_arfcn {
                            mark(occupancy, stats, view.pci, depth);
                        }
                    }
                }
            }
        }
        .boxed()
    }
}

fn mark(occupancy: &mut OccupancyMap, stats: &mut TraversalStats, pci: Pci, depth: usize) {
    let in_pool = occupancy.mark_occupied(pci);
    stats.marked += 1;
    debug!(pci, depth, in_pool, "PCI occupied");
}

#[cfg(test)]
mod tests {
    use super::*;
    use pci_store::InMemoryMetricStore;
    use pci_types::{CellIdentity, NeighborCell, PciRange};

    fn id(n: u64) -> CellIdentity {
        CellIdentity::nr(0x00f110, n)
    }

    fn pool() -> Vec<PciRange> {
        vec![PciRange::new(0, 20)]
    }

    #[tokio::test]
    async fn test_snapshot_used_when_neighbor_not_in_store() {
        let store = InMemoryMetricStore::new();
        let root = CellEntry::new(id(1), 5, 100)
            .with_neighbor(NeighborCell::new(id(2), 7, 100))
            .with_neighbor(NeighborCell::new(id(3), 8, 200));

        let mut occupancy = OccupancyMap::build(&pool()).unwrap();
        let stats = NeighborTraversal::new(&store, 2).run(&root, &mut occupancy).await;

        assert_eq!(occupancy.occupied().collect::<Vec<_>>(), vec![7]);
        assert_eq!(stats.unresolved, 2);
        assert_eq!(stats.resolved, 0);
    }

    #[tokio::test]
    async fn test_live_entry_supersedes_snapshot() {
        let store = InMemoryMetricStore::new();
        // Snapshot says PCI 7, but the neighbour has since moved to 9.
        store.put(CellEntry::new(id(2), 9, 100)).await.unwrap();

        let root = CellEntry::new(id(1), 5, 100).with_neighbor(NeighborCell::new(id(2), 7, 100));
        let mut occupancy = OccupancyMap::build(&pool()).unwrap();
        let stats = NeighborTraversal::new(&store, 2).run(&root, &mut occupancy).await;

        assert_eq!(occupancy.occupied().collect::<Vec<_>>(), vec![9]);
        assert_eq!(stats.resolved, 1);
    }

    #[tokio::test]
    async fn test_root_self_reference_is_skipped() {
        let store = InMemoryMetricStore::new();
        let root = CellEntry::new(id(1), 5, 100);
        let b = CellEntry::new(id(2), 6, 100).with_neighbor(root.as_neighbor());
        store.put(root.clone()).await.unwrap();
        store.put(b.clone()).await.unwrap();

        let root = root.with_neighbor(b.as_neighbor());
        let mut occupancy = OccupancyMap::build(&pool()).unwrap();
        NeighborTraversal::new(&store, 2).run(&root, &mut occupancy).await;

        assert!(!occupancy.is_occupied(5));
        assert!(occupancy.is_occupied(6));
    }

    #[tokio::test]
    async fn test_depth_limit() {
        let store = InMemoryMetricStore::new();
        // Chain 1 -> 2 -> 3 -> 4, all on the same carrier.
        let d = CellEntry::new(id(4), 14, 100);
        let c = CellEntry::new(id(3), 13, 100).with_neighbor(d.as_neighbor());
        let b = CellEntry::new(id(2), 12, 100).with_neighbor(c.as_neighbor());
        for entry in [&b, &c, &d] {
            store.put(entry.clone()).await.unwrap();
        }
        let root = CellEntry::new(id(1), 11, 100).with_neighbor(b.as_neighbor());

        let mut one_hop = OccupancyMap::build(&pool()).unwrap();
        NeighborTraversal::new(&store, 1).run(&root, &mut one_hop).await;
        assert_eq!(one_hop.occupied().collect::<Vec<_>>(), vec![12]);

        let mut two_hops = OccupancyMap::build(&pool()).unwrap();
        NeighborTraversal::new(&store, 2).run(&root, &mut two_hops).await;
        assert_eq!(two_hops.occupied().collect::<Vec<_>>(), vec![12, 13]);
    }

    #[tokio::test]
    async fn test_unspecified_neighbor_is_skipped() {
        let store = InMemoryMetricStore::new();
        let root = CellEntry::new(id(1), 5, 100)
            .with_neighbor(NeighborCell::unspecified())
            .with_neighbor(NeighborCell::new(id(2), 5, 100));

        let mut occupancy = OccupancyMap::build(&pool()).unwrap();
        let stats = NeighborTraversal::new(&store, 2).run(&root, &mut occupancy).await;

        assert_eq!(stats.skipped, 1);
        assert!(occupancy.is_occupied(5));
    }

    #[tokio::test]
    async fn test_other_carrier_still_traversed() {
        let store = InMemoryMetricStore::new();
        // B is on another carrier, but its neighbour C shares the root's.
        let c = CellEntry::new(id(3), 4, 100);
        let b = CellEntry::new(id(2), 3, 200).with_neighbor(c.as_neighbor());
        store.put(b.clone()).await.unwrap();
        store.put(c.clone()).await.unwrap();

        let root = CellEntry::new(id(1), 5, 100).with_neighbor(b.as_neighbor());
        let mut occupancy = OccupancyMap::build(&pool()).unwrap();
        NeighborTraversal::new(&store, 2).run(&root, &mut occupancy).await;

        assert_eq!(occupancy.occupied().collect::<Vec<_>>(), vec![4]);
    }
}
