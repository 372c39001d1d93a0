// SPDX-License-Identifier: PMPL-1.0-or-later
//! Controller configuration.

use serde::{Deserialize, Serialize};

/// Neighbour search radius: 1 = direct neighbours only, 2 = neighbours and
/// their neighbours.
pub const DEFAULT_SEARCH_DEPTH: usize = 2;

/// How a replacement PCI is picked among the free candidates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionPolicy {
    /// Lowest free PCI value. Deterministic regardless of pool layout.
    #[default]
    Lowest,
    /// First free PCI in pool-list order (ranges as listed, each ascending).
    FirstFound,
}

/// Configuration for the PCI controller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// Maximum neighbour depth inspected around the subject cell
    pub search_depth: usize,
    /// Replacement PCI selection policy
    pub selection: SelectionPolicy,
    /// Publish resolved cell state to the topology, when one is attached
    pub publish_topology: bool,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            search_depth: DEFAULT_SEARCH_DEPTH,
            selection: SelectionPolicy::Lowest,
            publish_topology: true,
        }
    }
}
