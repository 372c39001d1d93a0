// SPDX-License-Identifier: PMPL-1.0-or-later
//! PCI Controller
//!
//! Reactive Physical Cell Identifier conflict repair. Whenever a cell's
//! metric entry is created or updated, the controller checks whether any
//! same-carrier cell within two neighbour hops uses the same PCI and, if so,
//! writes a free replacement from the cell's pool back to the store.
//!
//! ## Pipeline
//!
//! 1. [`occupancy`] builds the candidate map from the cell's PCI pool.
//! 2. [`traversal`] walks the neighbour graph, resolving neighbours to live
//!    store entries through [`lookup`] and marking occupied PCIs.
//! 3. [`selection`] keeps the current PCI or picks a free one.
//! 4. [`controller`] drives the above per store event and writes back.
//!
//! Cell references are correlated with [`identity::cgi_equal`], which compares
//! decoded identities and never matches across technologies.

pub mod config;
pub mod controller;
pub mod error;
pub mod identity;
pub mod lookup;
pub mod metrics;
pub mod occupancy;
pub mod selection;
pub mod traversal;

pub use config::{ControllerConfig, SelectionPolicy, DEFAULT_SEARCH_DEPTH};
pub use controller::{ControllerStatus, PciController, ResolutionReport};
pub use error::ControllerError;
pub use identity::cgi_equal;
pub use lookup::find_entry;
pub use metrics::ControllerMetrics;
pub use occupancy::OccupancyMap;
pub use selection::{PciResolver, Resolution};
pub use traversal::{NeighborTraversal, TraversalStats};
