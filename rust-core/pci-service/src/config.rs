// SPDX-License-Identifier: PMPL-1.0-or-later
//! Service configuration.
//!
//! Read from an optional JSON file; missing fields take their defaults and
//! command-line flags override whatever the file says.

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use pci_controller::ControllerConfig;
use pci_store::DEFAULT_EVENT_CAPACITY;
use pci_types::CellEntry;

/// Configuration for the resolver service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Filter used when `RUST_LOG` is unset
    pub log_level: String,
    /// Emit JSON log lines instead of the human-readable format
    pub json_logs: bool,
    /// Events buffered per store watcher before a slow watcher lags
    pub event_buffer: usize,
    pub controller: ControllerConfig,
    /// JSON array of cell entries loaded into the store at startup
    pub seed_path: Option<PathBuf>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
            event_buffer: DEFAULT_EVENT_CAPACITY,
            controller: ControllerConfig::default(),
            seed_path: None,
        }
    }
}

impl ServiceConfig {
    /// Load from `path`, or defaults when no path is given.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        serde_json::from_str(&raw).with_context(|| format!("parsing config {}", path.display()))
    }
}

/// Read the seed file's cell entries.
pub fn load_seed(path: &Path) -> anyhow::Result<Vec<CellEntry>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading seed file {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing seed file {}", path.display()))
}
