// SPDX-License-Identifier: PMPL-1.0-or-later
//
// Metric store error types.

use thiserror::Error;

/// Errors that can occur when interacting with a metric store.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// No entry exists under the requested cell identity.
    #[error("no entry for cell {0}")]
    NotFound(String),

    /// The store cannot serve the request (e.g., connection lost).
    #[error("metric store unavailable: {0}")]
    Unavailable(String),

    /// The store's event feed has been shut down.
    #[error("metric store event feed is closed")]
    Closed,
}
