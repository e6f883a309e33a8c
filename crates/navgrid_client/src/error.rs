//! Client error types.

use thiserror::Error;

/// Errors surfaced by the sync client.
///
/// Remote-sync failures are expected operating conditions; the sync engine
/// catches them at the call site and degrades to local-only operation
/// rather than propagating them to the caller.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("server rejected request: {0}")]
    Rejected(String),

    #[error("cache I/O error: {0}")]
    Cache(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Domain(#[from] navgrid_core::StoreError),
}
