//! Application error types for core storage and domain logic.
use thiserror::Error;

/// Storage-layer error with an explicit transient/permanent split.
///
/// The retry loop in [`crate::store::NavStore`] consults
/// [`StoreError::is_transient`] before deciding to retry; nothing is
/// retried on the strength of an exception type alone.
#[derive(Error, Debug)]
pub enum StoreError {
    /// No backend is configured (the KV binding is absent).
    #[error("storage backend is not configured")]
    Unavailable,

    /// Backend I/O or timeout-class failure. Retryable.
    #[error("storage backend error: {0}")]
    Backend(String),

    /// Stored bytes could not be interpreted. Not retryable.
    #[error("stored document is corrupted: {0}")]
    Corrupted(String),

    /// JSON encode/decode failure. Not retryable.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Link payload failed validation.
    #[error("invalid link: {0}")]
    InvalidLink(String),
}

impl StoreError {
    /// Whether the failure is worth retrying with backoff.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Backend(_))
    }
}

impl From<redb::Error> for StoreError {
    fn from(value: redb::Error) -> Self {
        Self::Backend(value.to_string())
    }
}

impl From<redb::DatabaseError> for StoreError {
    fn from(value: redb::DatabaseError) -> Self {
        Self::Backend(value.to_string())
    }
}

impl From<redb::TransactionError> for StoreError {
    fn from(value: redb::TransactionError) -> Self {
        Self::Backend(value.to_string())
    }
}

impl From<redb::TableError> for StoreError {
    fn from(value: redb::TableError) -> Self {
        Self::Backend(value.to_string())
    }
}

impl From<redb::StorageError> for StoreError {
    fn from(value: redb::StorageError) -> Self {
        Self::Backend(value.to_string())
    }
}

impl From<redb::CommitError> for StoreError {
    fn from(value: redb::CommitError) -> Self {
        Self::Backend(value.to_string())
    }
}
