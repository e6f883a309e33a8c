//! Key-value store adapter with retry, backoff, and graceful degradation.
//!
//! The backing store is an edge-style key-value service with no transactions
//! and no schema. The adapter's entire value-add is degradation: the rest of
//! the system always has something to render, even when storage is
//! unreachable or not configured at all.

mod backend;


pub use backend::{KvBackend, RedbBackend};

use crate::error::StoreError;
use crate::models::NavigationDocument;
use std::sync::Arc;
use std::time::Duration;

/// Backoff parameters for transient-failure retries.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub base_delay: Duration,
    pub max_retries: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            base_delay: Duration::from_millis(100),
            max_retries: 2,
        }
    }
}

/// Typed document store over a [`KvBackend`].
///
/// `get` never errors: any failure path lands on the default document.
/// `put` never errors either; it reports `false` so write failures stay
/// visible to callers (silent data loss is not acceptable on writes).
pub struct NavStore {
    backend: Option<Arc<dyn KvBackend>>,
    retry: RetryPolicy,
}

impl NavStore {
    /// Open a redb-backed store under `dir`.
    ///
    /// # Errors
    /// Returns an error when the backend cannot be opened.
    pub fn open(dir: &str) -> Result<Self, StoreError> {
        Ok(Self::with_backend(Arc::new(RedbBackend::open(dir)?)))
    }

    /// A store with no backend: reads serve defaults, writes fail.
    ///
    /// This mirrors a deployment whose KV binding is absent.
    pub fn detached() -> Self {
        Self {
            backend: None,
            retry: RetryPolicy::default(),
        }
    }

    /// Wrap an existing backend.
    pub fn with_backend(backend: Arc<dyn KvBackend>) -> Self {
        Self {
            backend: Some(backend),
            retry: RetryPolicy::default(),
        }
    }

    /// Replace the retry policy.
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Whether a backend is configured.
    pub fn is_attached(&self) -> bool {
        self.backend.is_some()
    }

    /// Run `op` with exponential backoff on transient failures.
    ///
    /// Only errors classified transient are retried; anything else
    /// short-circuits immediately.
    async fn with_retry_loop<T>(
        &self,
        mut op: impl FnMut(&dyn KvBackend) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let backend = self.backend.as_deref().ok_or(StoreError::Unavailable)?;
        let mut attempt: u32 = 0;
        loop {
            match op(backend) {
                Ok(value) => return Ok(value),
                Err(err) if err.is_transient() && attempt < self.retry.max_retries => {
                    let delay = self.retry.base_delay * 2u32.saturating_pow(attempt);
                    tracing::warn!(
                        attempt = attempt + 1,
                        delay_ms = delay.as_millis() as u64,
                        "transient storage failure, retrying: {err}"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// Typed read of the document stored under `key`.
    ///
    /// # Returns
    /// The stored document, or the default document when the backend is
    /// absent, the key is missing, the bytes are not valid JSON, or the
    /// read still fails after retries. Never errors.
    pub async fn get(&self, key: &str) -> NavigationDocument {
        match self.with_retry_loop(|backend| backend.get(key)).await {
            Ok(Some(bytes)) => match serde_json::from_slice(&bytes) {
                Ok(doc) => doc,
                Err(err) => {
                    tracing::warn!("stored document under '{key}' is unreadable: {err}");
                    NavigationDocument::default()
                }
            },
            Ok(None) => NavigationDocument::default(),
            Err(StoreError::Unavailable) => {
                tracing::warn!("KV backend is not configured; serving default document");
                NavigationDocument::default()
            }
            Err(err) => {
                tracing::warn!("failed to read '{key}': {err}; serving default document");
                NavigationDocument::default()
            }
        }
    }

    /// Typed write of the document under `key`.
    ///
    /// # Returns
    /// `true` on a confirmed write, `false` on any unrecoverable failure.
    /// Never errors.
    pub async fn put(&self, key: &str, document: &NavigationDocument) -> bool {
        let bytes = match serde_json::to_vec(document) {
            Ok(bytes) => bytes,
            Err(err) => {
                tracing::error!("failed to encode document for '{key}': {err}");
                return false;
            }
        };
        match self
            .with_retry_loop(|backend| backend.put(key, &bytes))
            .await
        {
            Ok(()) => true,
            Err(err) => {
                tracing::error!("failed to write '{key}': {err}");
                false
            }
        }
    }

    /// Storage connectivity probe for health reporting.
    pub async fn probe(&self) -> bool {
        self.with_retry_loop(|backend| backend.probe())
            .await
            .is_ok()
    }
}
