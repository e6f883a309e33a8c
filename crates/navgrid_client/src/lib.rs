//! Sync client for the navgrid API: local-first cache plus best-effort
//! remote synchronization.

/// HTTP client for the navgrid API.
pub mod api;
/// On-disk cache mirroring the browser's local-storage keys.
pub mod cache;
/// Client error types.
pub mod error;
/// Local-first sync engine.
pub mod sync;

pub use api::ApiClient;
pub use cache::LocalCache;
pub use error::ClientError;
pub use sync::{SyncEngine, SyncOutcome};
