//! Core domain library for navgrid (models, storage adapter, config).

/// Configuration loading and defaults.
pub mod config;
/// Shared constants used across navgrid crates.
pub mod constants;
/// Application error types for storage and domain logic.
pub mod error;
/// Navigation document, link, and settings models.
pub mod models;
/// Key-value store adapter with retry and graceful degradation.
pub mod store;

pub use config::Config;
pub use constants::{DEFAULT_CLI_SERVER_URL, DEFAULT_PORT, NAVIGATION_KEY};
pub use error::StoreError;
pub use models::{BackgroundType, Link, NavigationDocument, NewLinkRequest, Settings};
pub use store::{KvBackend, NavStore, RedbBackend};
