//! Shared constants used across navgrid crates.

/// Default API port.
pub const DEFAULT_PORT: u16 = 8788;

/// Store key under which the navigation document lives.
pub const NAVIGATION_KEY: &str = "navigation";

/// Default maximum request body size accepted by the API layer.
pub const DEFAULT_MAX_BODY_SIZE: usize = 1024 * 1024;

/// Default rate limit: accepted requests per window per client.
pub const DEFAULT_RATE_LIMIT_MAX: usize = 60;

/// Default rate limit window in seconds.
pub const DEFAULT_RATE_LIMIT_WINDOW_SECS: u64 = 60;

/// Default base URL for CLI/API clients.
pub const DEFAULT_CLI_SERVER_URL: &str = "http://localhost:8788";

/// File name for the redb database within the configured KV directory.
pub const REDB_FILE_NAME: &str = "navgrid.redb";
