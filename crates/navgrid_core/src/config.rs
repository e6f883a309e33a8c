//! Configuration loading from environment variables.

use crate::constants::{
    DEFAULT_MAX_BODY_SIZE, DEFAULT_PORT, DEFAULT_RATE_LIMIT_MAX, DEFAULT_RATE_LIMIT_WINDOW_SECS,
};
use serde::Deserialize;
use std::env;
use std::path::PathBuf;

/// Runtime configuration for the navgrid server.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Directory for the redb key-value backend. `None` means no binding is
    /// configured: reads serve defaults and writes report failure, the same
    /// degradation an unbound edge KV namespace produces.
    pub kv_path: Option<String>,
    pub port: u16,
    /// Accepted admin credentials, compared byte-for-byte against the
    /// `Authorization` header (no scheme prefix).
    pub auth_keys: Vec<String>,
    pub rate_limit_max: usize,
    pub rate_limit_window_secs: u64,
    pub max_body_size: usize,
}

/// Expand tilde (~) in paths to the user's home directory
fn expand_tilde(path: String) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = resolve_home_dir() {
            return home.join(rest).to_string_lossy().to_string();
        }
    }
    path
}

fn resolve_home_dir() -> Option<PathBuf> {
    // Prefer explicit HOME if set (Unix, some Windows shells)
    if let Ok(home) = env::var("HOME") {
        if !home.trim().is_empty() {
            return Some(PathBuf::from(home));
        }
    }

    if let Ok(profile) = env::var("USERPROFILE") {
        if !profile.trim().is_empty() {
            return Some(PathBuf::from(profile));
        }
    }

    std::env::current_dir().ok()
}

/// Default on-disk cache directory for the sync client.
pub fn default_cache_dir() -> PathBuf {
    resolve_home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".cache")
        .join("navgrid")
}

/// Parse a boolean-like environment flag value.
///
/// Truthy: `1`, `true`, `yes`, `on`. Falsy: `0`, `false`, `no`, `off`,
/// empty string. Case-insensitive, surrounding whitespace ignored.
///
/// # Returns
/// `Some(bool)` when the value is recognized, otherwise `None`.
pub fn parse_env_flag(value: &str) -> Option<bool> {
    let normalized = value.trim().to_ascii_lowercase();
    match normalized.as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "" | "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Read a boolean flag from the environment.
///
/// Missing or unrecognized values are treated as `false`.
pub fn env_flag_enabled(name: &str) -> bool {
    env::var(name)
        .ok()
        .and_then(|value| parse_env_flag(&value))
        .unwrap_or(false)
}

fn env_secret(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Returns
    /// A populated [`Config`] with defaults applied when env vars are missing.
    pub fn from_env() -> Self {
        // Several secret names are accepted for deployment compatibility.
        let auth_keys = ["AUTH_KEY", "ADMIN_PASSWORD", "ADMIN_TOKEN"]
            .iter()
            .filter_map(|name| env_secret(name))
            .collect();

        Self {
            kv_path: env::var("KV_PATH").ok().map(expand_tilde),
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(DEFAULT_PORT),
            auth_keys,
            rate_limit_max: env::var("RATE_LIMIT_MAX")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_RATE_LIMIT_MAX),
            rate_limit_window_secs: env::var("RATE_LIMIT_WINDOW_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_RATE_LIMIT_WINDOW_SECS),
            max_body_size: env::var("MAX_BODY_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_MAX_BODY_SIZE),
        }
    }

    /// Whether at least one admin credential is configured.
    pub fn has_auth(&self) -> bool {
        !self.auth_keys.is_empty()
    }

    /// Whether `candidate` exactly matches one of the configured secrets.
    ///
    /// With no secrets configured every candidate is rejected; there is no
    /// open-access fallback.
    pub fn is_authorized(&self, candidate: &str) -> bool {
        self.auth_keys.iter().any(|key| key == candidate)
    }
}
