//! On-disk cache mirroring the browser's local-storage keys.
//!
//! Each datum gets its own file so a corrupt entry only loses itself.
//! Reads degrade to `None` with a warning; only writes surface errors.

use crate::error::ClientError;
use navgrid_core::models::{Link, Settings};
use std::fs;
use std::path::{Path, PathBuf};

const LINKS_FILE: &str = "links.json";
const SETTINGS_FILE: &str = "settings.json";
const AVATAR_FILE: &str = "avatar.dat";
const BACKGROUND_FILE: &str = "background.dat";

/// File-backed local cache rooted at a directory.
pub struct LocalCache {
    dir: PathBuf,
}

impl LocalCache {
    /// Open (creating if needed) a cache rooted at `dir`.
    ///
    /// # Errors
    /// Fails when the directory cannot be created.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, ClientError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// Directory this cache lives in.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }

    fn load_json<T: serde::de::DeserializeOwned>(&self, name: &str) -> Option<T> {
        let path = self.path(name);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return None,
            Err(err) => {
                tracing::warn!("failed to read {}: {err}", path.display());
                return None;
            }
        };
        match serde_json::from_slice(&bytes) {
            Ok(value) => Some(value),
            Err(err) => {
                tracing::warn!("discarding unreadable cache entry {}: {err}", path.display());
                None
            }
        }
    }

    fn save_json<T: serde::Serialize>(&self, name: &str, value: &T) -> Result<(), ClientError> {
        let body = serde_json::to_vec_pretty(value)?;
        fs::write(self.path(name), body)?;
        Ok(())
    }

    /// Cached link sequence, if one has been saved and still parses.
    pub fn load_links(&self) -> Option<Vec<Link>> {
        self.load_json(LINKS_FILE)
    }

    /// Persist the link sequence.
    pub fn save_links(&self, links: &[Link]) -> Result<(), ClientError> {
        self.save_json(LINKS_FILE, &links)
    }

    /// Cached settings, if saved and still parseable.
    pub fn load_settings(&self) -> Option<Settings> {
        self.load_json(SETTINGS_FILE)
    }

    /// Persist the settings.
    pub fn save_settings(&self, settings: &Settings) -> Result<(), ClientError> {
        self.save_json(SETTINGS_FILE, settings)
    }

    /// Cached avatar payload (a data URL), if any.
    pub fn load_avatar(&self) -> Option<String> {
        self.load_text(AVATAR_FILE)
    }

    /// Persist the avatar payload locally. Avatars never sync remotely.
    pub fn save_avatar(&self, data: &str) -> Result<(), ClientError> {
        fs::write(self.path(AVATAR_FILE), data)?;
        Ok(())
    }

    /// Cached background image payload, if any.
    pub fn load_background_image(&self) -> Option<String> {
        self.load_text(BACKGROUND_FILE)
    }

    /// Persist the background image payload locally.
    pub fn save_background_image(&self, data: &str) -> Result<(), ClientError> {
        fs::write(self.path(BACKGROUND_FILE), data)?;
        Ok(())
    }

    fn load_text(&self, name: &str) -> Option<String> {
        let path = self.path(name);
        match fs::read_to_string(&path) {
            Ok(text) => Some(text),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => None,
            Err(err) => {
                tracing::warn!("failed to read {}: {err}", path.display());
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use navgrid_core::models::seeded_links;

    #[test]
    fn links_round_trip_through_the_cache() {
        let dir = tempfile::tempdir().unwrap();
        let cache = LocalCache::open(dir.path()).unwrap();

        assert!(cache.load_links().is_none());
        cache.save_links(&seeded_links()).unwrap();
        assert_eq!(cache.load_links().unwrap(), seeded_links());
    }

    #[test]
    fn corrupt_entries_read_as_absent() {
        let dir = tempfile::tempdir().unwrap();
        let cache = LocalCache::open(dir.path()).unwrap();

        std::fs::write(dir.path().join(SETTINGS_FILE), b"{half a json").unwrap();
        assert!(cache.load_settings().is_none());
    }

    #[test]
    fn avatar_stays_local_to_its_file() {
        let dir = tempfile::tempdir().unwrap();
        let cache = LocalCache::open(dir.path()).unwrap();

        cache.save_avatar("data:image/png;base64,AAAA").unwrap();
        assert_eq!(
            cache.load_avatar().as_deref(),
            Some("data:image/png;base64,AAAA")
        );
        assert!(cache.load_background_image().is_none());
    }
}
