//! Local-first sync engine.
//!
//! Every mutation lands in the local cache before any network traffic, so
//! the page keeps working when the server is unreachable. Remote pushes are
//! best-effort; remote fetches carry a sequence number so a slow response
//! can never clobber the result of a later one.

use crate::api::ApiClient;
use crate::cache::LocalCache;
use crate::error::ClientError;
use navgrid_core::models::{Link, NewLinkRequest, Settings};
use serde_json::{Map, Value};

/// How a mutation landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Applied locally and acknowledged by the server.
    Synced,
    /// Applied locally; the server was unreachable or rejected the push.
    LocalOnly,
}

/// Local-first state holder: cached links and settings plus an API client
/// for best-effort synchronization.
pub struct SyncEngine {
    api: ApiClient,
    cache: LocalCache,
    links: Vec<Link>,
    settings: Settings,
    online: bool,
    issued_fetches: u64,
    applied_fetch: u64,
}

impl SyncEngine {
    /// Build an engine from a cache directory, seeding the default document
    /// into the cache on first run.
    ///
    /// # Errors
    /// Fails when the cache directory cannot be created or the seed cannot
    /// be written.
    pub fn new(api: ApiClient, cache: LocalCache) -> Result<Self, ClientError> {
        let links = match cache.load_links() {
            Some(links) => links,
            None => {
                let seeded = navgrid_core::models::seeded_links();
                cache.save_links(&seeded)?;
                seeded
            }
        };
        let settings = match cache.load_settings() {
            Some(settings) => settings,
            None => {
                let defaults = Settings::default();
                cache.save_settings(&defaults)?;
                defaults
            }
        };
        Ok(Self {
            api,
            cache,
            links,
            settings,
            online: false,
            issued_fetches: 0,
            applied_fetch: 0,
        })
    }

    /// Current link sequence.
    pub fn links(&self) -> &[Link] {
        &self.links
    }

    /// Current settings.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Whether the last health probe succeeded.
    pub fn is_online(&self) -> bool {
        self.online
    }

    /// Probe the server and record reachability.
    pub async fn probe(&mut self) -> bool {
        self.online = self.api.health().await;
        self.online
    }

    fn next_fetch_seq(&mut self) -> u64 {
        self.issued_fetches += 1;
        self.issued_fetches
    }

    /// Pull remote state and fold it into the local view.
    ///
    /// Each half (navigation, settings) degrades independently: a failed
    /// fetch leaves the corresponding local state untouched.
    ///
    /// # Errors
    /// Fails only on cache writes; network failures degrade silently.
    pub async fn reconcile(&mut self) -> Result<SyncOutcome, ClientError> {
        if !self.probe().await {
            return Ok(SyncOutcome::LocalOnly);
        }
        let seq = self.next_fetch_seq();
        let (navigation, settings) =
            tokio::join!(self.api.fetch_navigation(), self.api.fetch_settings());
        let links = match navigation {
            Ok(doc) => Some(doc.links),
            Err(err) => {
                tracing::warn!("navigation fetch failed: {err}");
                None
            }
        };
        let settings = match settings {
            Ok(settings) => Some(settings),
            Err(err) => {
                tracing::warn!("settings fetch failed: {err}");
                None
            }
        };
        self.apply_remote(seq, links, settings)
    }

    /// Fold one fetch's results into local state.
    ///
    /// Results from a fetch older than one already applied are discarded.
    /// Remote links replace the local sequence only when non-empty; remote
    /// settings keys win over local ones.
    fn apply_remote(
        &mut self,
        seq: u64,
        links: Option<Vec<Link>>,
        settings: Option<Settings>,
    ) -> Result<SyncOutcome, ClientError> {
        if seq <= self.applied_fetch {
            tracing::debug!("discarding stale fetch {seq} (applied {})", self.applied_fetch);
            return Ok(SyncOutcome::LocalOnly);
        }
        self.applied_fetch = seq;
        if let Some(links) = links {
            if !links.is_empty() {
                self.links = links;
                self.cache.save_links(&self.links)?;
            }
        }
        if let Some(remote) = settings {
            let patch = match serde_json::to_value(&remote)? {
                Value::Object(map) => map,
                _ => Map::new(),
            };
            self.settings = self.settings.merge_value(&patch)?;
            self.cache.save_settings(&self.settings)?;
        }
        Ok(SyncOutcome::Synced)
    }

    /// Add a link: cache it locally, then push to the server.
    ///
    /// The remote append is best-effort and immediately superseded by a
    /// full-sequence push, so the locally generated id is authoritative.
    ///
    /// # Errors
    /// Fails on validation or cache writes, never on network failures.
    pub async fn add_link(&mut self, req: NewLinkRequest) -> Result<(Link, SyncOutcome), ClientError> {
        let link = Link::from_request(req)?;
        self.links.push(link.clone());
        self.cache.save_links(&self.links)?;

        if let Err(err) = self.api.add_link(&link).await {
            tracing::warn!("remote link append failed: {err}");
        }
        let outcome = match self.api.push_navigation(&self.links).await {
            Ok(()) => SyncOutcome::Synced,
            Err(err) => {
                tracing::warn!("navigation push failed: {err}");
                SyncOutcome::LocalOnly
            }
        };
        Ok((link, outcome))
    }

    /// Remove a link locally and best-effort remotely.
    ///
    /// # Returns
    /// `Ok(None)` when the id was not present locally.
    ///
    /// # Errors
    /// Fails only on cache writes.
    pub async fn delete_link(&mut self, id: &str) -> Result<Option<SyncOutcome>, ClientError> {
        let before = self.links.len();
        self.links.retain(|link| link.id != id);
        if self.links.len() == before {
            return Ok(None);
        }
        self.cache.save_links(&self.links)?;

        // Both calls converge on the same end state, so order is irrelevant.
        let (deleted, pushed) = tokio::join!(
            self.api.delete_link(id),
            self.api.push_navigation(&self.links)
        );
        if let Err(err) = deleted {
            tracing::warn!("remote link delete failed: {err}");
        }
        let outcome = match pushed {
            Ok(()) => SyncOutcome::Synced,
            Err(err) => {
                tracing::warn!("navigation push failed: {err}");
                SyncOutcome::LocalOnly
            }
        };
        Ok(Some(outcome))
    }

    /// Merge a settings patch locally, then push the merged settings.
    ///
    /// # Errors
    /// Fails on validation or cache writes, never on network failures.
    pub async fn save_settings(
        &mut self,
        patch: Map<String, Value>,
    ) -> Result<SyncOutcome, ClientError> {
        self.settings = self.settings.merge_value(&patch)?;
        self.cache.save_settings(&self.settings)?;

        match self.api.push_settings(&self.settings).await {
            Ok(merged) => {
                self.settings = merged;
                self.cache.save_settings(&self.settings)?;
                Ok(SyncOutcome::Synced)
            }
            Err(err) => {
                tracing::warn!("settings push failed: {err}");
                Ok(SyncOutcome::LocalOnly)
            }
        }
    }

    /// Store an avatar payload. Avatars are local-only and never sync.
    pub fn set_avatar(&mut self, data: &str) -> Result<(), ClientError> {
        self.cache.save_avatar(data)
    }

    /// Store a background image payload. Local-only, like avatars.
    pub fn set_background_image(&mut self, data: &str) -> Result<(), ClientError> {
        self.cache.save_background_image(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use navgrid_core::models::seeded_links;

    fn engine_with_unreachable_server(dir: &std::path::Path) -> SyncEngine {
        let api = ApiClient::new("http://127.0.0.1:9", None);
        let cache = LocalCache::open(dir).unwrap();
        SyncEngine::new(api, cache).unwrap()
    }

    #[test]
    fn first_run_seeds_the_default_document() {
        let dir = tempfile::tempdir().unwrap();
        let engine = engine_with_unreachable_server(dir.path());

        assert_eq!(engine.links(), seeded_links());
        assert_eq!(engine.settings().user_name, "个人导航页");

        // The seed is persisted, not just held in memory.
        let cache = LocalCache::open(dir.path()).unwrap();
        assert_eq!(cache.load_links().unwrap(), seeded_links());
    }

    #[test]
    fn stale_fetch_results_are_discarded() {
        let dir = tempfile::tempdir().unwrap();
        let mut engine = engine_with_unreachable_server(dir.path());

        let newer = vec![Link {
            id: "n".to_string(),
            name: "Newer".to_string(),
            url: "https://newer.example".to_string(),
            category: "main".to_string(),
            icon: "N".to_string(),
        }];
        let older = vec![Link {
            id: "o".to_string(),
            name: "Older".to_string(),
            url: "https://older.example".to_string(),
            category: "main".to_string(),
            icon: "O".to_string(),
        }];

        let first = engine.next_fetch_seq();
        let second = engine.next_fetch_seq();

        // The second fetch's response lands first.
        engine.apply_remote(second, Some(newer.clone()), None).unwrap();
        let outcome = engine.apply_remote(first, Some(older), None).unwrap();

        assert_eq!(outcome, SyncOutcome::LocalOnly);
        assert_eq!(engine.links(), newer);
    }

    #[test]
    fn empty_remote_links_never_replace_local_state() {
        let dir = tempfile::tempdir().unwrap();
        let mut engine = engine_with_unreachable_server(dir.path());

        let seq = engine.next_fetch_seq();
        engine.apply_remote(seq, Some(Vec::new()), None).unwrap();

        assert_eq!(engine.links(), seeded_links());
    }

    #[test]
    fn remote_settings_keys_win_over_local() {
        let dir = tempfile::tempdir().unwrap();
        let mut engine = engine_with_unreachable_server(dir.path());

        let mut remote = Settings::default();
        remote.background_color = "#000000".to_string();
        remote
            .extra
            .insert("theme".to_string(), Value::String("dusk".to_string()));

        let seq = engine.next_fetch_seq();
        engine.apply_remote(seq, None, Some(remote)).unwrap();

        assert_eq!(engine.settings().background_color, "#000000");
        assert_eq!(
            engine.settings().extra.get("theme"),
            Some(&Value::String("dusk".to_string()))
        );
    }

    #[tokio::test]
    async fn offline_mutations_land_locally() {
        let dir = tempfile::tempdir().unwrap();
        let mut engine = engine_with_unreachable_server(dir.path());

        let (link, outcome) = engine
            .add_link(NewLinkRequest {
                name: "Docs".to_string(),
                url: "docs.example".to_string(),
                category: None,
                icon: None,
            })
            .await
            .unwrap();

        assert_eq!(outcome, SyncOutcome::LocalOnly);
        assert_eq!(link.url, "http://docs.example");
        assert_eq!(engine.links().len(), 4);

        let removed = engine.delete_link(&link.id).await.unwrap();
        assert_eq!(removed, Some(SyncOutcome::LocalOnly));
        assert_eq!(engine.links(), seeded_links());

        assert!(engine.delete_link("no-such-id").await.unwrap().is_none());
    }
}
