//! End-to-end sync tests against a real server instance.

use navgrid_client::{ApiClient, LocalCache, SyncEngine, SyncOutcome};
use navgrid_core::models::{seeded_links, NewLinkRequest};
use navgrid_core::{Config, NavStore};
use navgrid_server::AppState;
use serde_json::{Map, Value};
use std::path::Path;

const TEST_SECRET: &str = "test-secret";

fn test_config(kv_path: &Path) -> Config {
    Config {
        kv_path: Some(kv_path.to_string_lossy().to_string()),
        port: 0,
        auth_keys: vec![TEST_SECRET.to_string()],
        rate_limit_max: 10_000,
        rate_limit_window_secs: 60,
        max_body_size: 1024 * 1024,
    }
}

/// Spawn a server over a fresh store; returns its base URL.
async fn spawn_server(kv_dir: &Path) -> String {
    let config = test_config(kv_dir);
    let store = NavStore::open(&kv_dir.to_string_lossy()).expect("open store");
    let state = AppState::new(config, store);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind listener");
    let addr = listener.local_addr().expect("listener addr");
    tokio::spawn(navgrid_server::serve_router(
        listener,
        state,
        std::future::pending(),
    ));
    format!("http://{addr}")
}

fn engine(server: &str, cache_dir: &Path) -> SyncEngine {
    let api = ApiClient::new(server, Some(TEST_SECRET.to_string()));
    let cache = LocalCache::open(cache_dir).expect("open cache");
    SyncEngine::new(api, cache).expect("build engine")
}

#[tokio::test]
async fn offline_edits_survive_an_engine_reload() {
    let cache_dir = tempfile::tempdir().unwrap();
    // Port 9 (discard) is never listening.
    let server = "http://127.0.0.1:9";

    let mut first = engine(server, cache_dir.path());
    let (link, outcome) = first
        .add_link(NewLinkRequest {
            name: "Wiki".to_string(),
            url: "wiki.example".to_string(),
            category: None,
            icon: None,
        })
        .await
        .unwrap();
    assert_eq!(outcome, SyncOutcome::LocalOnly);

    // A rebuilt engine over the same cache sees the edit.
    let second = engine(server, cache_dir.path());
    assert_eq!(second.links().len(), 4);
    assert!(second.links().iter().any(|l| l.id == link.id));

    // Reconcile against the dead server leaves it intact.
    let mut second = second;
    assert_eq!(second.reconcile().await.unwrap(), SyncOutcome::LocalOnly);
    assert!(!second.is_online());
    assert_eq!(second.links().len(), 4);
}

#[tokio::test]
async fn online_add_is_visible_to_a_fresh_cache() {
    let kv_dir = tempfile::tempdir().unwrap();
    let server = spawn_server(kv_dir.path()).await;

    let writer_cache = tempfile::tempdir().unwrap();
    let mut writer = engine(&server, writer_cache.path());
    let (link, outcome) = writer
        .add_link(NewLinkRequest {
            name: "Tracker".to_string(),
            url: "https://tracker.example".to_string(),
            category: Some("work".to_string()),
            icon: None,
        })
        .await
        .unwrap();
    assert_eq!(outcome, SyncOutcome::Synced);

    // A second client with an empty cache picks the link up on reconcile,
    // with the writer's locally generated id.
    let reader_cache = tempfile::tempdir().unwrap();
    let mut reader = engine(&server, reader_cache.path());
    assert_eq!(reader.reconcile().await.unwrap(), SyncOutcome::Synced);
    assert!(reader.is_online());

    let synced = reader
        .links()
        .iter()
        .find(|l| l.id == link.id)
        .expect("added link visible remotely");
    assert_eq!(synced.name, "Tracker");
    assert_eq!(synced.category, "work");
    assert_eq!(synced.icon, "T");
}

#[tokio::test]
async fn delete_propagates_to_the_server() {
    let kv_dir = tempfile::tempdir().unwrap();
    let server = spawn_server(kv_dir.path()).await;

    let cache_a = tempfile::tempdir().unwrap();
    let mut client_a = engine(&server, cache_a.path());
    // Establish the seeded document remotely first.
    client_a.reconcile().await.unwrap();
    let outcome = client_a.delete_link("2").await.unwrap();
    assert_eq!(outcome, Some(SyncOutcome::Synced));

    let cache_b = tempfile::tempdir().unwrap();
    let mut client_b = engine(&server, cache_b.path());
    client_b.reconcile().await.unwrap();

    let ids: Vec<&str> = client_b.links().iter().map(|l| l.id.as_str()).collect();
    assert_eq!(ids, ["1", "3"]);
}

#[tokio::test]
async fn settings_merge_round_trips_through_the_server() {
    let kv_dir = tempfile::tempdir().unwrap();
    let server = spawn_server(kv_dir.path()).await;

    let cache_a = tempfile::tempdir().unwrap();
    let mut client_a = engine(&server, cache_a.path());

    let mut patch = Map::new();
    patch.insert(
        "backgroundColor".to_string(),
        Value::String("#101820".to_string()),
    );
    patch.insert("sidebar".to_string(), Value::Bool(true));
    assert_eq!(
        client_a.save_settings(patch).await.unwrap(),
        SyncOutcome::Synced
    );

    let cache_b = tempfile::tempdir().unwrap();
    let mut client_b = engine(&server, cache_b.path());
    client_b.reconcile().await.unwrap();

    let settings = client_b.settings();
    assert_eq!(settings.background_color, "#101820");
    // Untouched defaults survive the merge.
    assert_eq!(settings.user_name, "个人导航页");
    // Unknown keys round-trip.
    assert_eq!(settings.extra.get("sidebar"), Some(&Value::Bool(true)));
}

#[tokio::test]
async fn unauthenticated_pushes_degrade_to_local_only() {
    let kv_dir = tempfile::tempdir().unwrap();
    let server = spawn_server(kv_dir.path()).await;

    let cache_dir = tempfile::tempdir().unwrap();
    let api = ApiClient::new(server.as_str(), None);
    let cache = LocalCache::open(cache_dir.path()).expect("open cache");
    let mut anon = SyncEngine::new(api, cache).expect("build engine");

    let (_, outcome) = anon
        .add_link(NewLinkRequest {
            name: "Private".to_string(),
            url: "https://private.example".to_string(),
            category: None,
            icon: None,
        })
        .await
        .unwrap();
    // The append endpoint is open but the full-sequence push is not.
    assert_eq!(outcome, SyncOutcome::LocalOnly);
    assert_eq!(anon.links().len(), 4);

    // Reads remain available without a credential.
    assert_eq!(anon.reconcile().await.unwrap(), SyncOutcome::Synced);
    // Remote now holds the seeded links plus the appended one (with a
    // server-generated id), so the local view follows the remote document.
    assert!(anon.links().iter().any(|l| l.name == "Private"));
    assert!(anon.links().iter().any(|l| l.id == "1"));
}

#[tokio::test]
async fn reconcile_keeps_local_links_when_remote_is_seeded_only() {
    let kv_dir = tempfile::tempdir().unwrap();
    let server = spawn_server(kv_dir.path()).await;

    let cache_dir = tempfile::tempdir().unwrap();
    let mut client = engine(&server, cache_dir.path());
    client.reconcile().await.unwrap();

    // The default document comes back non-empty, so it replaces the
    // identical local seed without losing anything.
    assert_eq!(client.links(), seeded_links());
}
