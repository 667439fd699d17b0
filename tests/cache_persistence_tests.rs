use serde_json::{Value, json};
use sports_api_client::data_fetcher::cache::{
    CacheStore, FileStorage, ManualClock, MemoryStorage, StorageAdapter, generate_key,
};
use sports_api_client::data_fetcher::models::{QueryParams, ResourceKind, Sport};
use std::sync::Arc;
use std::time::Duration;
use tempfile::tempdir;

const START: i64 = 1_714_521_600_000;

/// Test that a file-backed store survives a restart with keyed and single tables
#[tokio::test]
async fn test_file_backed_store_survives_restart() {
    let temp_dir = tempdir().unwrap();
    let storage: Arc<dyn StorageAdapter> = Arc::new(FileStorage::new(temp_dir.path()));
    let clock = ManualClock::new(START);
    let name = Sport::Baseball.cache_store_name();

    let first_params = QueryParams::new().with("league", 1).with("season", 2024);
    let second_params = QueryParams::new().with("league", 2).with("season", 2024);
    let first_key = generate_key(ResourceKind::Teams, Some(&first_params));
    let second_key = generate_key(ResourceKind::Teams, Some(&second_params));

    {
        let mut store =
            CacheStore::open_with_clock(name.as_str(), storage.clone(), Arc::new(clock.clone()))
                .await;
        store.set(ResourceKind::Teams, Some(&first_key), &json!([{"id": 1}]));
        store.set(ResourceKind::Teams, Some(&second_key), &json!([{"id": 2}]));
        store.set(ResourceKind::Timezone, None, &json!(["UTC"]));
        store.flush().await;
    }

    assert!(temp_dir.path().join("baseball-cache.json").exists());

    clock.advance(Duration::from_secs(60));
    let store = CacheStore::open_with_clock(name.as_str(), storage, Arc::new(clock)).await;

    assert_eq!(
        store.get::<Value>(ResourceKind::Teams, Some(&first_key)),
        Some(json!([{"id": 1}]))
    );
    assert_eq!(
        store.get::<Value>(ResourceKind::Teams, Some(&second_key)),
        Some(json!([{"id": 2}]))
    );
    assert_eq!(
        store.get::<Value>(ResourceKind::Timezone, None),
        Some(json!(["UTC"]))
    );
    assert_eq!(
        store
            .entry(ResourceKind::Teams, Some(&first_key))
            .map(|entry| entry.timestamp()),
        Some(START)
    );
}

/// Test the persisted document layout
#[tokio::test]
async fn test_persisted_document_layout() {
    let storage = MemoryStorage::new();
    let mut store = CacheStore::open("handball-cache", Arc::new(storage.clone())).await;

    store.set(ResourceKind::Games, Some("games-1"), &json!([1]));
    store.set(ResourceKind::Games, Some("games-2"), &json!([2]));
    store.set_ttl(Duration::from_millis(10_000));
    store.flush().await;

    let blob = storage.get("handball-cache").await.unwrap().unwrap();
    let document: Value = serde_json::from_str(&blob).unwrap();

    assert_eq!(document["version"], json!(0));
    let state = document["state"].as_object().unwrap();
    assert_eq!(state["cacheTTL"], json!(10_000));
    for kind in ResourceKind::ALL {
        assert!(state.contains_key(kind.field_name()), "{kind}");
    }

    let games = state["games"].as_array().unwrap();
    assert_eq!(games.len(), 2);
    assert_eq!(games[0][0], json!("games-1"));
    assert_eq!(games[0][1]["data"], json!([1]));
    assert!(games[0][1]["timestamp"].is_i64());
    assert_eq!(state["countries"], Value::Null);
}

/// Test that garbage on disk is treated as an empty cache
#[tokio::test]
async fn test_corrupt_file_yields_fresh_store() {
    let temp_dir = tempdir().unwrap();
    let storage = FileStorage::new(temp_dir.path());
    tokio::fs::write(storage.path_for("mma-cache"), "\u{0}\u{1}garbage")
        .await
        .unwrap();

    let mut store = CacheStore::open("mma-cache", Arc::new(storage.clone())).await;
    assert!(store.entry(ResourceKind::Countries, None).is_none());
    assert_eq!(store.stats().total_entries(), 0);

    // The next write replaces the corrupt blob with a valid document
    store.set(ResourceKind::Players, Some("p"), &json!(["fighter"]));
    store.flush().await;
    let blob = storage.get("mma-cache").await.unwrap().unwrap();
    assert!(serde_json::from_str::<Value>(&blob).is_ok());
}

/// Test that an entry stored as `[data, timestamp]` discards the whole document
#[tokio::test]
async fn test_sequence_shaped_entry_yields_fresh_store() {
    let storage = MemoryStorage::new();
    storage
        .set(
            "rugby-cache",
            r#"{"state":{"cacheTTL":60000,"countries":[["NZ"],1714521600000],"teams":[["teams:*",{"data":[1],"timestamp":1714521600000}]]},"version":0}"#,
        )
        .await
        .unwrap();

    let clock = ManualClock::new(START);
    let store =
        CacheStore::open_with_clock("rugby-cache", Arc::new(storage), Arc::new(clock)).await;
    assert!(store.entry(ResourceKind::Countries, None).is_none());
    assert!(store.entry(ResourceKind::Teams, None).is_none());
    assert_eq!(store.ttl(), Duration::from_millis(300_000));
}

/// Test that clearing persists empty tables while keeping the TTL
#[tokio::test]
async fn test_clear_persists_empty_tables_and_ttl() {
    let storage = MemoryStorage::new();
    let mut store = CacheStore::open("volleyball-cache", Arc::new(storage.clone())).await;
    store.set_ttl(Duration::from_secs(30));
    store.set(ResourceKind::Standings, Some("s"), &json!([]));
    store.set(ResourceKind::Seasons, None, &json!([2024]));
    store.clear();
    store.flush().await;

    let reopened = CacheStore::open("volleyball-cache", Arc::new(storage)).await;
    assert_eq!(reopened.ttl(), Duration::from_secs(30));
    assert_eq!(reopened.stats().total_entries(), 0);
}
