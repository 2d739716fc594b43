use super::*;
use crate::MemoryBlobStore;
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use shared::EntryKind;
use std::sync::atomic::{AtomicBool, Ordering};

fn entry(id: &str, kind: EntryKind, minute: u32) -> Entry {
    Entry {
        id: EntryId::from(id),
        created_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, minute, 0).unwrap(),
        kind,
        text_content: Some(format!("log {id}")),
        media_uri: kind
            .carries_media()
            .then(|| "data:application/octet-stream;base64,AAEC".to_string()),
        duration: kind.has_duration().then_some(7),
        mood: None,
    }
}

struct FlakyBlobStore {
    inner: MemoryBlobStore,
    reject_writes: AtomicBool,
    reject_reads: bool,
}

impl FlakyBlobStore {
    fn new() -> Self {
        Self {
            inner: MemoryBlobStore::new(),
            reject_writes: AtomicBool::new(false),
            reject_reads: false,
        }
    }
}

#[async_trait]
impl BlobStore for FlakyBlobStore {
    async fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        if self.reject_reads {
            anyhow::bail!("disk unavailable");
        }
        self.inner.get(key).await
    }

    async fn put(&self, key: &str, value: &str) -> anyhow::Result<()> {
        if self.reject_writes.load(Ordering::SeqCst) {
            anyhow::bail!("quota exceeded");
        }
        self.inner.put(key, value).await
    }
}

#[tokio::test]
async fn empty_blob_store_loads_no_entries() {
    let store = EntryStore::open(Arc::new(MemoryBlobStore::new())).await;
    assert!(store.is_empty());
    assert!(store.load().await.is_empty());
}

#[tokio::test]
async fn invalid_stored_content_loads_as_empty() {
    for raw in ["{not json", "null", r#"{"id":"x"}"#, "[1, 2, 3]", "   "] {
        let blobs = Arc::new(MemoryBlobStore::with_blob(ENTRIES_STORAGE_KEY, raw));
        let store = EntryStore::open(blobs).await;
        assert!(store.all().is_empty(), "content {raw:?} should load as empty");
    }
}

#[tokio::test]
async fn stored_entries_breaking_invariants_load_as_empty() {
    let mut bad = entry("t", EntryKind::Text, 1);
    bad.media_uri = Some("data:image/png;base64,AA==".to_string());
    let raw = serde_json::to_string(&vec![entry("a", EntryKind::Audio, 0), bad]).unwrap();

    let store = EntryStore::open(Arc::new(MemoryBlobStore::with_blob(ENTRIES_STORAGE_KEY, raw))).await;
    assert!(store.is_empty());
}

#[tokio::test]
async fn read_failure_degrades_to_empty() {
    let mut blobs = FlakyBlobStore::new();
    blobs.reject_reads = true;
    let store = EntryStore::open(Arc::new(blobs)).await;
    assert!(store.is_empty());
}

#[tokio::test]
async fn add_prepends_and_persists() {
    let blobs = Arc::new(MemoryBlobStore::new());
    let mut store = EntryStore::open(blobs.clone()).await;

    store.add(entry("first", EntryKind::Text, 0)).await.expect("first");
    store.add(entry("second", EntryKind::Image, 1)).await.expect("second");

    let ids: Vec<&str> = store.all().iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, ["second", "first"]);

    let raw = blobs
        .get(ENTRIES_STORAGE_KEY)
        .await
        .expect("get")
        .expect("persisted blob");
    let persisted = decode_entries(&raw).expect("decode");
    assert_eq!(persisted, store.all());
}

#[tokio::test]
async fn persist_then_load_round_trips_content_and_order() {
    let blobs = Arc::new(MemoryBlobStore::new());
    let store = EntryStore::open(blobs.clone()).await;
    let entries = vec![
        entry("v", EntryKind::Video, 3),
        entry("t", EntryKind::Text, 9),
        entry("a", EntryKind::Audio, 1),
    ];

    store.persist(&entries).await.expect("persist");
    assert_eq!(store.load().await, entries);

    let before = blobs.get(ENTRIES_STORAGE_KEY).await.unwrap();
    store.persist(&store.load().await).await.expect("persist again");
    assert_eq!(blobs.get(ENTRIES_STORAGE_KEY).await.unwrap(), before);
}

#[tokio::test]
async fn failed_write_rolls_back_the_prepend() {
    let blobs = Arc::new(FlakyBlobStore::new());
    let mut store = EntryStore::open(blobs.clone()).await;
    store.add(entry("kept", EntryKind::Text, 0)).await.expect("kept");

    blobs.reject_writes.store(true, Ordering::SeqCst);
    let err = store
        .add(entry("lost", EntryKind::Text, 1))
        .await
        .expect_err("write rejected");

    assert!(matches!(err, LogError::PersistenceWrite(ref msg) if msg.contains("quota exceeded")));
    assert_eq!(store.len(), 1);
    assert!(store.get(&EntryId::from("lost")).is_none());
}

#[tokio::test]
async fn rejects_duplicate_ids_and_invalid_entries() {
    let mut store = EntryStore::open(Arc::new(MemoryBlobStore::new())).await;
    store.add(entry("dup", EntryKind::Text, 0)).await.expect("first");

    let err = store
        .add(entry("dup", EntryKind::Text, 1))
        .await
        .expect_err("duplicate");
    assert!(matches!(err, LogError::InvalidEntry { .. }));

    let mut image_with_duration = entry("img", EntryKind::Image, 2);
    image_with_duration.duration = Some(4);
    assert!(store.add(image_with_duration).await.is_err());
    assert_eq!(store.len(), 1);
}

#[tokio::test]
async fn get_finds_entries_by_id() {
    let mut store = EntryStore::open(Arc::new(MemoryBlobStore::new())).await;
    store.add(entry("x", EntryKind::Audio, 0)).await.expect("add");
    assert_eq!(store.get(&EntryId::from("x")).map(|e| e.kind), Some(EntryKind::Audio));
    assert!(store.get(&EntryId::from("y")).is_none());
}
