//! In-memory entry collection mirrored into a [`BlobStore`].

use std::sync::Arc;

use shared::{check_collection, Entry, EntryId, LogError, Result, ENTRIES_STORAGE_KEY};
use tracing::{debug, warn};

use crate::BlobStore;

/// Owns the entry collection for the lifetime of the process.
///
/// The collection is read from the blob store once in [`EntryStore::open`] and written back in
/// full after every [`EntryStore::add`]. Ordering of [`EntryStore::all`] is insertion order
/// (newest prepended); sorting for display belongs to the timeline.
pub struct EntryStore {
    blobs: Arc<dyn BlobStore>,
    entries: Vec<Entry>,
}

impl EntryStore {
    pub async fn open(blobs: Arc<dyn BlobStore>) -> Self {
        let entries = load_from(blobs.as_ref()).await;
        debug!(count = entries.len(), "entry store opened");
        Self { blobs, entries }
    }

    /// Re-reads the stored collection. Never fails: missing, unreadable, or malformed data
    /// yields an empty collection.
    pub async fn load(&self) -> Vec<Entry> {
        load_from(self.blobs.as_ref()).await
    }

    /// Serializes `entries` and overwrites the stored collection.
    pub async fn persist(&self, entries: &[Entry]) -> Result<()> {
        let raw = encode_entries(entries)?;
        self.blobs
            .put(ENTRIES_STORAGE_KEY, &raw)
            .await
            .map_err(|e| LogError::PersistenceWrite(format!("{e:#}")))
    }

    pub fn all(&self) -> &[Entry] {
        &self.entries
    }

    pub fn get(&self, id: &EntryId) -> Option<&Entry> {
        self.entries.iter().find(|entry| &entry.id == id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Prepends `entry` and persists the collection. A failed write leaves the in-memory
    /// collection as it was before the call.
    pub async fn add(&mut self, entry: Entry) -> Result<()> {
        entry.check_invariants()?;
        if self.get(&entry.id).is_some() {
            return Err(LogError::InvalidEntry {
                id: entry.id.to_string(),
                reason: "duplicate id".to_string(),
            });
        }

        self.entries.insert(0, entry);
        let written = self.persist(&self.entries).await;
        if let Err(err) = written {
            self.entries.remove(0);
            return Err(err);
        }
        Ok(())
    }
}

async fn load_from(blobs: &dyn BlobStore) -> Vec<Entry> {
    let raw = match blobs.get(ENTRIES_STORAGE_KEY).await {
        Ok(Some(raw)) if !raw.trim().is_empty() => raw,
        Ok(_) => return Vec::new(),
        Err(error) => {
            let err = LogError::PersistenceRead(format!("{error:#}"));
            warn!(%err, "blob store read failed; starting with no entries");
            return Vec::new();
        }
    };

    match decode_entries(&raw) {
        Ok(entries) => entries,
        Err(err) => {
            warn!(%err, "failed to parse stored entries; starting with no entries");
            Vec::new()
        }
    }
}

pub fn encode_entries(entries: &[Entry]) -> Result<String> {
    serde_json::to_string(entries).map_err(|e| LogError::PersistenceWrite(e.to_string()))
}

/// Parses a stored collection, rejecting records that break entry invariants.
pub fn decode_entries(raw: &str) -> Result<Vec<Entry>> {
    let entries: Vec<Entry> =
        serde_json::from_str(raw).map_err(|e| LogError::PersistenceRead(e.to_string()))?;
    check_collection(&entries).map_err(|e| LogError::PersistenceRead(e.to_string()))?;
    Ok(entries)
}

#[cfg(test)]
#[path = "tests/entry_store_tests.rs"]
mod tests;
